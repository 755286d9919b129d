// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory topology registry

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use crate::domain::{Cidr, ResourceKind};
use crate::errors::{PlannerError, PlannerResult};

use super::entity::{Entity, EntityKey, ResourceRef, RouteTableAssociation, StaticRoute};

/// Registry of planned entities keyed by `(kind, name)` plus dependency edges
///
/// Insertion is idempotent per key: inserting an entity whose key is
/// already registered replaces it in place, never duplicating it.
/// Every [`ResourceRef::Planned`] an entity holds becomes a dependency
/// edge automatically and is recomputed whenever the entity is replaced;
/// [`TopologyModel::add_dependency`] records the ordering constraints that
/// are not visible as references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyModel {
    entities: Vec<Entity>,
    index: HashMap<EntityKey, usize>,
    /// Edges derived from the entity's own references
    references: HashMap<EntityKey, BTreeSet<EntityKey>>,
    /// Edges added with `add_dependency`
    dependencies: HashMap<EntityKey, BTreeSet<EntityKey>>,
}

impl TopologyModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, returning its key
    ///
    /// Fails with [`PlannerError::UnknownEntity`] when the entity refers to a
    /// planned entity that has not been registered yet.
    pub fn insert(&mut self, entity: Entity) -> PlannerResult<EntityKey> {
        let key = entity.key();
        let references = entity.references();

        if let Some(missing) = references.iter().find(|r| !self.index.contains_key(*r)) {
            return Err(PlannerError::UnknownEntity(format!(
                "{} refers to unregistered {}",
                key, missing
            )));
        }

        match self.index.get(&key) {
            Some(&position) => {
                trace!(entity = %key, "Replacing entity");
                self.entities[position] = entity;
            }
            None => {
                self.index.insert(key.clone(), self.entities.len());
                self.entities.push(entity);
            }
        }

        self.references
            .insert(key.clone(), references.into_iter().collect());
        Ok(key)
    }

    /// Record that `a` must be emitted after `b`
    pub fn add_dependency(&mut self, a: &EntityKey, b: &EntityKey) -> PlannerResult<()> {
        for key in [a, b] {
            if !self.index.contains_key(key) {
                return Err(PlannerError::UnknownEntity(key.to_string()));
            }
        }
        self.dependencies
            .entry(a.clone())
            .or_default()
            .insert(b.clone());
        Ok(())
    }

    /// Add a static route, enforcing one route per destination per table
    ///
    /// Re-adding an identical route is a no-op; a different route for the
    /// same destination fails with [`PlannerError::DuplicateRoute`].
    pub fn add_route(&mut self, route: StaticRoute) -> PlannerResult<EntityKey> {
        if let Some(existing) = self
            .routes()
            .find(|r| r.route_table == route.route_table && r.destination == route.destination)
        {
            if *existing == route {
                return Ok(Entity::Route(route).key());
            }
            return Err(PlannerError::DuplicateRoute {
                route_table: route.route_table.to_string(),
                destination: route.destination.to_string(),
            });
        }
        self.insert(Entity::Route(route))
    }

    pub fn get(&self, key: &EntityKey) -> Option<&Entity> {
        self.index.get(key).map(|&position| &self.entities[position])
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.index.contains_key(key)
    }

    /// Entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }

    /// Direct dependencies of `key`, sorted
    pub fn dependencies_of(&self, key: &EntityKey) -> Vec<EntityKey> {
        let mut deps = BTreeSet::new();
        for edges in [self.references.get(key), self.dependencies.get(key)]
            .into_iter()
            .flatten()
        {
            deps.extend(edges.iter().cloned());
        }
        deps.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn routes(&self) -> impl Iterator<Item = &StaticRoute> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Route(route) => Some(route),
            _ => None,
        })
    }

    /// Routes landing in `route_table`
    pub fn routes_in<'a>(
        &'a self,
        route_table: &'a ResourceRef,
    ) -> impl Iterator<Item = &'a StaticRoute> + 'a {
        self.routes().filter(move |r| &r.route_table == route_table)
    }

    /// The route for `destination` in `route_table`, if any
    pub fn route_for<'a>(
        &'a self,
        route_table: &'a ResourceRef,
        destination: &Cidr,
    ) -> Option<&'a StaticRoute> {
        self.routes_in(route_table).find(|r| &r.destination == destination)
    }

    pub fn associations(&self) -> impl Iterator<Item = &RouteTableAssociation> {
        self.entities.iter().filter_map(|e| match e {
            Entity::RouteTableAssociation(assoc) => Some(assoc),
            _ => None,
        })
    }

    /// Associations made to `route_table`
    pub fn associations_to<'a>(
        &'a self,
        route_table: &'a ResourceRef,
    ) -> impl Iterator<Item = &'a RouteTableAssociation> + 'a {
        self.associations().filter(move |a| &a.route_table == route_table)
    }
}
