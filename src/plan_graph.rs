// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Plan Graph
//!
//! Orders a [`TopologyModel`] into an emission sequence for a provisioner.
//!
//! ```text
//! TopologyModel ──▶ ResourcePlanGraph::serialize() ──▶ [PlannedEntity] ──▶ Provisioner
//!                    (Kahn, ties by insertion order)
//! ```

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::errors::{PlannerError, PlannerResult};
use crate::topology::{Entity, EntityKey, TopologyModel};

/// One step of the emission sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEntity {
    pub key: EntityKey,
    pub entity: Entity,
    /// Keys that appear earlier in the sequence
    pub dependencies: Vec<EntityKey>,
}

/// Topological view over a topology model
#[derive(Debug, Clone, Copy)]
pub struct ResourcePlanGraph<'a> {
    model: &'a TopologyModel,
}

impl<'a> ResourcePlanGraph<'a> {
    pub fn new(model: &'a TopologyModel) -> Self {
        Self { model }
    }

    /// Emit every entity after all of its dependencies
    ///
    /// Independent entities keep their insertion order. Fails with
    /// [`PlannerError::CyclicDependency`] if the edges contain a cycle.
    pub fn serialize(&self) -> PlannerResult<Vec<PlannedEntity>> {
        let entities: Vec<&Entity> = self.model.entities().collect();
        let keys: Vec<EntityKey> = entities.iter().map(|e| e.key()).collect();
        let position: HashMap<&EntityKey, usize> =
            keys.iter().enumerate().map(|(i, k)| (k, i)).collect();

        let mut in_degree = vec![0usize; keys.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); keys.len()];
        let mut dependencies: Vec<Vec<EntityKey>> = Vec::with_capacity(keys.len());

        for (i, key) in keys.iter().enumerate() {
            let deps = self.model.dependencies_of(key);
            for dep in &deps {
                let j = *position
                    .get(dep)
                    .ok_or_else(|| PlannerError::UnknownEntity(dep.to_string()))?;
                in_degree[i] += 1;
                dependents[j].push(i);
            }
            dependencies.push(deps);
        }

        let mut ready: VecDeque<usize> = (0..keys.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(keys.len());

        while let Some(i) = ready.pop_front() {
            order.push(i);
            for &d in &dependents[i] {
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    ready.push_back(d);
                }
            }
        }

        if order.len() != keys.len() {
            let unresolved: Vec<bool> = in_degree.iter().map(|&d| d > 0).collect();
            let remaining = (0..keys.len())
                .filter(|&i| unresolved[i] && on_cycle(i, &dependents, &unresolved))
                .map(|i| keys[i].to_string())
                .collect();
            return Err(PlannerError::CyclicDependency { remaining });
        }

        Ok(order
            .into_iter()
            .map(|i| PlannedEntity {
                key: keys[i].clone(),
                entity: entities[i].clone(),
                dependencies: dependencies[i].clone(),
            })
            .collect())
    }
}

/// Whether `start` can reach itself through unresolved dependents
fn on_cycle(start: usize, dependents: &[Vec<usize>], unresolved: &[bool]) -> bool {
    let mut visited = vec![false; dependents.len()];
    let mut stack: Vec<usize> = dependents[start].clone();
    while let Some(i) = stack.pop() {
        if i == start {
            return true;
        }
        if !unresolved[i] || visited[i] {
            continue;
        }
        visited[i] = true;
        stack.extend(dependents[i].iter().copied());
    }
    false
}
