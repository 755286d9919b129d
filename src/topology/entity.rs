// Copyright (c) 2025 - Cowboy AI, Inc.
//! Planned Entities
//!
//! Every resource the planner can emit is a variant of [`Entity`], each
//! carrying its own strongly typed fields. Cross-entity references are
//! [`ResourceRef`]s: either a key into the same plan, or the id of a
//! resource created by an earlier phase.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{AvailabilityZone, Cidr, ResourceKind, SubnetSpec};

/// Registry key of an entity: `(kind, name)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: ResourceKind,
    pub name: String,
}

impl EntityKey {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Reference from one entity to another
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRef {
    /// An entity planned in the same phase
    Planned(EntityKey),
    /// A resource that already exists, by its provider id
    Existing(String),
}

impl ResourceRef {
    pub fn planned(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::Planned(EntityKey::new(kind, name))
    }

    pub fn existing(id: impl Into<String>) -> Self {
        Self::Existing(id.into())
    }

    pub fn as_planned(&self) -> Option<&EntityKey> {
        match self {
            Self::Planned(key) => Some(key),
            Self::Existing(_) => None,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned(key) => write!(f, "{}", key),
            Self::Existing(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpc {
    pub name: String,
    pub cidr: Cidr,
    pub flow_logs: bool,
}

/// What a route table belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RouteTableScope {
    /// The table serving one VPC subnet
    Subnet { vpc: String, subnet: EntityKey },
    /// A transit gateway route table
    TransitGateway { transit_gateway: ResourceRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub name: String,
    pub scope: RouteTableScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetGateway {
    pub name: String,
    pub vpc: EntityKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatGateway {
    pub name: String,
    pub az: AvailabilityZone,
    pub subnet: EntityKey,
    pub eip: EntityKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitGateway {
    pub name: String,
    pub description: String,
    pub auto_accept_shared_attachments: bool,
    pub default_route_table_association: bool,
    pub default_route_table_propagation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceShare {
    pub name: String,
    pub resource: ResourceRef,
    pub principals: Vec<String>,
    pub allow_external_principals: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub vpc: EntityKey,
    pub vpc_cidr: Cidr,
    pub transit_gateway: ResourceRef,
    pub subnets: Vec<EntityKey>,
    pub appliance_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableAssociation {
    pub name: String,
    pub attachment: ResourceRef,
    pub route_table: ResourceRef,
}

/// Where a static route sends traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "ref")]
pub enum RouteTarget {
    TransitGateway(ResourceRef),
    NatGateway(ResourceRef),
    Attachment(ResourceRef),
    InternetGateway(ResourceRef),
}

impl RouteTarget {
    pub fn reference(&self) -> &ResourceRef {
        match self {
            Self::TransitGateway(r)
            | Self::NatGateway(r)
            | Self::Attachment(r)
            | Self::InternetGateway(r) => r,
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransitGateway(r) => write!(f, "transit gateway {}", r),
            Self::NatGateway(r) => write!(f, "NAT gateway {}", r),
            Self::Attachment(r) => write!(f, "attachment {}", r),
            Self::InternetGateway(r) => write!(f, "internet gateway {}", r),
        }
    }
}

/// `(route table, destination, target)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    pub name: String,
    pub route_table: ResourceRef,
    pub destination: Cidr,
    pub target: RouteTarget,
}

impl StaticRoute {
    /// Build a route whose name is derived from its table label and destination
    pub fn new(
        table_label: &str,
        route_table: ResourceRef,
        destination: Cidr,
        target: RouteTarget,
    ) -> Self {
        Self {
            name: format!("{}:{}", table_label, destination),
            route_table,
            destination,
            target,
        }
    }
}

/// A planned resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Vpc(Vpc),
    Subnet(SubnetSpec),
    RouteTable(RouteTable),
    InternetGateway(InternetGateway),
    Eip(Eip),
    NatGateway(NatGateway),
    TransitGateway(TransitGateway),
    ResourceShare(ResourceShare),
    Attachment(Attachment),
    RouteTableAssociation(RouteTableAssociation),
    Route(StaticRoute),
}

impl Entity {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Vpc(_) => ResourceKind::Vpc,
            Self::Subnet(_) => ResourceKind::Subnet,
            Self::RouteTable(_) => ResourceKind::RouteTable,
            Self::InternetGateway(_) => ResourceKind::InternetGateway,
            Self::Eip(_) => ResourceKind::Eip,
            Self::NatGateway(_) => ResourceKind::NatGateway,
            Self::TransitGateway(_) => ResourceKind::TransitGateway,
            Self::ResourceShare(_) => ResourceKind::ResourceShare,
            Self::Attachment(_) => ResourceKind::Attachment,
            Self::RouteTableAssociation(_) => ResourceKind::RouteTableAssociation,
            Self::Route(_) => ResourceKind::Route,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Vpc(v) => v.name.clone(),
            Self::Subnet(s) => s.qualified_name(),
            Self::RouteTable(t) => t.name.clone(),
            Self::InternetGateway(g) => g.name.clone(),
            Self::Eip(e) => e.name.clone(),
            Self::NatGateway(n) => n.name.clone(),
            Self::TransitGateway(t) => t.name.clone(),
            Self::ResourceShare(s) => s.name.clone(),
            Self::Attachment(a) => a.name.clone(),
            Self::RouteTableAssociation(a) => a.name.clone(),
            Self::Route(r) => r.name.clone(),
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind(), self.name())
    }

    /// Keys of other planned entities this one refers to
    pub fn references(&self) -> Vec<EntityKey> {
        let mut refs: Vec<&ResourceRef> = Vec::new();
        let mut keys: Vec<EntityKey> = Vec::new();

        match self {
            Self::Vpc(_) | Self::Eip(_) | Self::TransitGateway(_) => {}
            Self::Subnet(s) => keys.push(EntityKey::new(ResourceKind::Vpc, s.vpc.clone())),
            Self::RouteTable(t) => match &t.scope {
                RouteTableScope::Subnet { subnet, .. } => keys.push(subnet.clone()),
                RouteTableScope::TransitGateway { transit_gateway } => refs.push(transit_gateway),
            },
            Self::InternetGateway(g) => keys.push(g.vpc.clone()),
            Self::NatGateway(n) => {
                keys.push(n.subnet.clone());
                keys.push(n.eip.clone());
            }
            Self::ResourceShare(s) => refs.push(&s.resource),
            Self::Attachment(a) => {
                keys.push(a.vpc.clone());
                keys.extend(a.subnets.iter().cloned());
                refs.push(&a.transit_gateway);
            }
            Self::RouteTableAssociation(a) => {
                refs.push(&a.attachment);
                refs.push(&a.route_table);
            }
            Self::Route(r) => {
                refs.push(&r.route_table);
                refs.push(r.target.reference());
            }
        }

        keys.extend(refs.into_iter().filter_map(ResourceRef::as_planned).cloned());
        keys
    }
}
