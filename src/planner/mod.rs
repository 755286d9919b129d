// Copyright (c) 2025 - Cowboy AI, Inc.
//! Route Planner
//!
//! Derives the hub-and-spoke topology in two passes:
//!
//! 1. **Per-VPC** ([`RoutePlanner::plan_vpc`]): subnets, route tables, NAT
//!    gateways, the attachment, and the VPC-local routes. The hub VPC also
//!    plans the transit gateway, its route tables and the organization share.
//! 2. **Routing** ([`RoutePlanner::synthesize_routes`]): once attachments are
//!    persisted, associate each to a transit gateway route table and add the
//!    routes that stitch spokes to the inspection VPC:
//!
//! ```text
//!                 egress-rt                      inspection-rt
//!   spoke ──assoc──▶ 0.0.0.0/0 → inspection      spoke cidr → spoke
//!   inspection ─────────────────────────assoc──▶ (one route per spoke)
//! ```
//!
//! Both passes are pure: no store access, no provisioning.

use crate::allocator::CidrAllocator;
use crate::config::NetworkSettings;
use crate::domain::Cidr;
use crate::errors::MalformedCrossPhaseRecord;
use crate::parameter_store::AttachmentRecord;
use crate::topology::{EntityKey, ResourceRef, TopologyModel};

mod routing;
mod vpc_phase;

/// Transit gateway route table spoke attachments are associated with
pub const EGRESS_RT: &str = "egress-rt";

/// Transit gateway route table the inspection attachment is associated with
pub const INSPECTION_RT: &str = "inspection-rt";

/// Route tables created on the transit gateway
pub const TGW_ROUTE_TABLES: [&str; 2] = [EGRESS_RT, INSPECTION_RT];

/// Result of planning one VPC's phase
#[derive(Debug, Clone)]
pub struct VpcPlan {
    pub vpc: String,
    pub model: TopologyModel,
    /// Present when a transit gateway was available
    pub attachment: Option<EntityKey>,
    /// Present when this VPC owns the hub
    pub transit_gateway: Option<EntityKey>,
    /// `(name, key)` of the hub route tables planned in this phase
    pub route_tables: Vec<(String, EntityKey)>,
}

/// References to the transit gateway route tables used by the routing phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TgwRouteTables {
    pub egress: ResourceRef,
    pub inspection: ResourceRef,
}

impl TgwRouteTables {
    /// Route tables that already exist, by id
    pub fn existing(egress_id: impl Into<String>, inspection_id: impl Into<String>) -> Self {
        Self {
            egress: ResourceRef::existing(egress_id),
            inspection: ResourceRef::existing(inspection_id),
        }
    }
}

/// Result of the routing phase
#[derive(Debug, Clone, Default)]
pub struct RouteSynthesis {
    pub model: TopologyModel,
    /// Records that produced an association, in input order
    pub accepted: Vec<AttachmentRecord>,
    /// Records skipped as unparseable
    pub skipped: Vec<MalformedCrossPhaseRecord>,
}

impl RouteSynthesis {
    /// Nothing to route yet
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }
}

/// Plans VPC phases and the routing phase for one deployment
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    settings: NetworkSettings,
    inspection_cidr: Option<Cidr>,
    allocator: CidrAllocator,
}

impl RoutePlanner {
    /// `inspection_cidr` identifies the inspection attachment during
    /// routing; without it every attachment is treated as a spoke
    pub fn new(settings: NetworkSettings, inspection_cidr: Option<Cidr>) -> Self {
        Self {
            settings,
            inspection_cidr,
            allocator: CidrAllocator::new(),
        }
    }

    pub fn from_config(config: &crate::config::DeploymentConfig) -> Self {
        Self::new(config.network.clone(), config.inspection_cidr())
    }

    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    pub fn inspection_cidr(&self) -> Option<Cidr> {
        self.inspection_cidr
    }
}
