// Copyright (c) 2025 - Cowboy AI, Inc.
//! Transit gateway topology planning for the Composable Information Machine
//!
//! Turns a declarative description of VPCs into an ordered plan of network
//! resources for a hub-and-spoke deployment: one inspection VPC, any number
//! of spoke VPCs, and a shared transit gateway routing between them.
//!
//! # Modules
//!
//! - [`domain`] - CIDRs, VPC declarations and their invariants
//! - [`allocator`] - carves subnets out of a VPC block
//! - [`topology`] - the planned entities and their dependency edges
//! - [`planner`] - per-VPC planning and route synthesis
//! - [`plan_graph`] - dependency-ordered emission
//! - [`parameter_store`] - state shared between phases
//! - [`provisioner`] - consumers of an ordered plan
//! - [`phase`] - runs one phase end to end

pub mod allocator;
pub mod config;
pub mod domain;
pub mod errors;
pub mod parameter_store;
pub mod phase;
pub mod plan_graph;
pub mod planner;
pub mod provisioner;
pub mod topology;

// Re-export commonly used types
pub use allocator::CidrAllocator;
pub use config::{DeploymentConfig, NetworkSettings};
pub use domain::{Cidr, SubnetAllocation, SubnetRole, SubnetSpec, VpcRole, VpcSpec};
pub use errors::{MalformedCrossPhaseRecord, PlannerError, PlannerResult};
pub use parameter_store::{
    AttachmentRecord, InMemoryParameterStore, NatsParameterStore, NatsStoreConfig, ParameterKeys,
    ParameterStore,
};
pub use phase::{Phase, PhaseReport, PhaseRunner};
pub use plan_graph::{PlannedEntity, ResourcePlanGraph};
pub use planner::{RoutePlanner, RouteSynthesis, TgwRouteTables, VpcPlan};
pub use provisioner::{DryRunProvisioner, ProvisionReport, ProvisionStatus, Provisioner};
pub use topology::{Entity, EntityKey, ResourceRef, TopologyModel};
