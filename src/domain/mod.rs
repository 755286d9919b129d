// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Topology Domain Models
//!
//! Value objects and declarations the planner works on.
//!
//! # Value Objects with Invariants
//!
//! - [`Cidr`] - canonical IPv4 CIDR block
//! - [`AvailabilityZone`] - zone index with `a`/`b`/`c` suffix
//! - [`SubnetAllocation`] - mask or explicit per-zone CIDR list
//! - [`ResourceKind`] - closed taxonomy of planned resources
//!
//! # Declarations
//!
//! - [`VpcSpec`] - a VPC as declared by configuration
//! - [`SubnetSpec`] - a concrete subnet produced by allocation

pub mod invariants;
pub mod network;
pub mod resource_kind;
pub mod vpc;

pub use invariants::{ValidationError, ValidationResult, MAX_SUBNET_PREFIX};
pub use network::{parse_cidr_list, Cidr, NetworkError};
pub use resource_kind::ResourceKind;
pub use vpc::{
    AvailabilityZone, SubnetAllocation, SubnetAllocations, SubnetRole, SubnetSpec, VpcRole,
    VpcSpec, AZ_COUNT,
};
