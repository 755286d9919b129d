// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Topology Invariants
//!
//! Business rules for VPC declarations and deployment-wide consistency.
//! All functions are pure (no side effects) and return detailed
//! validation results.
//!
//! # Invariant Categories
//!
//! 1. **Role Invariants**: which subnet roles a VPC role needs
//! 2. **Allocation Invariants**: mask ranges and explicit list sizes
//! 3. **Deployment Invariants**: unique names, single inspection VPC, single hub

use std::collections::HashSet;

use crate::errors::PlannerError;

use super::vpc::{SubnetAllocation, SubnetRole, VpcSpec, AZ_COUNT};

/// Largest prefix a subnet may use
pub const MAX_SUBNET_PREFIX: u8 = 28;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A role the planner depends on was not declared
    #[error("{role} subnets are required for {vpc_role} VPC '{vpc}'")]
    MissingRole {
        vpc: String,
        vpc_role: String,
        role: SubnetRole,
    },

    /// A role that this VPC role may not carry
    #[error("VPC '{vpc}' may not declare {role} subnets: {reason}")]
    ForbiddenRole {
        vpc: String,
        role: SubnetRole,
        reason: String,
    },

    /// Mask outside the allowed range
    #[error("VPC '{vpc}': /{mask} for {role} subnets must be between /{min} and /{max}")]
    MaskOutOfRange {
        vpc: String,
        role: SubnetRole,
        mask: u8,
        min: u8,
        max: u8,
    },

    /// Explicit list does not map one CIDR per availability zone
    #[error("VPC '{vpc}': {role} subnets list {actual} CIDRs, expected {expected}")]
    ExplicitCount {
        vpc: String,
        role: SubnetRole,
        expected: usize,
        actual: usize,
    },

    /// Deployment-wide rule violation
    #[error("{0}")]
    Deployment(String),
}

impl From<ValidationError> for PlannerError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::MissingRole { vpc, .. }
            | ValidationError::ForbiddenRole { vpc, .. }
            | ValidationError::MaskOutOfRange { vpc, .. }
            | ValidationError::ExplicitCount { vpc, .. } => {
                PlannerError::configuration(vpc.clone(), err.to_string())
            }
            ValidationError::Deployment(reason) => PlannerError::InvalidConfig(reason.clone()),
        }
    }
}

/// Validate the subnet roles a VPC declares against its role
///
/// # Rules
/// - Transit subnets are always required (the attachment lands there)
/// - The inspection VPC needs public subnets for its NAT gateways
/// - Spokes may not declare public subnets
pub fn validate_roles(vpc: &VpcSpec) -> ValidationResult {
    if vpc.subnets.transit.is_none() {
        return Err(ValidationError::MissingRole {
            vpc: vpc.name.clone(),
            vpc_role: vpc.role.to_string(),
            role: SubnetRole::Transit,
        });
    }

    if vpc.is_inspection() && vpc.subnets.public.is_none() {
        return Err(ValidationError::MissingRole {
            vpc: vpc.name.clone(),
            vpc_role: vpc.role.to_string(),
            role: SubnetRole::Public,
        });
    }

    if !vpc.is_inspection() && vpc.subnets.public.is_some() {
        return Err(ValidationError::ForbiddenRole {
            vpc: vpc.name.clone(),
            role: SubnetRole::Public,
            reason: "internet egress belongs to the inspection VPC".to_string(),
        });
    }

    Ok(())
}

/// Validate one role's allocation
///
/// # Rules
/// - Masks lie between the VPC prefix and [`MAX_SUBNET_PREFIX`]
/// - Explicit lists carry exactly one CIDR per availability zone
pub fn validate_allocation(
    vpc: &VpcSpec,
    role: SubnetRole,
    allocation: &SubnetAllocation,
) -> ValidationResult {
    match allocation {
        SubnetAllocation::Mask(mask) => {
            let min = vpc.cidr.prefix_len();
            if *mask < min || *mask > MAX_SUBNET_PREFIX {
                return Err(ValidationError::MaskOutOfRange {
                    vpc: vpc.name.clone(),
                    role,
                    mask: *mask,
                    min,
                    max: MAX_SUBNET_PREFIX,
                });
            }
        }
        SubnetAllocation::Explicit(cidrs) => {
            if cidrs.len() != AZ_COUNT {
                return Err(ValidationError::ExplicitCount {
                    vpc: vpc.name.clone(),
                    role,
                    expected: AZ_COUNT,
                    actual: cidrs.len(),
                });
            }
        }
    }
    Ok(())
}

/// Validate the deployment as a whole
///
/// # Rules
/// - VPC names are unique
/// - At most one inspection VPC
/// - At most one VPC owns (shares) the transit gateway
/// - VPC CIDRs do not overlap
pub fn validate_deployment(vpcs: &[VpcSpec]) -> ValidationResult {
    let mut names = HashSet::new();
    for vpc in vpcs {
        if vpc.name.trim().is_empty() {
            return Err(ValidationError::Deployment("VPC names cannot be empty".to_string()));
        }
        if !names.insert(vpc.name.as_str()) {
            return Err(ValidationError::Deployment(format!(
                "duplicate VPC name '{}'",
                vpc.name
            )));
        }
    }

    let inspection: Vec<&str> = vpcs
        .iter()
        .filter(|v| v.is_inspection())
        .map(|v| v.name.as_str())
        .collect();
    if inspection.len() > 1 {
        return Err(ValidationError::Deployment(format!(
            "only one inspection VPC is allowed, found: {}",
            inspection.join(", ")
        )));
    }

    let hubs: Vec<&str> = vpcs
        .iter()
        .filter(|v| v.is_hub_owner())
        .map(|v| v.name.as_str())
        .collect();
    if hubs.len() > 1 {
        return Err(ValidationError::Deployment(format!(
            "only one VPC may share the transit gateway, found: {}",
            hubs.join(", ")
        )));
    }

    for (i, a) in vpcs.iter().enumerate() {
        for b in &vpcs[i + 1..] {
            if a.cidr.overlaps(&b.cidr) {
                return Err(ValidationError::Deployment(format!(
                    "VPC '{}' ({}) overlaps VPC '{}' ({})",
                    a.name, a.cidr, b.name, b.cidr
                )));
            }
        }
    }

    Ok(())
}
