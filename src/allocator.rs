// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subnet CIDR Allocation
//!
//! Turns the per-role allocations of a [`VpcSpec`] into concrete
//! [`SubnetSpec`]s, one per availability zone.
//!
//! Mask allocations are carved sequentially from the base of the VPC CIDR,
//! each block aligned to its own size. Only the first mask-allocated role
//! may be carved unless the VPC is marked contiguous; later roles are then
//! expected to list explicit CIDRs. Explicit lists are taken as given:
//! disjointness and containment are the caller's responsibility.

use std::net::Ipv4Addr;

use tracing::debug;

use crate::domain::invariants::{validate_allocation, validate_roles};
use crate::domain::{AvailabilityZone, Cidr, NetworkError, SubnetAllocation, SubnetSpec, VpcSpec};
use crate::errors::{PlannerError, PlannerResult};

/// Sequential first-fit cursor over a parent CIDR
#[derive(Debug, Clone)]
pub struct BlockCursor {
    parent: Cidr,
    next: u64,
}

impl BlockCursor {
    pub fn new(parent: Cidr) -> Self {
        Self {
            parent,
            next: parent.start(),
        }
    }

    /// Take the next aligned `/prefix_len` block
    pub fn take(&mut self, prefix_len: u8) -> Result<Cidr, NetworkError> {
        if prefix_len < self.parent.prefix_len() || prefix_len > 32 {
            return Err(NetworkError::InvalidPrefixLength(
                prefix_len,
                self.parent.prefix_len(),
                32,
            ));
        }

        let size = 1u64 << (32 - u32::from(prefix_len));
        let aligned = self.next.div_ceil(size) * size;
        if aligned + size > self.parent.end() {
            return Err(NetworkError::Exhausted {
                parent: self.parent.to_string(),
                prefix_len,
            });
        }

        // aligned + size <= parent.end() <= 2^32, so the start fits in u32
        let cidr = Cidr::from_parts(Ipv4Addr::from(aligned as u32), prefix_len)?;
        self.next = aligned + size;
        Ok(cidr)
    }
}

/// Allocates subnet CIDRs for a VPC
#[derive(Debug, Clone, Default)]
pub struct CidrAllocator;

impl CidrAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Produce the subnets of `vpc` in role order (public, private,
    /// transit), zones `a, b, c` within each role
    pub fn allocate(&self, vpc: &VpcSpec) -> PlannerResult<Vec<SubnetSpec>> {
        validate_roles(vpc)?;

        let mut cursor = BlockCursor::new(vpc.cidr);
        let mut carved_any = false;
        let mut subnets = Vec::new();

        for (role, allocation) in vpc.subnets.iter() {
            validate_allocation(vpc, role, allocation)?;

            match allocation {
                SubnetAllocation::Mask(mask) => {
                    if carved_any && !vpc.contiguous {
                        return Err(PlannerError::configuration(
                            &vpc.name,
                            format!(
                                "/{} mask for {} subnets follows another mask-allocated role; \
                                 mark the VPC contiguous or list explicit CIDRs",
                                mask, role
                            ),
                        ));
                    }
                    for az in AvailabilityZone::all() {
                        let cidr = cursor
                            .take(*mask)
                            .map_err(|e| PlannerError::configuration(&vpc.name, e.to_string()))?;
                        subnets.push(SubnetSpec {
                            vpc: vpc.name.clone(),
                            role,
                            az,
                            cidr,
                        });
                    }
                    carved_any = true;
                }
                SubnetAllocation::Explicit(cidrs) => {
                    for (az, cidr) in AvailabilityZone::all().zip(cidrs.iter()) {
                        subnets.push(SubnetSpec {
                            vpc: vpc.name.clone(),
                            role,
                            az,
                            cidr: *cidr,
                        });
                    }
                }
            }
        }

        debug!(
            vpc = %vpc.name,
            subnets = subnets.len(),
            "Allocated subnets"
        );
        Ok(subnets)
    }
}
