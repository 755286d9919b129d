// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Subnet Allocation
//!
//! Contiguous carving must yield disjoint, aligned blocks of the requested
//! size, all inside the VPC block.

use std::net::Ipv4Addr;

use cim_transit_planner::domain::{Cidr, SubnetAllocation, SubnetRole, VpcSpec, AZ_COUNT};
use cim_transit_planner::{CidrAllocator, PlannerError};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// `(vpc prefix, private mask, transit mask)` that always fit the block
fn fitting_masks() -> impl Strategy<Value = (u8, u8, u8)> {
    (16u8..=22)
        .prop_flat_map(|vpc| (Just(vpc), (vpc + 2)..=26))
        .prop_flat_map(|(vpc, private)| (Just(vpc), Just(private), (private + 2)..=28))
}

/// A spoke VPC at `10.{second}.0.0/{prefix}`
fn spoke(prefix: u8, second: u8, private: u8, transit: u8) -> VpcSpec {
    let block = Cidr::from_parts(Ipv4Addr::new(10, second, 0, 0), prefix).unwrap();
    VpcSpec::spoke("spoke", block)
        .with_contiguous(true)
        .with_subnets(SubnetRole::Private, SubnetAllocation::Mask(private))
        .with_subnets(SubnetRole::Transit, SubnetAllocation::Mask(transit))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Carved subnets are disjoint and inside the VPC
    #[test]
    fn prop_contiguous_subnets_disjoint((prefix, private, transit) in fitting_masks()) {
        let vpc = spoke(prefix, 0, private, transit);
        let subnets = CidrAllocator::new().allocate(&vpc).unwrap();

        prop_assert_eq!(subnets.len(), 2 * AZ_COUNT);
        for (i, a) in subnets.iter().enumerate() {
            prop_assert!(vpc.cidr.contains(&a.cidr), "{} outside {}", a.cidr, vpc.cidr);
            for b in &subnets[i + 1..] {
                prop_assert!(!a.cidr.overlaps(&b.cidr), "{} overlaps {}", a.cidr, b.cidr);
            }
        }
    }

    /// Property: Each block has the requested size and is aligned to it
    #[test]
    fn prop_blocks_sized_and_aligned((prefix, private, transit) in fitting_masks()) {
        let vpc = spoke(prefix, 0, private, transit);
        let subnets = CidrAllocator::new().allocate(&vpc).unwrap();

        for subnet in &subnets {
            let expected = match subnet.role {
                SubnetRole::Private => private,
                _ => transit,
            };
            prop_assert_eq!(subnet.cidr.prefix_len(), expected);
            prop_assert_eq!(subnet.cidr.start() % subnet.cidr.block_size(), 0);
        }
    }

    /// Property: Allocation is deterministic
    #[test]
    fn prop_allocation_deterministic(
        (prefix, private, transit) in fitting_masks(),
        second in 0u8..=255,
    ) {
        let vpc = spoke(prefix, second, private, transit);
        let first = CidrAllocator::new().allocate(&vpc).unwrap();
        let again = CidrAllocator::new().allocate(&vpc).unwrap();
        prop_assert_eq!(first, again);
    }

    /// Property: Masks that cannot fit are a configuration error, never a panic
    #[test]
    fn prop_oversized_masks_rejected(prefix in 20u8..=26) {
        // three blocks one bit smaller than the VPC cannot fit
        let vpc = spoke(prefix, 0, prefix + 1, 28);
        match CidrAllocator::new().allocate(&vpc) {
            Err(err) => prop_assert!(err.is_configuration(), "unexpected error: {}", err),
            Ok(subnets) => prop_assert!(false, "allocated {:?}", subnets),
        }
    }
}

#[test]
fn test_mask_larger_than_vpc_rejected() {
    let vpc = spoke(24, 0, 23, 28);
    assert!(matches!(
        CidrAllocator::new().allocate(&vpc),
        Err(PlannerError::Configuration { .. })
    ));
}
