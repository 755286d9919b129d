// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-transit-planner
//!
//! A three-VPC hub-and-spoke deployment: one inspection VPC that owns the
//! transit gateway, and two spokes carved with contiguous masks.
//!
//! Ids are deterministic because every test provisions with
//! [`DryRunProvisioner`].

#![allow(dead_code)]

use std::sync::Arc;

use cim_transit_planner::domain::ResourceKind;
use cim_transit_planner::{
    DeploymentConfig, DryRunProvisioner, EntityKey, InMemoryParameterStore, PhaseRunner,
};

pub const INSPECTION_VPC: &str = "shared-infra-services";
pub const DEV_VPC: &str = "datalake-dev";
pub const TEST_VPC: &str = "datalake-test";

pub const INSPECTION_CIDR: &str = "172.16.144.0/23";
pub const DEV_CIDR: &str = "172.16.146.0/24";
pub const TEST_CIDR: &str = "172.16.147.0/24";

pub const ORGANIZATION_ARN: &str = "arn:aws:organizations::012345678912:organization/o-sm87ee7sqc";

pub const DEPLOYMENT_JSON: &str = r#"{
    "network": {
        "overall_cidr": "172.16.128.0/17",
        "onprem_cidrs": ["10.200.0.0/16"],
        "transit_gateway_name": "hub-tgw"
    },
    "vpcs": [
        {
            "name": "shared-infra-services",
            "cidr": "172.16.144.0/23",
            "role": "inspection",
            "subnets": {
                "public": "27",
                "private": "172.16.144.128/27,172.16.144.160/27,172.16.144.192/27",
                "transit": "172.16.145.0/28,172.16.145.16/28,172.16.145.32/28"
            },
            "share_with": "arn:aws:organizations::012345678912:organization/o-sm87ee7sqc"
        },
        {
            "name": "datalake-dev",
            "cidr": "172.16.146.0/24",
            "contiguous": true,
            "subnets": { "private": "26", "transit": "28" }
        },
        {
            "name": "datalake-test",
            "cidr": "172.16.147.0/24",
            "contiguous": true,
            "subnets": { "private": "26", "transit": "28" }
        }
    ]
}"#;

pub fn deployment() -> DeploymentConfig {
    DeploymentConfig::from_json(DEPLOYMENT_JSON).expect("Invalid deployment fixture")
}

/// Runner over a fresh in-memory store, returned alongside the store
pub fn runner() -> (PhaseRunner, InMemoryParameterStore) {
    runner_with(deployment(), DryRunProvisioner::new())
}

pub fn runner_with(
    config: DeploymentConfig,
    provisioner: DryRunProvisioner,
) -> (PhaseRunner, InMemoryParameterStore) {
    let store = InMemoryParameterStore::new();
    let runner = PhaseRunner::new(config, Arc::new(store.clone()), Arc::new(provisioner));
    (runner, store)
}

pub fn attachment_key(vpc: &str) -> EntityKey {
    EntityKey::new(ResourceKind::Attachment, format!("{}/attachment", vpc))
}

/// Id the dry-run provisioner assigns to a VPC's attachment
pub fn attachment_id(vpc: &str) -> String {
    DryRunProvisioner::id_for(&attachment_key(vpc))
}

/// Id the dry-run provisioner assigns to a transit gateway route table
pub fn tgw_route_table_id(name: &str) -> String {
    DryRunProvisioner::id_for(&EntityKey::new(ResourceKind::RouteTable, name))
}
