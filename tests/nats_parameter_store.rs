// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream parameter store tests
//!
//! Run with a local server: `nats-server -js`, then
//! `cargo test --test nats_parameter_store -- --ignored`

mod fixtures;

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use cim_transit_planner::{
    DryRunProvisioner, NatsParameterStore, NatsStoreConfig, ParameterStore, Phase, PhaseRunner,
};

use fixtures::*;

/// Fresh bucket per run so tests do not see each other's keys
fn isolated_config() -> NatsStoreConfig {
    NatsStoreConfig {
        bucket: format!("TGW_PLAN_TEST_{}", Uuid::now_v7().simple()),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires NATS server"]
async fn test_get_put_roundtrip() -> Result<()> {
    // Given a connected store
    let store = NatsParameterStore::connect(isolated_config()).await?;

    // When a key is missing
    // Then get returns None
    assert_eq!(store.get("tgw.transit-gateway.id").await?, None);

    // When a value is written and overwritten
    store.put("tgw.transit-gateway.id", "tgw-0123").await?;
    store.put("tgw.transit-gateway.id", "tgw-0456").await?;

    // Then the latest value is read back
    assert_eq!(
        store.get("tgw.transit-gateway.id").await?,
        Some("tgw-0456".to_string())
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires NATS server"]
async fn test_phases_share_state_through_nats() -> Result<()> {
    // Given two runners, as separate invocations would be
    let config = isolated_config();
    let hub_store = NatsParameterStore::connect(config.clone()).await?;
    let spoke_store = NatsParameterStore::connect(config).await?;
    let hub = PhaseRunner::new(
        deployment(),
        Arc::new(hub_store),
        Arc::new(DryRunProvisioner::new()),
    );
    let spoke = PhaseRunner::new(
        deployment(),
        Arc::new(spoke_store.clone()),
        Arc::new(DryRunProvisioner::new()),
    );

    // When the hub deploys and then the spoke deploys
    hub.run(&Phase::vpc(INSPECTION_VPC)).await?;
    let report = spoke.run(&Phase::vpc(DEV_VPC)).await?;

    // Then the spoke found the hub's gateway and attached to it
    assert!(report.persisted.contains(&spoke.keys().attachment(DEV_VPC)));
    assert_eq!(
        spoke_store.get(&spoke.keys().attachment(DEV_VPC)).await?,
        Some(format!("{},{}", attachment_id(DEV_VPC), DEV_CIDR))
    );
    Ok(())
}
