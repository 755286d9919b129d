// Copyright (c) 2025 - Cowboy AI, Inc.
//! Transit Gateway Plan
//!
//! Runs one deployment phase and prints the ordered plan as JSON.
//!
//! Run with:
//! - `cargo run --bin tgw-plan -- vpc <vpc-name> [config.json]`
//! - `cargo run --bin tgw-plan -- routes [config.json]`
//!
//! Environment:
//! - `TGW_PLAN_CONFIG`: deployment config path when not given as an argument
//! - `NATS_URL`: use a JetStream key/value parameter store at this server;
//!   without it an in-memory store is used and nothing outlives the process
//! - `TGW_PLAN_BUCKET`: key/value bucket name (default `TGW_PLAN`)

use std::sync::Arc;

use anyhow::{Context, Result};
use cim_transit_planner::{
    DeploymentConfig, DryRunProvisioner, InMemoryParameterStore, NatsParameterStore,
    NatsStoreConfig, ParameterStore, Phase, PhaseRunner,
};
use tracing::info;

/// Configuration for one invocation
#[derive(Debug, Clone)]
struct PlanConfig {
    /// Phase to run
    phase: Phase,
    /// Deployment config path
    config_path: String,
    /// NATS server URL, when a networked store is wanted
    nats_url: Option<String>,
    /// Key/value bucket
    bucket: Option<String>,
}

impl PlanConfig {
    /// Load configuration from arguments and environment variables
    fn from_env() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let phase = Phase::from_args(&mut args)
            .context("usage: tgw-plan vpc <vpc-name> [config.json] | tgw-plan routes [config.json]")?;

        let config_path = match args.next() {
            Some(path) => path,
            None => std::env::var("TGW_PLAN_CONFIG")
                .context("No config path given and TGW_PLAN_CONFIG not set")?,
        };

        Ok(Self {
            phase,
            config_path,
            nats_url: std::env::var("NATS_URL").ok(),
            bucket: std::env::var("TGW_PLAN_BUCKET").ok(),
        })
    }

    async fn store(&self) -> Result<Arc<dyn ParameterStore>> {
        let Some(url) = &self.nats_url else {
            info!("Using in-memory parameter store");
            return Ok(Arc::new(InMemoryParameterStore::new()));
        };

        let mut nats = NatsStoreConfig {
            servers: vec![url.clone()],
            ..Default::default()
        };
        if let Some(bucket) = &self.bucket {
            nats.bucket = bucket.clone();
        }
        let store = NatsParameterStore::connect(nats)
            .await
            .context("Failed to open NATS parameter store")?;
        info!("Using NATS parameter store, bucket {}", store.bucket());
        Ok(Arc::new(store))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = PlanConfig::from_env()?;
    info!("Phase: {}", config.phase);
    info!("Config: {}", config.config_path);

    let json = std::fs::read_to_string(&config.config_path)
        .with_context(|| format!("Failed to read {}", config.config_path))?;
    let deployment = DeploymentConfig::from_json(&json).context("Invalid deployment config")?;

    let store = config.store().await?;
    let runner = PhaseRunner::new(deployment, store, Arc::new(DryRunProvisioner::new()));

    let report = runner
        .run(&config.phase)
        .await
        .with_context(|| format!("Phase {} failed", config.phase))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
