// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream key/value backed parameter store

use std::time::Duration;

use async_nats::jetstream::{self, kv};
use async_nats::ConnectOptions;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::{PlannerError, PlannerResult};

use super::ParameterStore;

/// Configuration for the NATS parameter store
#[derive(Debug, Clone)]
pub struct NatsStoreConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Key/value bucket holding cross-phase values
    pub bucket: String,
    /// Revisions kept per key
    pub history: i64,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsStoreConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "cim-transit-planner".to_string(),
            bucket: "TGW_PLAN".to_string(),
            history: 5,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Parameter store over a JetStream key/value bucket
#[derive(Clone)]
pub struct NatsParameterStore {
    store: kv::Store,
    bucket: String,
}

impl NatsParameterStore {
    /// Connect and open the bucket, creating it on first use
    pub async fn connect(config: NatsStoreConfig) -> PlannerResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| PlannerError::ParameterStore(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        let jetstream = jetstream::new(client);
        let store = match jetstream.get_key_value(config.bucket.clone()).await {
            Ok(store) => store,
            Err(_) => {
                info!("Key/value bucket '{}' not found, creating", config.bucket);
                jetstream
                    .create_key_value(kv::Config {
                        bucket: config.bucket.clone(),
                        history: config.history,
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| PlannerError::ParameterStore(e.to_string()))?
            }
        };

        Ok(Self {
            store,
            bucket: config.bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ParameterStore for NatsParameterStore {
    async fn get(&self, key: &str) -> PlannerResult<Option<String>> {
        let entry = self
            .store
            .get(key)
            .await
            .map_err(|e| PlannerError::ParameterStore(e.to_string()))?;

        match entry {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    PlannerError::ParameterStore(format!("value of '{}' is not UTF-8: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str) -> PlannerResult<()> {
        let revision = self
            .store
            .put(key, value.to_string().into())
            .await
            .map_err(|e| PlannerError::ParameterStore(e.to_string()))?;

        debug!(key, revision, bucket = %self.bucket, "Stored parameter");
        Ok(())
    }
}
