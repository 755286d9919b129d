// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cross-Phase Parameter Store
//!
//! Deployment phases run as separate invocations, possibly in different
//! accounts. The only state they share is a key/value store with
//! read-after-write consistency and no multi-key transactions.
//!
//! # Keys
//!
//! | key                              | value                    | written by        |
//! |----------------------------------|--------------------------|-------------------|
//! | `{prefix}.transit-gateway.id`    | transit gateway id       | hub VPC phase     |
//! | `{prefix}.route-table.{name}`    | TGW route table id       | hub VPC phase     |
//! | `{prefix}.attachment.{vpc}`      | `attachmentId,vpcCidr`   | each VPC phase    |
//!
//! Keys are only ever written by the phase that owns them; a failed phase
//! writes nothing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::Cidr;
use crate::errors::{MalformedCrossPhaseRecord, PlannerResult};

pub mod nats;

pub use nats::{NatsParameterStore, NatsStoreConfig};

/// Default key prefix
pub const DEFAULT_PREFIX: &str = "tgw";

/// Abstract key/value store shared across deployment phases
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read a value; `None` when the key has not been written yet
    async fn get(&self, key: &str) -> PlannerResult<Option<String>>;

    /// Write (or overwrite) a value
    async fn put(&self, key: &str, value: &str) -> PlannerResult<()>;
}

/// Builds the well-known keys under a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterKeys {
    prefix: String,
}

impl ParameterKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn transit_gateway_id(&self) -> String {
        format!("{}.transit-gateway.id", self.prefix)
    }

    pub fn route_table(&self, name: &str) -> String {
        format!("{}.route-table.{}", self.prefix, name)
    }

    pub fn attachment(&self, vpc: &str) -> String {
        format!("{}.attachment.{}", self.prefix, vpc)
    }
}

impl Default for ParameterKeys {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// `(attachmentId, vpcCidr)` as persisted by a VPC phase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentRecord {
    pub attachment_id: String,
    pub vpc_cidr: Cidr,
}

impl AttachmentRecord {
    pub fn new(attachment_id: impl Into<String>, vpc_cidr: Cidr) -> Self {
        Self {
            attachment_id: attachment_id.into(),
            vpc_cidr,
        }
    }

    /// Comma-joined form stored in the parameter store
    pub fn encode(&self) -> String {
        format!("{},{}", self.attachment_id, self.vpc_cidr)
    }

    /// Parse `attachmentId,vpcCidr`, splitting on the first comma
    pub fn parse(raw: &str) -> Result<Self, MalformedCrossPhaseRecord> {
        let (id, cidr) = raw
            .split_once(',')
            .ok_or_else(|| MalformedCrossPhaseRecord::new(raw, "missing VPC CIDR"))?;

        let id = id.trim();
        if id.is_empty() {
            return Err(MalformedCrossPhaseRecord::new(raw, "missing attachment id"));
        }

        let cidr = cidr.trim();
        if cidr.is_empty() {
            return Err(MalformedCrossPhaseRecord::new(raw, "missing VPC CIDR"));
        }

        let vpc_cidr =
            Cidr::new(cidr).map_err(|e| MalformedCrossPhaseRecord::new(raw, e.to_string()))?;

        Ok(Self::new(id, vpc_cidr))
    }
}

/// Process-local parameter store
///
/// Clones share the same underlying map, so a single instance can be
/// handed to several phase runners in tests or single-process runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParameterStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    /// Copy of all current values
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.values.read().await.clone()
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get(&self, key: &str) -> PlannerResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> PlannerResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
