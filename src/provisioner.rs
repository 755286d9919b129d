// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioner
//!
//! Consumer of an ordered plan. Planning is pure and returns the plan as
//! data; a provisioner performs (or simulates) the creation and reports
//! what happened to each entity.
//!
//! ```text
//! RoutePlanner             Provisioner
//! ────────────             ───────────
//! TopologyModel ──▶ [PlannedEntity] ──▶ provision() ──▶ ProvisionReport
//!   (pure)            (ordered)          (async I/O)     key → Created { id }
//! ```

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{PlannerError, PlannerResult};
use crate::plan_graph::PlannedEntity;
use crate::topology::EntityKey;

/// Outcome for one planned entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ProvisionStatus {
    Created { id: String },
    Failed { reason: String },
}

/// Per-entity outcome of provisioning a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<ProvisionEntry>", from = "Vec<ProvisionEntry>")]
pub struct ProvisionReport {
    statuses: HashMap<EntityKey, ProvisionStatus>,
}

/// Serialized form of one report line; JSON maps need string keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionEntry {
    pub key: EntityKey,
    #[serde(flatten)]
    pub status: ProvisionStatus,
}

impl From<ProvisionReport> for Vec<ProvisionEntry> {
    fn from(report: ProvisionReport) -> Self {
        let mut entries: Vec<ProvisionEntry> = report
            .statuses
            .into_iter()
            .map(|(key, status)| ProvisionEntry { key, status })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

impl From<Vec<ProvisionEntry>> for ProvisionReport {
    fn from(entries: Vec<ProvisionEntry>) -> Self {
        Self {
            statuses: entries.into_iter().map(|e| (e.key, e.status)).collect(),
        }
    }
}

impl ProvisionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&mut self, key: EntityKey, id: impl Into<String>) {
        self.statuses
            .insert(key, ProvisionStatus::Created { id: id.into() });
    }

    pub fn failed(&mut self, key: EntityKey, reason: impl Into<String>) {
        self.statuses.insert(
            key,
            ProvisionStatus::Failed {
                reason: reason.into(),
            },
        );
    }

    pub fn status(&self, key: &EntityKey) -> Option<&ProvisionStatus> {
        self.statuses.get(key)
    }

    /// Provider id of `key`, if it was created
    pub fn id_of(&self, key: &EntityKey) -> Option<&str> {
        match self.statuses.get(key) {
            Some(ProvisionStatus::Created { id }) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Entities that failed, sorted by key
    pub fn failures(&self) -> Vec<(&EntityKey, &str)> {
        let mut failures: Vec<(&EntityKey, &str)> = self
            .statuses
            .iter()
            .filter_map(|(key, status)| match status {
                ProvisionStatus::Failed { reason } => Some((key, reason.as_str())),
                ProvisionStatus::Created { .. } => None,
            })
            .collect();
        failures.sort_by(|a, b| a.0.cmp(b.0));
        failures
    }

    pub fn is_success(&self) -> bool {
        self.statuses
            .values()
            .all(|s| matches!(s, ProvisionStatus::Created { .. }))
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Creates the resources of an ordered plan
///
/// Implementations receive entities in dependency order and must not
/// create an entity before its dependencies. Per-entity failures are
/// reported in the [`ProvisionReport`]; `Err` is reserved for failures
/// of the provisioner itself.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self, plan: &[PlannedEntity]) -> PlannerResult<ProvisionReport>;
}

/// Provisioner that creates nothing
///
/// Assigns deterministic ids of the form `{prefix}-{name}`, checks that each
/// entity arrives after its dependencies, and logs every entity. Entities
/// registered with [`DryRunProvisioner::fail_on`] are reported as failed,
/// along with everything depending on them.
#[derive(Debug, Clone, Default)]
pub struct DryRunProvisioner {
    failing: HashSet<EntityKey>,
}

impl DryRunProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `key` as failed when it is provisioned
    pub fn fail_on(mut self, key: EntityKey) -> Self {
        self.failing.insert(key);
        self
    }

    /// Deterministic id for `key`
    pub fn id_for(key: &EntityKey) -> String {
        let name: String = key
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        format!("{}-{}", key.kind.id_prefix(), name)
    }
}

#[async_trait]
impl Provisioner for DryRunProvisioner {
    async fn provision(&self, plan: &[PlannedEntity]) -> PlannerResult<ProvisionReport> {
        let mut report = ProvisionReport::new();
        let mut emitted: HashSet<&EntityKey> = HashSet::with_capacity(plan.len());

        for step in plan {
            if let Some(dep) = step.dependencies.iter().find(|d| !emitted.contains(d)) {
                return Err(PlannerError::Provisioner(format!(
                    "{} arrived before its dependency {}",
                    step.key, dep
                )));
            }
            emitted.insert(&step.key);

            if self.failing.contains(&step.key) {
                warn!(entity = %step.key, "Dry run: simulated failure");
                report.failed(step.key.clone(), "simulated failure");
                continue;
            }

            if let Some(dep) = step
                .dependencies
                .iter()
                .find(|d| !matches!(report.status(d), Some(ProvisionStatus::Created { .. })))
            {
                debug!(entity = %step.key, dependency = %dep, "Dry run: dependency not created");
                report.failed(step.key.clone(), format!("dependency {} was not created", dep));
                continue;
            }

            let id = Self::id_for(&step.key);
            debug!(entity = %step.key, id = %id, "Dry run: created {}", step.key.kind.display_name());
            report.created(step.key.clone(), id);
        }

        info!(
            entities = plan.len(),
            failed = report.failures().len(),
            "Dry run provisioning complete"
        );
        Ok(report)
    }
}
