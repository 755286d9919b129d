// Copyright (c) 2025 - Cowboy AI, Inc.
//! Phase Runner
//!
//! Drives one deployment phase end to end:
//!
//! ```text
//! ParameterStore ──read──▶ RoutePlanner ──▶ ResourcePlanGraph ──▶ Provisioner
//!       ▲                                                             │
//!       └──────────────────────── write (on success only) ◀───────────┘
//! ```
//!
//! Phases run as separate invocations and share state only through the
//! parameter store. A phase that fails at any step writes nothing.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DeploymentConfig;
use crate::domain::VpcSpec;
use crate::errors::{PlannerError, PlannerResult};
use crate::parameter_store::{AttachmentRecord, ParameterKeys, ParameterStore};
use crate::plan_graph::{PlannedEntity, ResourcePlanGraph};
use crate::planner::{RoutePlanner, TgwRouteTables, VpcPlan, EGRESS_RT, INSPECTION_RT};
use crate::provisioner::{ProvisionReport, Provisioner};
use crate::topology::{EntityKey, TopologyModel};

/// Command selecting a VPC phase; followed by the VPC name
pub const VPC_COMMAND: &str = "vpc";
/// Command selecting the routing phase
pub const ROUTES_COMMAND: &str = "routes";

/// One independently runnable deployment step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum Phase {
    /// Create one VPC and, when a hub exists, attach it
    VpcProvisioning { vpc: String },
    /// Associate persisted attachments and route between them
    RouteSynthesis,
}

impl Phase {
    pub fn vpc(name: impl Into<String>) -> Self {
        Self::VpcProvisioning { vpc: name.into() }
    }

    /// Parse `vpc <name>` or `routes`, consuming only those tokens
    pub fn from_args(args: &mut impl Iterator<Item = String>) -> PlannerResult<Self> {
        match args.next().as_deref() {
            Some(VPC_COMMAND) => args
                .next()
                .map(Self::vpc)
                .ok_or_else(|| PlannerError::InvalidConfig("missing VPC name".to_string())),
            Some(ROUTES_COMMAND) => Ok(Self::RouteSynthesis),
            Some(other) => Err(PlannerError::InvalidConfig(format!(
                "unknown phase '{}', expected '{}' or '{}'",
                other, VPC_COMMAND, ROUTES_COMMAND
            ))),
            None => Err(PlannerError::InvalidConfig("missing phase".to_string())),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VpcProvisioning { vpc } => write!(f, "vpc:{}", vpc),
            Self::RouteSynthesis => write!(f, "{}", ROUTES_COMMAND),
        }
    }
}

/// A record skipped by the routing phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub raw: String,
    pub reason: String,
}

/// Outcome of a completed phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub run_id: Uuid,
    pub phase: Phase,
    /// Entities in the order they were provisioned
    pub plan: Vec<PlannedEntity>,
    pub report: ProvisionReport,
    /// Parameter store keys written by this phase
    pub persisted: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
    pub completed_at: DateTime<Utc>,
}

impl PhaseReport {
    fn new(phase: Phase, plan: Vec<PlannedEntity>, report: ProvisionReport) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            phase,
            plan,
            report,
            persisted: Vec::new(),
            skipped: Vec::new(),
            completed_at: Utc::now(),
        }
    }
}

/// Runs phases of one deployment against a store and a provisioner
#[derive(Clone)]
pub struct PhaseRunner {
    config: DeploymentConfig,
    planner: RoutePlanner,
    keys: ParameterKeys,
    store: Arc<dyn ParameterStore>,
    provisioner: Arc<dyn Provisioner>,
}

impl PhaseRunner {
    pub fn new(
        config: DeploymentConfig,
        store: Arc<dyn ParameterStore>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Self {
        let planner = RoutePlanner::from_config(&config);
        let keys = config.keys();
        Self {
            config,
            planner,
            keys,
            store,
            provisioner,
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn keys(&self) -> &ParameterKeys {
        &self.keys
    }

    pub async fn run(&self, phase: &Phase) -> PlannerResult<PhaseReport> {
        info!(phase = %phase, "Running phase");
        match phase {
            Phase::VpcProvisioning { vpc } => self.run_vpc(vpc).await,
            Phase::RouteSynthesis => self.run_routes().await,
        }
    }

    async fn run_vpc(&self, name: &str) -> PlannerResult<PhaseReport> {
        let vpc = self
            .config
            .vpc(name)
            .ok_or_else(|| PlannerError::InvalidConfig(format!("unknown VPC '{}'", name)))?;

        let existing_tgw = self.store.get(&self.keys.transit_gateway_id()).await?;
        let plan = self.planner.plan_vpc(vpc, existing_tgw.as_deref())?;

        let (steps, report) = self.provision(&plan.model, name).await?;
        let persisted = self.persist_vpc(vpc, &plan, &report).await?;

        let mut phase_report = PhaseReport::new(Phase::vpc(name), steps, report);
        phase_report.persisted = persisted;
        info!(
            vpc = %name,
            entities = phase_report.plan.len(),
            persisted = phase_report.persisted.len(),
            "VPC phase complete"
        );
        Ok(phase_report)
    }

    async fn run_routes(&self) -> PlannerResult<PhaseReport> {
        let Some(tables) = self.route_tables().await? else {
            warn!("Transit gateway route tables not persisted yet; nothing to route");
            return Ok(PhaseReport::new(
                Phase::RouteSynthesis,
                Vec::new(),
                ProvisionReport::new(),
            ));
        };

        let mut records = Vec::new();
        for vpc in &self.config.vpcs {
            match self.store.get(&self.keys.attachment(&vpc.name)).await? {
                Some(raw) => records.push(raw),
                None => debug!(vpc = %vpc.name, "No attachment persisted yet"),
            }
        }

        let synthesis = self.planner.synthesize_routes(&records, &tables)?;
        let (steps, report) = self.provision(&synthesis.model, ROUTES_COMMAND).await?;

        let mut phase_report = PhaseReport::new(Phase::RouteSynthesis, steps, report);
        phase_report.skipped = synthesis
            .skipped
            .into_iter()
            .map(|s| SkippedRecord {
                raw: s.raw,
                reason: s.reason,
            })
            .collect();
        info!(
            attachments = synthesis.accepted.len(),
            skipped = phase_report.skipped.len(),
            "Routing phase complete"
        );
        Ok(phase_report)
    }

    async fn route_tables(&self) -> PlannerResult<Option<TgwRouteTables>> {
        let egress = self.store.get(&self.keys.route_table(EGRESS_RT)).await?;
        let inspection = self.store.get(&self.keys.route_table(INSPECTION_RT)).await?;
        Ok(match (egress, inspection) {
            (Some(egress), Some(inspection)) => Some(TgwRouteTables::existing(egress, inspection)),
            _ => None,
        })
    }

    async fn provision(
        &self,
        model: &TopologyModel,
        phase: &str,
    ) -> PlannerResult<(Vec<PlannedEntity>, ProvisionReport)> {
        let steps = ResourcePlanGraph::new(model).serialize()?;
        let report = self.provisioner.provision(&steps).await?;

        if !report.is_success() {
            let failures: Vec<String> = report
                .failures()
                .into_iter()
                .map(|(key, reason)| format!("{}: {}", key, reason))
                .collect();
            warn!(phase, failed = failures.len(), "Provisioning failed; nothing persisted");
            return Err(PlannerError::Provisioner(format!(
                "phase {} failed: {}",
                phase,
                failures.join("; ")
            )));
        }
        Ok((steps, report))
    }

    /// Write the hub ids and the attachment record, in that order
    async fn persist_vpc(
        &self,
        vpc: &VpcSpec,
        plan: &VpcPlan,
        report: &ProvisionReport,
    ) -> PlannerResult<Vec<String>> {
        let mut writes: Vec<(String, String)> = Vec::new();

        if let Some(tgw) = &plan.transit_gateway {
            writes.push((self.keys.transit_gateway_id(), created_id(report, tgw)?));
            for (name, key) in &plan.route_tables {
                writes.push((self.keys.route_table(name), created_id(report, key)?));
            }
        }
        if let Some(attachment) = &plan.attachment {
            let record = AttachmentRecord::new(created_id(report, attachment)?, vpc.cidr);
            writes.push((self.keys.attachment(&vpc.name), record.encode()));
        }

        let mut persisted = Vec::with_capacity(writes.len());
        for (key, value) in writes {
            self.store.put(&key, &value).await?;
            debug!(key = %key, value = %value, "Persisted cross-phase value");
            persisted.push(key);
        }
        Ok(persisted)
    }
}

fn created_id(report: &ProvisionReport, key: &EntityKey) -> PlannerResult<String> {
    report
        .id_of(key)
        .map(str::to_string)
        .ok_or_else(|| PlannerError::Provisioner(format!("no id reported for {}", key)))
}
