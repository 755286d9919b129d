// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment configuration
//!
//! The declaration the planner works from, in the shape produced by the
//! external configuration loader. Nothing here reads files or environment
//! variables; callers hand in a JSON document or build the structs directly.

use serde::{Deserialize, Serialize};

use crate::domain::invariants::validate_deployment;
use crate::domain::{Cidr, VpcSpec};
use crate::errors::{PlannerError, PlannerResult};
use crate::parameter_store::{ParameterKeys, DEFAULT_PREFIX};

/// Hub-wide network settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Aggregate CIDR of all VPCs, routed to the transit gateway from the
    /// inspection VPC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_cidr: Option<Cidr>,

    /// On-premises networks reached through the transit gateway
    #[serde(default)]
    pub onprem_cidrs: Vec<Cidr>,

    /// Name of the transit gateway created by the hub VPC
    #[serde(default = "default_transit_gateway_name")]
    pub transit_gateway_name: String,

    /// Prefix of every parameter store key
    #[serde(default = "default_parameter_prefix")]
    pub parameter_prefix: String,
}

fn default_transit_gateway_name() -> String {
    "hub-tgw".to_string()
}

fn default_parameter_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            overall_cidr: None,
            onprem_cidrs: Vec::new(),
            transit_gateway_name: default_transit_gateway_name(),
            parameter_prefix: default_parameter_prefix(),
        }
    }
}

impl NetworkSettings {
    pub fn with_overall_cidr(mut self, cidr: Cidr) -> Self {
        self.overall_cidr = Some(cidr);
        self
    }

    pub fn with_onprem_cidrs(mut self, cidrs: Vec<Cidr>) -> Self {
        self.onprem_cidrs = cidrs;
        self
    }

    pub fn keys(&self) -> ParameterKeys {
        ParameterKeys::new(self.parameter_prefix.clone())
    }
}

/// A complete deployment declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub network: NetworkSettings,
    pub vpcs: Vec<VpcSpec>,
}

impl DeploymentConfig {
    pub fn new(network: NetworkSettings, vpcs: Vec<VpcSpec>) -> PlannerResult<Self> {
        let config = Self { network, vpcs };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> PlannerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Deployment-wide checks; per-VPC allocation rules are checked when
    /// that VPC's phase runs so one bad VPC does not block the others
    pub fn validate(&self) -> PlannerResult<()> {
        if self.network.parameter_prefix.trim().is_empty() {
            return Err(PlannerError::InvalidConfig(
                "parameter_prefix cannot be empty".to_string(),
            ));
        }
        if self.network.transit_gateway_name.trim().is_empty() {
            return Err(PlannerError::InvalidConfig(
                "transit_gateway_name cannot be empty".to_string(),
            ));
        }
        validate_deployment(&self.vpcs)?;
        Ok(())
    }

    pub fn vpc(&self, name: &str) -> Option<&VpcSpec> {
        self.vpcs.iter().find(|v| v.name == name)
    }

    pub fn inspection_vpc(&self) -> Option<&VpcSpec> {
        self.vpcs.iter().find(|v| v.is_inspection())
    }

    pub fn inspection_cidr(&self) -> Option<Cidr> {
        self.inspection_vpc().map(|v| v.cidr)
    }

    pub fn keys(&self) -> ParameterKeys {
        self.network.keys()
    }
}
