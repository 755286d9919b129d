// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for topology planning operations

use thiserror::Error;

use crate::domain::NetworkError;

/// Errors that can occur while planning a transit gateway topology
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Missing or contradictory subnet allocation for a VPC
    #[error("Configuration error for VPC '{vpc}': {reason}")]
    Configuration { vpc: String, reason: String },

    /// Invalid deployment declaration (not tied to a single VPC)
    #[error("Invalid deployment configuration: {0}")]
    InvalidConfig(String),

    /// The dependency graph contains a cycle
    #[error("Cyclic dependency detected among: {}", .remaining.join(", "))]
    CyclicDependency { remaining: Vec<String> },

    /// Two different routes claim the same destination in one route table
    #[error("Route table '{route_table}' already has a different route for {destination}")]
    DuplicateRoute {
        route_table: String,
        destination: String,
    },

    /// A dependency edge references an entity that was never registered
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// CIDR or address validation error
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Cross-phase parameter store error
    #[error("Parameter store error: {0}")]
    ParameterStore(String),

    /// Provisioner error
    #[error("Provisioner error: {0}")]
    Provisioner(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PlannerError {
    /// Create a configuration error for the named VPC
    pub fn configuration(vpc: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            vpc: vpc.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts only the phase that raised it
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::InvalidConfig(_))
    }
}

/// Result type for planning operations
pub type PlannerResult<T> = Result<T, PlannerError>;

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Serialization(err.to_string())
    }
}

impl From<async_nats::Error> for PlannerError {
    fn from(err: async_nats::Error) -> Self {
        PlannerError::ParameterStore(err.to_string())
    }
}

/// A persisted attachment record that could not be parsed
///
/// Never returned as an `Err`: the routing phase skips the record, logs a
/// warning and reports it alongside the synthesized routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed cross-phase record '{raw}': {reason}")]
pub struct MalformedCrossPhaseRecord {
    /// The raw value as read from the parameter store
    pub raw: String,
    /// Why it was rejected
    pub reason: String,
}

impl MalformedCrossPhaseRecord {
    pub fn new(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}
