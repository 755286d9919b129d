// Copyright (c) 2025 - Cowboy AI, Inc.
//! Planned Resource Kind Taxonomy
//!
//! The closed set of entity kinds the planner can emit. Provisioners match
//! on [`crate::topology::Entity`] variants; this enum is the key half that
//! identifies an entity inside the topology registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a planned network resource
///
/// Ordering follows the usual provisioning order, which keeps
/// [`crate::topology::EntityKey`] sorting readable in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // VPC-scoped resources
    /// Virtual private cloud
    Vpc,
    /// Subnet in one availability zone
    Subnet,
    /// Route table (VPC subnet table or transit gateway table)
    RouteTable,
    /// Internet gateway for public subnets
    InternetGateway,
    /// Elastic IP owned by a NAT gateway
    Eip,
    /// NAT gateway in a public subnet
    NatGateway,

    // Hub resources
    /// Transit gateway
    TransitGateway,
    /// Organization share of the transit gateway
    ResourceShare,
    /// VPC attachment to the transit gateway
    Attachment,
    /// Attachment to transit gateway route table association
    RouteTableAssociation,

    /// Static route
    Route,
}

impl ResourceKind {
    /// All kinds, in declaration order
    pub const ALL: [ResourceKind; 11] = [
        Self::Vpc,
        Self::Subnet,
        Self::RouteTable,
        Self::InternetGateway,
        Self::Eip,
        Self::NatGateway,
        Self::TransitGateway,
        Self::ResourceShare,
        Self::Attachment,
        Self::RouteTableAssociation,
        Self::Route,
    ];

    /// Get canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::RouteTable => "route_table",
            Self::InternetGateway => "internet_gateway",
            Self::Eip => "eip",
            Self::NatGateway => "nat_gateway",
            Self::TransitGateway => "transit_gateway",
            Self::ResourceShare => "resource_share",
            Self::Attachment => "attachment",
            Self::RouteTableAssociation => "route_table_association",
            Self::Route => "route",
        }
    }

    /// Short prefix used when fabricating identifiers (dry runs, logs)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::RouteTable => "rtb",
            Self::InternetGateway => "igw",
            Self::Eip => "eipalloc",
            Self::NatGateway => "nat",
            Self::TransitGateway => "tgw",
            Self::ResourceShare => "rs",
            Self::Attachment => "tgw-attach",
            Self::RouteTableAssociation => "tgw-rtbassoc",
            Self::Route => "r",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Vpc => "VPC",
            Self::Subnet => "Subnet",
            Self::RouteTable => "Route Table",
            Self::InternetGateway => "Internet Gateway",
            Self::Eip => "Elastic IP",
            Self::NatGateway => "NAT Gateway",
            Self::TransitGateway => "Transit Gateway",
            Self::ResourceShare => "Resource Share",
            Self::Attachment => "Transit Gateway Attachment",
            Self::RouteTableAssociation => "Route Table Association",
            Self::Route => "Route",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_prefixes_are_unique() {
        let prefixes: std::collections::HashSet<&str> =
            ResourceKind::ALL.iter().map(|k| k.id_prefix()).collect();
        assert_eq!(prefixes.len(), ResourceKind::ALL.len());
    }

    #[test]
    fn test_display_matches_serde() {
        for kind in ResourceKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ResourceKind::RouteTableAssociation).unwrap();
        assert_eq!(json, "\"route_table_association\"");
    }
}
