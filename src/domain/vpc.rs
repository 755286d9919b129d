// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC Declarations and Subnet Specifications
//!
//! A [`VpcSpec`] is the declaration handed to the planner by the
//! configuration layer. [`SubnetSpec`]s are produced from it by the
//! [`crate::allocator::CidrAllocator`] and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::network::{parse_cidr_list, Cidr, NetworkError};

/// Availability zones every VPC spans
pub const AZ_COUNT: usize = 3;

/// Role of a VPC in the hub-and-spoke design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VpcRole {
    /// Central inspection/egress VPC with public subnets and NAT
    Inspection,
    /// Any other VPC; egresses through the transit gateway
    #[default]
    Spoke,
}

impl VpcRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspection => "inspection",
            Self::Spoke => "spoke",
        }
    }
}

impl fmt::Display for VpcRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of a subnet inside its VPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetRole {
    Public,
    Private,
    Transit,
}

impl SubnetRole {
    /// Allocation order: public first, then private, then transit
    pub const ORDERED: [SubnetRole; 3] = [Self::Public, Self::Private, Self::Transit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Transit => "transit",
        }
    }

    /// Private and transit subnets have no direct internet route
    pub fn is_isolated(&self) -> bool {
        !matches!(self, Self::Public)
    }
}

impl fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Availability zone index (0 → `a`, 1 → `b`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityZone(u8);

impl AvailabilityZone {
    pub fn new(index: u8) -> Self {
        Self(index)
    }

    /// The zones a VPC spans, in `a, b, c` order
    pub fn all() -> impl Iterator<Item = AvailabilityZone> {
        (0..AZ_COUNT as u8).map(Self)
    }

    pub fn index(&self) -> usize {
        usize::from(self.0)
    }

    pub fn suffix(&self) -> char {
        char::from(b'a' + self.0)
    }
}

impl fmt::Display for AvailabilityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// How the CIDR blocks of one subnet role are obtained
///
/// The string form follows the deployment configuration shorthand: a bare
/// number is a prefix length carved contiguously (`"27"`), anything else is
/// a comma-separated list of CIDRs assigned to the zones in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubnetAllocation {
    /// Carve one `/n` block per zone from the VPC CIDR
    Mask(u8),
    /// Use these blocks, one per zone
    Explicit(Vec<Cidr>),
}

impl FromStr for SubnetAllocation {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            let mask = s
                .parse::<u8>()
                .map_err(|_| NetworkError::InvalidCidr(s.to_string()))?;
            return Ok(Self::Mask(mask));
        }
        Ok(Self::Explicit(parse_cidr_list(s)?))
    }
}

impl TryFrom<String> for SubnetAllocation {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubnetAllocation> for String {
    fn from(allocation: SubnetAllocation) -> Self {
        allocation.to_string()
    }
}

impl fmt::Display for SubnetAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mask(mask) => write!(f, "{}", mask),
            Self::Explicit(cidrs) => {
                let joined: Vec<String> = cidrs.iter().map(Cidr::to_string).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

/// Per-role subnet allocations of a VPC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetAllocations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<SubnetAllocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<SubnetAllocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit: Option<SubnetAllocation>,
}

impl SubnetAllocations {
    pub fn get(&self, role: SubnetRole) -> Option<&SubnetAllocation> {
        match role {
            SubnetRole::Public => self.public.as_ref(),
            SubnetRole::Private => self.private.as_ref(),
            SubnetRole::Transit => self.transit.as_ref(),
        }
    }

    pub fn set(&mut self, role: SubnetRole, allocation: SubnetAllocation) {
        let slot = match role {
            SubnetRole::Public => &mut self.public,
            SubnetRole::Private => &mut self.private,
            SubnetRole::Transit => &mut self.transit,
        };
        *slot = Some(allocation);
    }

    /// Declared allocations in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (SubnetRole, &SubnetAllocation)> {
        SubnetRole::ORDERED
            .into_iter()
            .filter_map(move |role| self.get(role).map(|alloc| (role, alloc)))
    }
}

/// A VPC declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcSpec {
    /// Unique name, also used in parameter store keys
    pub name: String,
    /// Overall CIDR block of the VPC
    pub cidr: Cidr,
    #[serde(default)]
    pub role: VpcRole,
    /// Every mask-allocated role is carved contiguously, not only the first
    #[serde(default)]
    pub contiguous: bool,
    #[serde(default)]
    pub subnets: SubnetAllocations,
    /// Organization principal to share the transit gateway with; the VPC
    /// carrying this owns the hub
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_with: Option<String>,
    #[serde(default = "default_flow_logs")]
    pub flow_logs: bool,
}

fn default_flow_logs() -> bool {
    true
}

impl VpcSpec {
    pub fn new(name: impl Into<String>, cidr: Cidr, role: VpcRole) -> Self {
        Self {
            name: name.into(),
            cidr,
            role,
            contiguous: false,
            subnets: SubnetAllocations::default(),
            share_with: None,
            flow_logs: default_flow_logs(),
        }
    }

    pub fn spoke(name: impl Into<String>, cidr: Cidr) -> Self {
        Self::new(name, cidr, VpcRole::Spoke)
    }

    pub fn inspection(name: impl Into<String>, cidr: Cidr) -> Self {
        Self::new(name, cidr, VpcRole::Inspection)
    }

    pub fn with_subnets(mut self, role: SubnetRole, allocation: SubnetAllocation) -> Self {
        self.subnets.set(role, allocation);
        self
    }

    pub fn with_contiguous(mut self, contiguous: bool) -> Self {
        self.contiguous = contiguous;
        self
    }

    pub fn shared_with(mut self, principal: impl Into<String>) -> Self {
        self.share_with = Some(principal.into());
        self
    }

    pub fn is_inspection(&self) -> bool {
        self.role == VpcRole::Inspection
    }

    /// Whether this VPC creates and shares the transit gateway
    pub fn is_hub_owner(&self) -> bool {
        self.share_with.is_some()
    }
}

/// A concrete subnet in one availability zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubnetSpec {
    pub vpc: String,
    pub role: SubnetRole,
    pub az: AvailabilityZone,
    pub cidr: Cidr,
}

impl SubnetSpec {
    /// Name local to the VPC, e.g. `transit-subnet-b`
    pub fn local_name(&self) -> String {
        format!("{}-subnet-{}", self.role, self.az)
    }

    /// Name of the route table serving this subnet
    pub fn route_table_name(&self) -> String {
        format!("{}/{}-rt", self.vpc, self.local_name())
    }

    /// Registry name, unique across VPCs
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.vpc, self.local_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(s: &str) -> Cidr {
        Cidr::new(s).unwrap()
    }

    #[test]
    fn test_allocation_shorthand() {
        assert_eq!("27".parse::<SubnetAllocation>().unwrap(), SubnetAllocation::Mask(27));
        let explicit: SubnetAllocation = "172.16.145.0/28,172.16.145.16/28,172.16.145.32/28"
            .parse()
            .unwrap();
        match explicit {
            SubnetAllocation::Explicit(list) => {
                assert_eq!(list.len(), 3);
                assert_eq!(list[2], cidr("172.16.145.32/28"));
            }
            other => panic!("expected explicit allocation, got {:?}", other),
        }
        assert!("2x".parse::<SubnetAllocation>().is_err());
        assert!("999".parse::<SubnetAllocation>().is_err());
    }

    #[test]
    fn test_allocation_display_roundtrip() {
        let alloc: SubnetAllocation = "10.0.0.0/28, 10.0.0.16/28".parse().unwrap();
        assert_eq!(alloc.to_string(), "10.0.0.0/28,10.0.0.16/28");
    }

    #[test]
    fn test_availability_zones() {
        let zones: Vec<char> = AvailabilityZone::all().map(|az| az.suffix()).collect();
        assert_eq!(zones, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_allocations_iterate_in_role_order() {
        let vpc = VpcSpec::spoke("spoke", cidr("10.0.0.0/24"))
            .with_subnets(SubnetRole::Transit, SubnetAllocation::Mask(28))
            .with_subnets(SubnetRole::Private, SubnetAllocation::Mask(26));
        let roles: Vec<SubnetRole> = vpc.subnets.iter().map(|(role, _)| role).collect();
        assert_eq!(roles, vec![SubnetRole::Private, SubnetRole::Transit]);
    }

    #[test]
    fn test_subnet_names() {
        let subnet = SubnetSpec {
            vpc: "datalake-dev".to_string(),
            role: SubnetRole::Transit,
            az: AvailabilityZone::new(1),
            cidr: cidr("172.16.146.208/28"),
        };
        assert_eq!(subnet.local_name(), "transit-subnet-b");
        assert_eq!(subnet.qualified_name(), "datalake-dev/transit-subnet-b");
        assert_eq!(subnet.route_table_name(), "datalake-dev/transit-subnet-b-rt");
    }

    #[test]
    fn test_vpc_spec_deserializes_shorthand() {
        let json = r#"{
            "name": "shared-infra-services",
            "cidr": "172.16.144.0/23",
            "role": "inspection",
            "subnets": {
                "public": "27",
                "private": "172.16.144.128/27,172.16.144.160/27,172.16.144.192/27",
                "transit": "172.16.145.0/28,172.16.145.16/28,172.16.145.32/28"
            }
        }"#;
        let vpc: VpcSpec = serde_json::from_str(json).unwrap();
        assert!(vpc.is_inspection());
        assert!(!vpc.contiguous);
        assert!(vpc.flow_logs);
        assert_eq!(vpc.subnets.public, Some(SubnetAllocation::Mask(27)));
        assert!(matches!(vpc.subnets.transit, Some(SubnetAllocation::Explicit(_))));
    }
}
