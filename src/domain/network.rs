// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("CIDR {0} has host bits set (expected {1})")]
    HostBitsSet(String, String),

    #[error("Invalid prefix length: /{0} (must be between /{1} and /{2})")]
    InvalidPrefixLength(u8, u8, u8),

    #[error("CIDR {parent} has no room left for a /{prefix_len} block")]
    Exhausted { parent: String, prefix_len: u8 },
}

/// IPv4 CIDR block value object
///
/// Invariants:
/// - Valid IPv4 network in `a.b.c.d/n` notation
/// - Canonical: no host bits set below the prefix
///
/// # Examples
///
/// ```rust
/// use cim_transit_planner::domain::Cidr;
///
/// let cidr = Cidr::new("172.16.146.0/24").unwrap();
/// assert_eq!(cidr.prefix_len(), 24);
/// assert_eq!(cidr.block_size(), 256);
/// assert!(Cidr::new("172.16.146.1/24").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr(Ipv4Net);

impl Cidr {
    /// Parse and validate a CIDR block
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let raw = cidr.as_ref().trim();
        let net = Ipv4Net::from_str(raw).map_err(|_| NetworkError::InvalidCidr(raw.to_string()))?;

        // Invariant: canonical network address
        if net.trunc() != net {
            return Err(NetworkError::HostBitsSet(
                raw.to_string(),
                net.trunc().to_string(),
            ));
        }

        Ok(Self(net))
    }

    /// Build a block from a network address and prefix length
    pub fn from_parts(network: Ipv4Addr, prefix_len: u8) -> Result<Self, NetworkError> {
        let net = Ipv4Net::new(network, prefix_len)
            .map_err(|_| NetworkError::InvalidPrefixLength(prefix_len, 0, 32))?;
        Self::new(net.to_string())
    }

    /// The `0.0.0.0/0` default route destination
    pub fn default_route() -> Self {
        Self(Ipv4Net::default())
    }

    pub fn network(&self) -> Ipv4Addr {
        self.0.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Number of addresses in the block (`2^(32 - prefix)`)
    pub fn block_size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len()))
    }

    /// First address as an integer
    pub fn start(&self) -> u64 {
        u64::from(u32::from(self.network()))
    }

    /// One past the last address as an integer
    pub fn end(&self) -> u64 {
        self.start() + self.block_size()
    }

    pub fn contains(&self, other: &Cidr) -> bool {
        self.0.contains(&other.0)
    }

    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }

    pub fn is_default_route(&self) -> bool {
        self.prefix_len() == 0
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Cidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cidr> for String {
    fn from(cidr: Cidr) -> Self {
        cidr.to_string()
    }
}

/// Parse a comma-separated list of CIDR blocks, ignoring blank entries
pub fn parse_cidr_list(list: &str) -> Result<Vec<Cidr>, NetworkError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(Cidr::new)
        .collect()
}
