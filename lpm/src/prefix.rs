// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type to represent IP-version neutral network prefixes.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
pub use std::net::IpAddr;
pub use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("Invalid Prefix: {0}")]
    Invalid(String),
    #[error("Invalid address in '{0}'")]
    InvalidAddress(String),
    #[error("Mask length {0} is invalid")]
    InvalidLength(u8),
    #[error("Invalid mask length in '{0}'")]
    InvalidLengthStr(String),
}

/// Type to represent both IPv4 and IPv6 prefixes to expose an IP version-independent API.
/// A [`Prefix`] never carries host bits: the address is always the network address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Prefix {
    IPV4(Ipv4Net),
    IPV6(Ipv6Net),
}

impl Prefix {
    pub const MAX_LEN_IPV4: u8 = 32;
    pub const MAX_LEN_IPV6: u8 = 128;

    /// Build a [`Prefix`] from an address and a length, clearing host bits.
    ///
    /// # Errors
    /// Fails if the length exceeds the maximum for the address family.
    pub fn new(address: IpAddr, length: u8) -> Result<Self, PrefixError> {
        match address {
            IpAddr::V4(a) => Ipv4Net::new(a, length)
                .map(|n| Prefix::IPV4(n.trunc()))
                .map_err(|_| PrefixError::InvalidLength(length)),
            IpAddr::V6(a) => Ipv6Net::new(a, length)
                .map(|n| Prefix::IPV6(n.trunc()))
                .map_err(|_| PrefixError::InvalidLength(length)),
        }
    }

    /// Build the host prefix (/32 or /128) for an address
    #[must_use]
    pub fn host(address: IpAddr) -> Self {
        match address {
            IpAddr::V4(a) => Prefix::IPV4(Ipv4Net::from(a)),
            IpAddr::V6(a) => Prefix::IPV6(Ipv6Net::from(a)),
        }
    }

    /// Build 0.0.0.0/0. "Default" is a very overloaded term. Calling this `root_v4`.
    #[must_use]
    pub fn root_v4() -> Prefix {
        Prefix::IPV4(Ipv4Net::default())
    }

    /// Build `::/0`.
    #[must_use]
    pub fn root_v6() -> Prefix {
        Prefix::IPV6(Ipv6Net::default())
    }

    /// Maximum prefix length for the family of some address
    #[must_use]
    pub fn max_len_for(address: &IpAddr) -> u8 {
        match address {
            IpAddr::V4(_) => Prefix::MAX_LEN_IPV4,
            IpAddr::V6(_) => Prefix::MAX_LEN_IPV6,
        }
    }

    /// Check whether the prefix is IPv4
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Prefix::IPV4(_))
    }

    /// Check whether the prefix is IPv6
    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Prefix::IPV6(_))
    }

    /// Build an `IpAddr` from a prefix
    #[must_use]
    pub fn as_address(&self) -> IpAddr {
        match *self {
            Prefix::IPV4(p) => p.network().into(),
            Prefix::IPV6(p) => p.network().into(),
        }
    }

    /// Get prefix length
    #[must_use]
    pub fn length(&self) -> u8 {
        match *self {
            Prefix::IPV4(p) => p.prefix_len(),
            Prefix::IPV6(p) => p.prefix_len(),
        }
    }

    /// Tell if prefix is a host
    #[must_use]
    pub fn is_host(&self) -> bool {
        match self {
            Prefix::IPV4(_) => self.length() == Prefix::MAX_LEN_IPV4,
            Prefix::IPV6(_) => self.length() == Prefix::MAX_LEN_IPV6,
        }
    }

    /// Tell if the prefix matches an (address, length) pair exactly.
    /// Host bits in the address are ignored.
    #[must_use]
    pub fn matches(&self, address: IpAddr, length: u8) -> bool {
        Prefix::new(address, length).is_ok_and(|p| p == *self)
    }

    /// Check whether prefix covers a given address
    #[must_use]
    pub fn covers_addr(&self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (Prefix::IPV4(p), IpAddr::V4(a)) => p.contains(a),
            (Prefix::IPV6(p), IpAddr::V6(a)) => p.contains(a),
            _ => false,
        }
    }

    #[cfg(any(test, feature = "testing"))]
    #[allow(clippy::missing_panics_doc)]
    pub fn expect_from<T>(val: T) -> Self
    where
        T: TryInto<Prefix>,
        T::Error: Debug,
    {
        val.try_into().expect("Invalid prefix")
    }
}

impl TryFrom<(IpAddr, u8)> for Prefix {
    type Error = PrefixError;

    fn try_from((address, length): (IpAddr, u8)) -> Result<Self, Self::Error> {
        Prefix::new(address, length)
    }
}

impl TryFrom<(&str, u8)> for Prefix {
    type Error = PrefixError;

    fn try_from((addr_str, mask_len): (&str, u8)) -> Result<Self, Self::Error> {
        let addr =
            IpAddr::from_str(addr_str).map_err(|_| PrefixError::InvalidAddress(addr_str.to_owned()))?;
        Prefix::new(addr, mask_len)
    }
}

impl From<Ipv4Net> for Prefix {
    fn from(value: Ipv4Net) -> Self {
        Prefix::IPV4(value.trunc())
    }
}
impl From<Ipv6Net> for Prefix {
    fn from(value: Ipv6Net) -> Self {
        Prefix::IPV6(value.trunc())
    }
}
impl From<Prefix> for IpNet {
    fn from(value: Prefix) -> Self {
        match value {
            Prefix::IPV4(p) => IpNet::V4(p),
            Prefix::IPV6(p) => IpNet::V6(p),
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prefix::IPV4(p) => write!(f, "{p}"),
            Prefix::IPV6(p) => write!(f, "{p}"),
        }
    }
}
