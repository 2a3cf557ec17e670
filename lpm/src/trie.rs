// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A dual-family prefix map with exact and longest-prefix-match lookups

use crate::prefix::Prefix;
use ipnet::{Ipv4Net, Ipv6Net};
use prefix_trie::PrefixMap;
use std::net::IpAddr;

/// A map from [`Prefix`] to values, with one trie per address family.
/// Unlike a routing table, there is no implicit root entry: LPM may fail.
#[derive(Clone)]
pub struct IpPrefixMap<V> {
    v4: PrefixMap<Ipv4Net, V>,
    v6: PrefixMap<Ipv6Net, V>,
}

impl<V> Default for IpPrefixMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IpPrefixMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            v4: PrefixMap::new(),
            v6: PrefixMap::new(),
        }
    }

    /// Get the value for a prefix, with exact match. This does not do LPM.
    #[must_use]
    pub fn get(&self, prefix: &Prefix) -> Option<&V> {
        match prefix {
            Prefix::IPV4(p) => self.v4.get(p),
            Prefix::IPV6(p) => self.v6.get(p),
        }
    }

    /// Get the value for a prefix mutably, with exact match.
    pub fn get_mut(&mut self, prefix: &Prefix) -> Option<&mut V> {
        match prefix {
            Prefix::IPV4(p) => self.v4.get_mut(p),
            Prefix::IPV6(p) => self.v6.get_mut(p),
        }
    }

    pub fn insert(&mut self, prefix: Prefix, value: V) -> Option<V> {
        match prefix {
            Prefix::IPV4(p) => self.v4.insert(p, value),
            Prefix::IPV6(p) => self.v6.insert(p, value),
        }
    }

    pub fn remove(&mut self, prefix: &Prefix) -> Option<V> {
        match prefix {
            Prefix::IPV4(p) => self.v4.remove(p),
            Prefix::IPV6(p) => self.v6.remove(p),
        }
    }

    /// Longest prefix match for a prefix: the most specific entry covering it.
    #[must_use]
    pub fn lookup(&self, prefix: &Prefix) -> Option<(Prefix, &V)> {
        match prefix {
            Prefix::IPV4(p) => self.v4.get_lpm(p).map(|(p, v)| (Prefix::IPV4(*p), v)),
            Prefix::IPV6(p) => self.v6.get_lpm(p).map(|(p, v)| (Prefix::IPV6(*p), v)),
        }
    }

    /// Longest prefix match for a single address
    #[must_use]
    pub fn lookup_addr(&self, addr: IpAddr) -> Option<(Prefix, &V)> {
        self.lookup(&Prefix::host(addr))
    }

    /// Iterate over all entries, IPv4 first.
    pub fn iter(&self) -> impl Iterator<Item = (Prefix, &V)> {
        self.v4
            .iter()
            .map(|(p, v)| (Prefix::IPV4(*p), v))
            .chain(self.v6.iter().map(|(p, v)| (Prefix::IPV6(*p), v)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
