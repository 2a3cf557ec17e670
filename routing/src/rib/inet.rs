// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Inet unicast route tables

use crate::rib::route::AgentRoute;
use lpm::prefix::Prefix;
use lpm::trie::IpPrefixMap;

#[derive(Default, Clone)]
pub struct InetUnicastTable {
    routes: IpPrefixMap<AgentRoute>,
}

impl InetUnicastTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn find_exact(&self, prefix: &Prefix) -> Option<&AgentRoute> {
        self.routes.get(prefix)
    }
    /// The most specific route covering a prefix
    #[must_use]
    pub fn find_lpm(&self, prefix: &Prefix) -> Option<&AgentRoute> {
        self.routes.lookup(prefix).map(|(_, route)| route)
    }
    pub(crate) fn get_or_create(&mut self, prefix: &Prefix) -> &mut AgentRoute {
        if self.routes.get(prefix).is_none() {
            self.routes.insert(*prefix, AgentRoute::new(*prefix));
        }
        self.routes
            .get_mut(prefix)
            .unwrap_or_else(|| unreachable!("route was just inserted"))
    }
    pub(crate) fn get_mut(&mut self, prefix: &Prefix) -> Option<&mut AgentRoute> {
        self.routes.get_mut(prefix)
    }
    pub(crate) fn remove(&mut self, prefix: &Prefix) -> Option<AgentRoute> {
        self.routes.remove(prefix)
    }
    pub fn iter(&self) -> impl Iterator<Item = &AgentRoute> {
        self.routes.iter().map(|(_, route)| route)
    }
    pub(crate) fn prefixes(&self) -> Vec<Prefix> {
        self.routes.iter().map(|(prefix, _)| prefix).collect()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
