// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! EVPN route tables. Only IP-prefix (type-5) routes matter for routing VRFs:
//! those have a zero MAC and ethernet tag 0.

use crate::rib::route::AgentRoute;
use lpm::prefix::Prefix;
use mac_address::MacAddress;
use ordermap::OrderMap;

/// The key of an EVPN route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvpnRouteKey {
    pub mac: MacAddress,
    pub prefix: Prefix,
    pub ethernet_tag: u32,
}

impl EvpnRouteKey {
    /// Key of the IP-prefix route for a prefix
    #[must_use]
    pub fn type5(prefix: Prefix) -> Self {
        Self {
            mac: MacAddress::default(),
            prefix,
            ethernet_tag: 0,
        }
    }
    #[must_use]
    pub fn is_type5(&self) -> bool {
        self.mac == MacAddress::default() && self.ethernet_tag == 0
    }
}

#[derive(Default, Clone)]
pub struct EvpnTable {
    routes: OrderMap<EvpnRouteKey, AgentRoute>,
}

impl EvpnTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn find(&self, key: &EvpnRouteKey) -> Option<&AgentRoute> {
        self.routes.get(key)
    }
    pub(crate) fn get_or_create(&mut self, key: &EvpnRouteKey) -> &mut AgentRoute {
        self.routes
            .entry(*key)
            .or_insert_with(|| AgentRoute::new(key.prefix))
    }
    pub(crate) fn get_mut(&mut self, key: &EvpnRouteKey) -> Option<&mut AgentRoute> {
        self.routes.get_mut(key)
    }
    pub(crate) fn remove(&mut self, key: &EvpnRouteKey) -> Option<AgentRoute> {
        self.routes.remove(key)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&EvpnRouteKey, &AgentRoute)> {
        self.routes.iter()
    }
    pub(crate) fn keys(&self) -> Vec<EvpnRouteKey> {
        self.routes.keys().copied().collect()
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
