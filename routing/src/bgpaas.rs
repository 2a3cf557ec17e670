// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! BGP-as-a-Service sessions: VMs that speak BGP to the agent through
//! one of their interfaces.

use ahash::RandomState;
use std::collections::HashSet;
use std::net::IpAddr;
#[allow(unused)]
use tracing::{debug, error};

/// Tell if an (interface, address) pair is a BGPaaS session endpoint
pub trait BgpaasRegistry: Send + Sync {
    fn is_bgpaas(&self, ifname: &str, address: &IpAddr) -> bool;
}

/// A set of configured BGPaaS sessions
pub struct BgpaasTable {
    sessions: HashSet<(String, IpAddr), RandomState>,
}

#[allow(clippy::new_without_default)]
impl BgpaasTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: HashSet::with_hasher(RandomState::with_seed(0)),
        }
    }

    pub fn add_session(&mut self, ifname: &str, address: IpAddr) {
        if self.sessions.insert((ifname.to_owned(), address)) {
            debug!("Added BGPaaS session on {ifname} with {address}");
        }
    }

    pub fn del_session(&mut self, ifname: &str, address: IpAddr) {
        if !self.sessions.remove(&(ifname.to_owned(), address)) {
            error!("Attempted to delete unknown BGPaaS session on {ifname} with {address}");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl BgpaasRegistry for BgpaasTable {
    fn is_bgpaas(&self, ifname: &str, address: &IpAddr) -> bool {
        self.sessions.contains(&(ifname.to_owned(), *address))
    }
}
