// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Mapping of logical routers to their routing VRF and bridge VRFs. This is
//! the single source of truth for the role of a VRF. It is mutated by
//! configuration only; reconciliation reads it.

use crate::nexthop::NhItemType;
use crate::rib::vrf::Vrf;
use crate::rib::vrftable::VrfTable;
use crate::vxlan::locator::find_route_in_vrf;
use ahash::RandomState;
use ordermap::OrderMap;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
#[allow(unused)]
use tracing::{debug, error, warn};
use uuid::Uuid;

pub type LogicalRouterId = Uuid;

/// What the mapper knows about a logical router
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutedVrfInfo {
    pub routing_vn: Option<String>,
    pub routing_vrf: Option<String>,
    /// bridge VN name to bridge VRF name, in attach order
    pub bridge_vns: OrderMap<String, String>,
    pub local_ecmp_sequence: u64,
}

impl RoutedVrfInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routing_vn.is_none() && self.bridge_vns.is_empty()
    }
}

/// Configuration of a virtual network, as far as VXLAN routing cares
#[derive(Debug, Clone, PartialEq)]
pub struct VnConfig {
    pub name: String,
    pub vrf: String,
    pub logical_router: Option<LogicalRouterId>,
    /// The VN is the routing VN of its logical router
    pub routing_vn: bool,
}

/// Access to the logical router map. Lookups return owned snapshots.
pub trait RoutedVrfMap: Send + Sync {
    fn lookup(&self, lr: &LogicalRouterId) -> Option<RoutedVrfInfo>;
    fn insert(&self, lr: LogicalRouterId, info: RoutedVrfInfo);
    fn remove(&self, lr: &LogicalRouterId) -> Option<RoutedVrfInfo>;
    fn logical_router_of_vn(&self, vn: &str) -> Option<LogicalRouterId>;
    fn logical_routers(&self) -> Vec<LogicalRouterId>;
    /// Bump and return the local ECMP sequence of a logical router
    fn next_local_ecmp_sequence(&self, lr: &LogicalRouterId) -> u64;

    //////////////////////////////////////////////////////////////////
    /// Tell if a VRF is the routing VRF of some logical router
    //////////////////////////////////////////////////////////////////
    fn is_routing_vrf(&self, vrf: &Vrf) -> bool {
        let Some(vn) = vrf.vn() else {
            return false;
        };
        self.logical_router_of_vn(vn)
            .and_then(|lr| self.lookup(&lr))
            .is_some_and(|info| {
                info.routing_vn.as_deref() == Some(vn)
                    && info.routing_vrf.as_deref() == Some(vrf.name.as_str())
            })
    }

    //////////////////////////////////////////////////////////////////
    /// Tell if a VRF is a bridge VRF: it has a VN and is not a
    /// routing VRF
    //////////////////////////////////////////////////////////////////
    fn is_bridge_vrf(&self, vrf: &Vrf) -> bool {
        vrf.vn().is_some() && !self.is_routing_vrf(vrf)
    }

    /// The logical router a routing VRF serves
    fn logical_router_of_vrf(&self, routing_vrf: &str) -> Option<LogicalRouterId> {
        self.logical_routers().into_iter().find(|lr| {
            self.lookup(lr)
                .is_some_and(|info| info.routing_vrf.as_deref() == Some(routing_vrf))
        })
    }

    /// The routing VRF that a bridge VRF feeds, if the bridge is attached
    fn routing_vrf_of_bridge(&self, vrf: &Vrf) -> Option<String> {
        let vn = vrf.vn()?;
        let info = self.lookup(&self.logical_router_of_vn(vn)?)?;
        if info.bridge_vns.get(vn) != Some(&vrf.name) {
            return None;
        }
        info.routing_vrf
    }

    /// (VN, VRF) pairs of the bridges attached to the owner of a routing VRF
    fn bridge_vrfs_of(&self, routing_vrf: &str) -> Vec<(String, String)> {
        self.logical_router_of_vrf(routing_vrf)
            .and_then(|lr| self.lookup(&lr))
            .map(|info| info.bridge_vns.into_iter().collect())
            .unwrap_or_default()
    }

    //////////////////////////////////////////////////////////////////
    /// Find the bridge VN whose Inet table holds (ip, plen). Bridges
    /// are scanned in attach order and the first match wins.
    /// Returns the VN name and its VRF name.
    //////////////////////////////////////////////////////////////////
    fn origin_bridge(
        &self,
        vrftable: &VrfTable,
        routing_vrf: &str,
        ip: IpAddr,
        plen: u8,
    ) -> Option<(String, String)> {
        self.bridge_vrfs_of(routing_vrf)
            .into_iter()
            .find(|(_, vrf)| {
                vrftable
                    .get_vrf(vrf)
                    .is_ok_and(|vrf| find_route_in_vrf(vrf, ip, plen, NhItemType::Inet).is_some())
            })
    }

    fn get_origin_vn(
        &self,
        vrftable: &VrfTable,
        routing_vrf: &str,
        ip: IpAddr,
        plen: u8,
    ) -> Option<String> {
        self.origin_bridge(vrftable, routing_vrf, ip, plen)
            .map(|(vn, _)| vn)
    }
}

#[derive(Default)]
struct MapperState {
    lr_vrf_info: HashMap<LogicalRouterId, RoutedVrfInfo, RandomState>,
    vn_lr: HashMap<String, LogicalRouterId, RandomState>,
}

impl MapperState {
    fn detach_vn(&mut self, vn: &str) -> Option<LogicalRouterId> {
        let lr = self.vn_lr.remove(vn)?;
        if let Some(info) = self.lr_vrf_info.get_mut(&lr) {
            if info.routing_vn.as_deref() == Some(vn) {
                debug!("VN {vn} is no longer the routing VN of {lr}");
                info.routing_vn = None;
                info.routing_vrf = None;
            }
            if info.bridge_vns.remove(vn).is_some() {
                debug!("VN {vn} is no longer a bridge of {lr}");
            }
            if info.is_empty() {
                debug!("Logical router {lr} has no VNs left");
                self.lr_vrf_info.remove(&lr);
            }
        }
        Some(lr)
    }
}

/// The logical router map. Every access takes one lock for its duration.
#[derive(Default)]
pub struct VxlanRoutingVrfMapper {
    state: Mutex<MapperState>,
}

impl VxlanRoutingVrfMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MapperState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    //////////////////////////////////////////////////////////////////
    /// Apply the configuration of a VN. Returns the logical routers
    /// affected: the one the VN left, if any, and the one it is in.
    //////////////////////////////////////////////////////////////////
    pub fn vn_update(&self, config: &VnConfig) -> Vec<LogicalRouterId> {
        let mut state = self.state();
        let mut affected = vec![];

        let role_unchanged = config.logical_router.is_some_and(|lr| {
            state.vn_lr.get(&config.name) == Some(&lr)
                && state.lr_vrf_info.get(&lr).is_some_and(|info| {
                    if config.routing_vn {
                        info.routing_vn.as_deref() == Some(config.name.as_str())
                            && info.routing_vrf.as_deref() == Some(config.vrf.as_str())
                    } else {
                        info.bridge_vns.get(&config.name) == Some(&config.vrf)
                    }
                })
        });
        if role_unchanged {
            return config.logical_router.into_iter().collect();
        }

        if let Some(old) = state.detach_vn(&config.name) {
            affected.push(old);
        }
        let Some(lr) = config.logical_router else {
            return affected;
        };

        let info = state.lr_vrf_info.entry(lr).or_default();
        let mut displaced = None;
        if config.routing_vn {
            if let Some(previous) = info.routing_vn.replace(config.name.clone()) {
                warn!("Logical router {lr}: routing VN {previous} replaced by {}", config.name);
                displaced = Some(previous);
            }
            info.routing_vrf = Some(config.vrf.clone());
        } else {
            info.bridge_vns.insert(config.name.clone(), config.vrf.clone());
        }
        if let Some(previous) = displaced {
            state.vn_lr.remove(&previous);
        }
        state.vn_lr.insert(config.name.clone(), lr);
        debug!(
            "VN {} attached to logical router {lr} as {} VN",
            config.name,
            if config.routing_vn { "routing" } else { "bridge" }
        );
        if !affected.contains(&lr) {
            affected.push(lr);
        }
        affected
    }

    //////////////////////////////////////////////////////////////////
    /// Forget a VN. Returns the logical router it belonged to.
    //////////////////////////////////////////////////////////////////
    pub fn vn_delete(&self, vn: &str) -> Option<LogicalRouterId> {
        let lr = self.state().detach_vn(vn);
        if lr.is_none() {
            debug!("VN {vn} was not attached to any logical router");
        }
        lr
    }
}

impl RoutedVrfMap for VxlanRoutingVrfMapper {
    fn lookup(&self, lr: &LogicalRouterId) -> Option<RoutedVrfInfo> {
        self.state().lr_vrf_info.get(lr).cloned()
    }

    fn insert(&self, lr: LogicalRouterId, info: RoutedVrfInfo) {
        let mut state = self.state();
        if let Some(vn) = &info.routing_vn {
            state.vn_lr.insert(vn.clone(), lr);
        }
        for vn in info.bridge_vns.keys() {
            state.vn_lr.insert(vn.clone(), lr);
        }
        state.lr_vrf_info.insert(lr, info);
    }

    fn remove(&self, lr: &LogicalRouterId) -> Option<RoutedVrfInfo> {
        let mut state = self.state();
        state.vn_lr.retain(|_, l| l != lr);
        state.lr_vrf_info.remove(lr)
    }

    fn logical_router_of_vn(&self, vn: &str) -> Option<LogicalRouterId> {
        self.state().vn_lr.get(vn).copied()
    }

    fn logical_routers(&self) -> Vec<LogicalRouterId> {
        let mut lrs: Vec<LogicalRouterId> = self.state().lr_vrf_info.keys().copied().collect();
        lrs.sort_unstable();
        lrs
    }

    fn next_local_ecmp_sequence(&self, lr: &LogicalRouterId) -> u64 {
        let mut state = self.state();
        match state.lr_vrf_info.get_mut(lr) {
            Some(info) => {
                info.local_ecmp_sequence += 1;
                info.local_ecmp_sequence
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nexthop::NextHop;
    use crate::peer::{Peer, PeerType};
    use crate::rib::path::{AgentPath, PathAttributes};
    use lpm::prefix::Prefix;
    use std::str::FromStr;

    fn vn(name: &str, lr: Option<LogicalRouterId>, routing_vn: bool) -> VnConfig {
        VnConfig {
            name: name.to_owned(),
            vrf: format!("{name}-vrf"),
            logical_router: lr,
            routing_vn,
        }
    }

    #[test]
    fn test_vn_update_roles() {
        let mapper = VxlanRoutingVrfMapper::new();
        let lr = Uuid::from_u128(1);
        let mut vrftable = VrfTable::new();
        for name in ["lr1", "blue", "green"] {
            vrftable.add_vrf(&format!("{name}-vrf"), None).unwrap();
            vrftable.set_vn(&format!("{name}-vrf"), Some(name)).unwrap();
        }

        assert_eq!(mapper.vn_update(&vn("blue", Some(lr), false)), vec![lr]);
        assert_eq!(mapper.vn_update(&vn("green", Some(lr), false)), vec![lr]);
        assert_eq!(mapper.vn_update(&vn("lr1", Some(lr), true)), vec![lr]);

        let routing = vrftable.get_vrf("lr1-vrf").unwrap();
        let blue = vrftable.get_vrf("blue-vrf").unwrap();
        assert!(mapper.is_routing_vrf(routing));
        assert!(!mapper.is_bridge_vrf(routing));
        assert!(mapper.is_bridge_vrf(blue));
        assert_eq!(mapper.routing_vrf_of_bridge(blue).as_deref(), Some("lr1-vrf"));
        assert_eq!(mapper.logical_router_of_vrf("lr1-vrf"), Some(lr));
        assert_eq!(
            mapper.bridge_vrfs_of("lr1-vrf"),
            vec![
                ("blue".to_owned(), "blue-vrf".to_owned()),
                ("green".to_owned(), "green-vrf".to_owned())
            ]
        );

        /* move blue to another logical router */
        let lr2 = Uuid::from_u128(2);
        assert_eq!(mapper.vn_update(&vn("blue", Some(lr2), false)), vec![lr, lr2]);
        assert_eq!(mapper.bridge_vrfs_of("lr1-vrf").len(), 1);
        assert_eq!(mapper.routing_vrf_of_bridge(blue), None);

        /* delete the routing vn: the logical router stays for green */
        assert_eq!(mapper.vn_delete("lr1"), Some(lr));
        assert!(!mapper.is_routing_vrf(routing));
        assert!(mapper.is_bridge_vrf(routing));
        assert_eq!(mapper.lookup(&lr).unwrap().routing_vrf, None);

        /* last vn gone: the logical router is gone */
        assert_eq!(mapper.vn_delete("green"), Some(lr));
        assert!(mapper.lookup(&lr).is_none());
        assert_eq!(mapper.vn_delete("green"), None);
        assert_eq!(mapper.logical_routers(), vec![lr2]);
    }

    #[test]
    fn test_roles_follow_the_vrf_of_record() {
        let mapper = VxlanRoutingVrfMapper::new();
        let lr = Uuid::from_u128(1);
        let mut vrftable = VrfTable::new();
        for vrf in ["lr1-vrf", "lr1-old", "blue-vrf", "blue-old"] {
            vrftable.add_vrf(vrf, None).unwrap();
        }
        /* stale VRFs still naming a VN that has moved elsewhere */
        vrftable.set_vn("lr1-vrf", Some("lr1")).unwrap();
        vrftable.set_vn("lr1-old", Some("lr1")).unwrap();
        vrftable.set_vn("blue-vrf", Some("blue")).unwrap();
        vrftable.set_vn("blue-old", Some("blue")).unwrap();
        mapper.vn_update(&vn("lr1", Some(lr), true));
        mapper.vn_update(&vn("blue", Some(lr), false));

        assert!(mapper.is_routing_vrf(vrftable.get_vrf("lr1-vrf").unwrap()));
        assert!(!mapper.is_routing_vrf(vrftable.get_vrf("lr1-old").unwrap()));
        assert_eq!(
            mapper
                .routing_vrf_of_bridge(vrftable.get_vrf("blue-vrf").unwrap())
                .as_deref(),
            Some("lr1-vrf")
        );
        assert_eq!(
            mapper.routing_vrf_of_bridge(vrftable.get_vrf("blue-old").unwrap()),
            None
        );
    }

    #[test]
    fn test_capability_interface() {
        let mapper = VxlanRoutingVrfMapper::new();
        let lr = Uuid::from_u128(7);
        let mut info = RoutedVrfInfo {
            routing_vn: Some("lr7".to_owned()),
            routing_vrf: Some("lr7-vrf".to_owned()),
            ..Default::default()
        };
        info.bridge_vns.insert("red".to_owned(), "red-vrf".to_owned());
        mapper.insert(lr, info.clone());
        assert_eq!(mapper.lookup(&lr), Some(info));
        assert_eq!(mapper.logical_router_of_vn("red"), Some(lr));

        assert_eq!(mapper.next_local_ecmp_sequence(&lr), 1);
        assert_eq!(mapper.next_local_ecmp_sequence(&lr), 2);
        assert_eq!(mapper.next_local_ecmp_sequence(&Uuid::from_u128(8)), 0);

        assert!(mapper.remove(&lr).is_some());
        assert_eq!(mapper.logical_router_of_vn("red"), None);
        assert!(mapper.remove(&lr).is_none());
    }

    #[test]
    fn test_origin_vn_first_match() {
        let mapper = VxlanRoutingVrfMapper::new();
        let lr = Uuid::from_u128(1);
        let mut vrftable = VrfTable::new();
        let prefix = Prefix::expect_from(("10.0.0.5", 32));
        for name in ["lr1", "blue", "green"] {
            let vrf = format!("{name}-vrf");
            vrftable.add_vrf(&vrf, None).unwrap();
            vrftable.set_vn(&vrf, Some(name)).unwrap();
        }
        for vrf in ["green-vrf", "blue-vrf"] {
            let path = AgentPath::new(
                Peer::new("local", PeerType::LocalVmPort),
                NextHop::Discard,
                PathAttributes::default(),
            );
            vrftable
                .get_vrf_mut(vrf)
                .unwrap()
                .inet
                .get_or_create(&prefix)
                .add_path(path);
        }
        mapper.vn_update(&vn("lr1", Some(lr), true));
        mapper.vn_update(&vn("green", Some(lr), false));
        mapper.vn_update(&vn("blue", Some(lr), false));

        let ip = IpAddr::from_str("10.0.0.5").unwrap();
        /* both match: attach order decides */
        assert_eq!(
            mapper.get_origin_vn(&vrftable, "lr1-vrf", ip, 32).as_deref(),
            Some("green")
        );
        /* covering but not exact */
        assert_eq!(mapper.get_origin_vn(&vrftable, "lr1-vrf", ip, 24), None);
        /* not a routing vrf */
        assert_eq!(mapper.get_origin_vn(&vrftable, "blue-vrf", ip, 32), None);
    }
}
