// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Routing database keeps most of the routing information in memory, and
//! applies queued route requests to it.

use crate::bgpaas::{BgpaasRegistry, BgpaasTable};
use crate::interfaces::iftable::IfTable;
use crate::nexthop::{ComponentNh, CompositeNh, InterfaceNh, NextHop, NextHopKey};
use crate::peer::Peer;
use crate::rib::path::AgentPath;
use crate::rib::request::{RouteKey, RouteNotification, RouteRequest};
use crate::rib::route::AgentRoute;
use crate::rib::vrftable::VrfTable;
#[allow(unused)]
use tracing::{debug, error};

/// Routing database
pub struct RoutingDb {
    pub vrftable: VrfTable,
    pub iftable: IfTable,
    pub bgpaas: Box<dyn BgpaasRegistry>,
}

#[allow(clippy::new_without_default)]
impl RoutingDb {
    #[must_use]
    pub fn new() -> Self {
        Self::with_bgpaas(Box::new(BgpaasTable::new()))
    }

    #[must_use]
    pub fn with_bgpaas(bgpaas: Box<dyn BgpaasRegistry>) -> Self {
        Self {
            vrftable: VrfTable::new(),
            iftable: IfTable::new(),
            bgpaas,
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Resolve a next-hop key against the interface table.
    /// Interface next-hops do not resolve if the interface is unknown.
    /// Composites always resolve, possibly with holes.
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn resolve_nexthop(&self, key: &NextHopKey) -> Option<NextHop> {
        Self::resolve(&self.iftable, key)
    }

    fn resolve(iftable: &IfTable, key: &NextHopKey) -> Option<NextHop> {
        match key {
            NextHopKey::Interface { ifname, policy } => {
                let iface = iftable.get_interface(ifname)?;
                Some(NextHop::Interface(InterfaceNh {
                    ifname: ifname.clone(),
                    label: iface.label,
                    policy: *policy,
                }))
            }
            NextHopKey::Composite { ctype, components } => Some(NextHop::Composite(CompositeNh {
                ctype: *ctype,
                keys: components.clone(),
                components: components
                    .iter()
                    .map(|c| {
                        Self::resolve(iftable, &c.key).map(|nh| ComponentNh { label: c.label, nh })
                    })
                    .collect(),
            })),
            NextHopKey::Tunnel(tunnel) => Some(NextHop::Tunnel(tunnel.clone())),
            NextHopKey::Vrf(vrf) => Some(NextHop::Vrf(vrf.clone())),
            NextHopKey::Receive => Some(NextHop::Receive),
            NextHopKey::Discard => Some(NextHop::Discard),
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Look up a route by key, with exact match
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn find_route(&self, vrf: &str, key: &RouteKey) -> Option<&AgentRoute> {
        let vrf = self.vrftable.get_vrf(vrf).ok()?;
        match key {
            RouteKey::Inet(prefix) => vrf.inet().find_exact(prefix),
            RouteKey::Evpn(key) => vrf.evpn().find(key),
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Look up the path of a peer for a route
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn find_path(&self, vrf: &str, key: &RouteKey, peer: &Peer) -> Option<&AgentPath> {
        self.find_route(vrf, key)?.find_path(peer)
    }

    //////////////////////////////////////////////////////////////////
    /// Apply a route request. Returns a notification if a route changed.
    //////////////////////////////////////////////////////////////////
    pub fn apply(&mut self, request: RouteRequest) -> Option<RouteNotification> {
        let (vrf, key, path) = match request {
            RouteRequest::DeletePath { vrf, key, peer } => {
                return self.delete_path(&vrf, &key, &peer);
            }
            RouteRequest::AddLocalRoute {
                vrf,
                key,
                peer,
                nh,
                attrs,
            } => {
                let Some(nexthop) = self.resolve_nexthop(&nh) else {
                    debug!("Ignoring local route {key} in {vrf}: next-hop does not resolve");
                    return None;
                };
                (vrf, key, AgentPath::new(peer, nexthop, attrs))
            }
            RouteRequest::AddRemoteEcmpRoute {
                vrf,
                key,
                peer,
                data,
            } => {
                let nexthop = self.resolve_nexthop(&data.composite)?;
                if !data.new_members.is_empty() {
                    debug!(
                        "Composite for {key} in {vrf} gains {} member(s)",
                        data.new_members.len()
                    );
                }
                (vrf, key, AgentPath::new(peer, nexthop, data.attrs))
            }
            RouteRequest::AddTunnelRoute {
                vrf,
                key,
                peer,
                tunnel,
                attrs,
            } => (vrf, key, AgentPath::new(peer, NextHop::Tunnel(tunnel), attrs)),
        };
        self.add_path(vrf, key, path)
    }

    fn add_path(&mut self, vrf: String, key: RouteKey, path: AgentPath) -> Option<RouteNotification> {
        let Ok(table) = self.vrftable.get_vrf_mut(&vrf) else {
            debug!("Ignoring route {key}: vrf {vrf} is gone");
            return None;
        };
        let route = match &key {
            RouteKey::Inet(prefix) => table.inet.get_or_create(prefix),
            RouteKey::Evpn(evpn_key) => table.evpn.get_or_create(evpn_key),
        };
        let peer = path.peer().clone();
        if route.add_path(path) {
            debug!("Route {key} in {vrf} updated by {peer}");
            Some(RouteNotification { vrf, key })
        } else {
            None
        }
    }

    fn delete_path(&mut self, vrf: &str, key: &RouteKey, peer: &Peer) -> Option<RouteNotification> {
        let Ok(table) = self.vrftable.get_vrf_mut(vrf) else {
            debug!("Ignoring path deletion for {key}: vrf {vrf} is gone");
            return None;
        };
        let route = match key {
            RouteKey::Inet(prefix) => table.inet.get_mut(prefix),
            RouteKey::Evpn(evpn_key) => table.evpn.get_mut(evpn_key),
        };
        let Some(route) = route else {
            error!("Can't delete path of {peer} for {key} in {vrf}: no such route");
            return None;
        };
        if route.remove_path(peer).is_none() {
            error!("Can't delete path of {peer} for {key} in {vrf}: no such path");
            return None;
        }
        if route.is_empty() {
            match key {
                RouteKey::Inet(prefix) => table.inet.remove(prefix),
                RouteKey::Evpn(evpn_key) => table.evpn.remove(evpn_key),
            };
        }
        debug!("Deleted path of {peer} for {key} in {vrf}");
        Some(RouteNotification {
            vrf: vrf.to_owned(),
            key: key.clone(),
        })
    }

    //////////////////////////////////////////////////////////////////
    /// Resolve again the next-hops of all paths using an interface,
    /// after the interface changed. Returns the routes that changed.
    //////////////////////////////////////////////////////////////////
    pub fn refresh_interface(&mut self, ifname: &str) -> Vec<RouteNotification> {
        let mut notifications = vec![];
        let iftable = &self.iftable;
        for vrf in self.vrftable.values_mut() {
            for prefix in vrf.inet.prefixes() {
                if let Some(route) = vrf.inet.get_mut(&prefix)
                    && Self::refresh_route(iftable, route, ifname)
                {
                    notifications.push(RouteNotification {
                        vrf: vrf.name.clone(),
                        key: RouteKey::Inet(prefix),
                    });
                }
            }
            for key in vrf.evpn.keys() {
                if let Some(route) = vrf.evpn.get_mut(&key)
                    && Self::refresh_route(iftable, route, ifname)
                {
                    notifications.push(RouteNotification {
                        vrf: vrf.name.clone(),
                        key: RouteKey::Evpn(key),
                    });
                }
            }
        }
        notifications
    }

    fn refresh_route(iftable: &IfTable, route: &mut AgentRoute, ifname: &str) -> bool {
        let mut changed = false;
        for path in route.paths_mut() {
            if !path.nexthop().references_interface(ifname) {
                continue;
            }
            let Some(nexthop) = Self::resolve(iftable, &path.nexthop().key()) else {
                /* the owner of the path is expected to withdraw it */
                continue;
            };
            if nexthop != *path.nexthop() {
                path.set_nexthop(nexthop);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::encapsulation::TunnelTypes;
    use crate::interfaces::interface::Interface;
    use crate::interfaces::tests::{build_test_iftable, vm_mac};
    use crate::nexthop::{ComponentNhKey, CompositeType, TunnelNh};
    use crate::peer::PeerType;
    use crate::rib::evpn::EvpnRouteKey;
    use crate::rib::path::PathAttributes;
    use crate::rib::request::EcmpRouteData;
    use lpm::prefix::Prefix;
    use mac_address::MacAddress;
    use std::net::IpAddr;
    use std::str::FromStr;
    use tracing_test::traced_test;

    pub fn build_test_db() -> RoutingDb {
        let mut db = RoutingDb::new();
        db.iftable = build_test_iftable();
        db.vrftable.add_vrf("red", None).expect("Should succeed");
        db
    }

    fn local_request(ifname: &str, peer: &Peer) -> RouteRequest {
        RouteRequest::AddLocalRoute {
            vrf: "red".to_owned(),
            key: RouteKey::Inet(Prefix::expect_from(("10.1.1.3", 32))),
            peer: peer.clone(),
            nh: NextHopKey::interface(ifname, false),
            attrs: PathAttributes::default(),
        }
    }

    #[traced_test]
    #[test]
    fn test_apply_local_route() {
        let mut db = build_test_db();
        let peer = Peer::new("local", PeerType::LocalVmPort);
        let key = RouteKey::Inet(Prefix::expect_from(("10.1.1.3", 32)));

        let notification = db.apply(local_request("tap1", &peer)).expect("Should change");
        assert_eq!(notification.vrf, "red");
        assert_eq!(notification.key, key);
        let path = db.find_path("red", &key, &peer).expect("Should be installed");
        assert_eq!(path.nexthop().as_interface().unwrap().label, 17);

        /* same request again: no change, no notification */
        assert!(db.apply(local_request("tap1", &peer)).is_none());

        /* unknown interface: not installed */
        let other = Peer::new("other", PeerType::LocalVmPort);
        assert!(db.apply(local_request("tap99", &other)).is_none());
        assert!(db.find_path("red", &key, &other).is_none());

        /* unknown vrf */
        let request = RouteRequest::DeletePath {
            vrf: "blue".to_owned(),
            key: key.clone(),
            peer: peer.clone(),
        };
        assert!(db.apply(request).is_none());

        /* delete, then delete again */
        let request = RouteRequest::DeletePath {
            vrf: "red".to_owned(),
            key: key.clone(),
            peer: peer.clone(),
        };
        assert!(db.apply(request.clone()).is_some());
        assert!(db.find_route("red", &key).is_none());
        assert!(db.apply(request).is_none());
        assert!(logs_contain("no such route"));
    }

    #[test]
    fn test_apply_ecmp_and_tunnel() {
        let mut db = build_test_db();
        let peer = Peer::new("controller", PeerType::Bgp);
        let key = RouteKey::Evpn(EvpnRouteKey::type5(Prefix::expect_from(("10.9.0.0", 16))));
        let tunnel = TunnelNh::new(
            IpAddr::from_str("192.0.2.1").unwrap(),
            MacAddress::default(),
            TunnelTypes::VXLAN,
        );
        let composite = NextHopKey::Composite {
            ctype: CompositeType::LocalEcmp,
            components: vec![
                ComponentNhKey::new(17, NextHopKey::interface("tap1", false)),
                ComponentNhKey::new(18, NextHopKey::interface("tap7", false)),
            ],
        };
        let request = RouteRequest::AddRemoteEcmpRoute {
            vrf: "red".to_owned(),
            key: key.clone(),
            peer: peer.clone(),
            data: EcmpRouteData {
                composite: composite.clone(),
                attrs: PathAttributes::default(),
                new_members: vec![],
            },
        };
        assert!(db.apply(request).is_some());
        let path = db.find_path("red", &key, &peer).unwrap();
        let nh = path.nexthop().as_composite().unwrap();
        assert_eq!(nh.components.len(), 2);
        assert!(nh.components[1].is_none());
        assert_eq!(path.nexthop().key(), composite);

        /* tap7 shows up: the hole gets filled */
        db.iftable
            .add_interface(Interface::new_vm("tap7", 30, vm_mac(7), Some("vn-red")))
            .unwrap();
        let notifications = db.refresh_interface("tap7");
        assert_eq!(notifications.len(), 1);
        let path = db.find_path("red", &key, &peer).unwrap();
        assert_eq!(path.nexthop().as_composite().unwrap().live_components().count(), 2);
        assert!(db.refresh_interface("tap7").is_empty());

        /* replaced by a tunnel path of the same peer */
        let request = RouteRequest::AddTunnelRoute {
            vrf: "red".to_owned(),
            key: key.clone(),
            peer: peer.clone(),
            tunnel: tunnel.clone(),
            attrs: PathAttributes::default(),
        };
        assert!(db.apply(request).is_some());
        let route = db.find_route("red", &key).unwrap();
        assert_eq!(route.paths().len(), 1);
        assert_eq!(route.active_path().unwrap().nexthop().as_tunnel(), Some(&tunnel));
    }
}
