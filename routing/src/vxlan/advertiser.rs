// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The route advertiser. For a (VRF, prefix, direction), it computes what
//! should be installed under the peer owning that direction and enqueues the
//! requests that get the tables there. Decisions only depend on the current
//! table state, so running one twice on unchanged state enqueues nothing.
//!
//! Directions:
//! * bridge to EVPN: local VM routes of bridge VRFs are exported as Type-5
//!   routes into the routing VRF, under the interface peer.
//! * EVPN to Inet: Type-5 routes of a routing VRF are mirrored into its Inet
//!   table, under the VXLAN-BGP peer.
//! * Inet to EVPN: tunnel routes learnt over BGP in the Inet table of a
//!   routing VRF are mirrored as Type-5 routes, under the VXLAN-BGP peer.
//! * peer items: route items delivered by a peer are installed under that peer.

use crate::encapsulation::{TunnelTypes, Vni};
use crate::nexthop::{ComponentNhKey, CompositeNh, CompositeType, NextHop, NextHopKey, NhItemType, TunnelNh};
use crate::peer::{Peer, PeerType};
use crate::rib::evpn::EvpnRouteKey;
use crate::rib::path::{AgentPath, PathAttributes};
use crate::rib::request::{EcmpRouteData, RouteKey, RouteRequest, RouteRequestTx};
use crate::routingdb::RoutingDb;
use crate::vxlan::composite::ComponentListBuilder;
use crate::vxlan::locator::find_route;
use crate::vxlan::mapper::RoutedVrfMap;
use crate::vxlan::params::{AdvertiserParams, PeerRouteItem, RouteParameters};
use lpm::prefix::Prefix;
use mac_address::MacAddress;
use std::net::IpAddr;
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, info, warn};

/// What a decision wants installed under a peer for a route
#[derive(Debug, Clone, PartialEq)]
pub enum Advertisement {
    Local { nh: NextHopKey, attrs: PathAttributes },
    Ecmp { composite: NextHopKey, attrs: PathAttributes },
    Tunnel { tunnel: TunnelNh, attrs: PathAttributes },
}

impl Advertisement {
    /// Tell if an installed path already is what this advertisement wants.
    /// The local ECMP sequence of composites does not count.
    #[must_use]
    pub fn matches(&self, path: &AgentPath) -> bool {
        match self {
            Advertisement::Local { nh, attrs } => path.nexthop().key() == *nh && path.attrs() == attrs,
            Advertisement::Ecmp { composite, attrs } => {
                path.nexthop().key() == *composite && path.attrs().same_as(attrs)
            }
            Advertisement::Tunnel { tunnel, attrs } => {
                path.nexthop().as_tunnel() == Some(tunnel) && path.attrs() == attrs
            }
        }
    }
}

pub struct RouteAdvertiser {
    params: AdvertiserParams,
    mapper: Arc<dyn RoutedVrfMap>,
    tx: RouteRequestTx,
}

impl RouteAdvertiser {
    #[must_use]
    pub fn new(params: AdvertiserParams, mapper: Arc<dyn RoutedVrfMap>, tx: RouteRequestTx) -> Self {
        Self { params, mapper, tx }
    }

    #[must_use]
    pub fn params(&self) -> &AdvertiserParams {
        &self.params
    }

    //////////////////////////////////////////////////////////////////
    /// A route of a bridge VRF changed: re-export the prefix into the
    /// routing VRF of the bridge, if it is attached to one.
    //////////////////////////////////////////////////////////////////
    pub fn advertise_bridge_route(&self, db: &RoutingDb, bridge_vrf: &str, prefix: &Prefix) {
        let Ok(vrf) = db.vrftable.get_vrf(bridge_vrf) else {
            return;
        };
        let Some(routing_vrf) = self.mapper.routing_vrf_of_bridge(vrf) else {
            debug!("Bridge vrf {bridge_vrf} has no routing vrf yet");
            return;
        };
        self.reconcile_bridge_to_evpn(db, &routing_vrf, prefix);
    }

    //////////////////////////////////////////////////////////////////
    /// Export the local VM route of the first bridge holding a prefix
    /// as a Type-5 route of the routing VRF
    //////////////////////////////////////////////////////////////////
    pub fn reconcile_bridge_to_evpn(&self, db: &RoutingDb, routing_vrf: &str, prefix: &Prefix) {
        let desired = self.bridge_advertisement(db, routing_vrf, prefix);
        let key = RouteKey::Evpn(EvpnRouteKey::type5(*prefix));
        self.sync_path(db, routing_vrf, key, &self.params.interface_peer, desired);
    }

    fn bridge_advertisement(&self, db: &RoutingDb, routing_vrf: &str, prefix: &Prefix) -> Option<Advertisement> {
        let (ip, plen) = (prefix.as_address(), prefix.length());
        let (vn, bridge_vrf) = self.mapper.origin_bridge(&db.vrftable, routing_vrf, ip, plen)?;
        let route = find_route(&db.vrftable, &bridge_vrf, ip, plen, NhItemType::Inet)?;
        let path = route.find_path_by_type(PeerType::LocalVmPort)?;
        let routing_vni = db.vrftable.get_vrf(routing_vrf).ok()?.vni();
        let params = RouteParameters::from_path(path)
            .with_dest_vns(vec![vn])
            .with_vxlan_id(routing_vni);
        self.local_advertisement(db, path.nexthop(), params)
    }

    //////////////////////////////////////////////////////////////////
    /// Mirror the Type-5 route of a routing VRF into its Inet table
    //////////////////////////////////////////////////////////////////
    pub fn reconcile_evpn_to_inet(&self, db: &RoutingDb, routing_vrf: &str, prefix: &Prefix) {
        let desired = self.evpn_advertisement(db, routing_vrf, prefix);
        let key = RouteKey::Inet(*prefix);
        self.sync_path(db, routing_vrf, key, &self.params.vxlan_bgp_peer, desired);
    }

    fn evpn_advertisement(&self, db: &RoutingDb, routing_vrf: &str, prefix: &Prefix) -> Option<Advertisement> {
        let route = find_route(
            &db.vrftable,
            routing_vrf,
            prefix.as_address(),
            prefix.length(),
            NhItemType::Evpn,
        )?;
        let path = route
            .paths()
            .iter()
            .find(|p| *p.peer() != self.params.vxlan_bgp_peer)?;
        let params = RouteParameters::from_path(path);
        match path.nexthop() {
            NextHop::Tunnel(tunnel) => {
                let tunnel = self.resolve_tunnel(db, &params, tunnel.tunnel_type)?;
                let attrs = params.into_attributes(tunnel.tunnel_type);
                Some(Advertisement::Tunnel { tunnel, attrs })
            }
            NextHop::Composite(composite) => {
                let members = self.composite_members(db, composite, false);
                self.members_advertisement(db, members, params)
            }
            nh => self.local_advertisement(db, nh, params),
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Mirror a BGP tunnel route of the Inet table of a routing VRF
    /// as a Type-5 route
    //////////////////////////////////////////////////////////////////
    pub fn reconcile_inet_to_evpn(&self, db: &RoutingDb, routing_vrf: &str, prefix: &Prefix) {
        let desired = self.inet_advertisement(db, routing_vrf, prefix);
        let key = RouteKey::Evpn(EvpnRouteKey::type5(*prefix));
        self.sync_path(db, routing_vrf, key, &self.params.vxlan_bgp_peer, desired);
    }

    fn inet_advertisement(&self, db: &RoutingDb, routing_vrf: &str, prefix: &Prefix) -> Option<Advertisement> {
        let route = find_route(
            &db.vrftable,
            routing_vrf,
            prefix.as_address(),
            prefix.length(),
            NhItemType::Inet,
        )?;
        let path = route
            .paths()
            .iter()
            .find(|p| p.peer().is_bgp() && p.nexthop().as_tunnel().is_some())?;
        let params = RouteParameters::from_path(path);
        let tunnel = self.resolve_tunnel(db, &params, TunnelTypes::VXLAN)?;
        let attrs = params.into_attributes(TunnelTypes::VXLAN);
        Some(Advertisement::Tunnel { tunnel, attrs })
    }

    //////////////////////////////////////////////////////////////////
    /// Install a route item delivered by a peer. Next-hops with our
    /// own address are local: their members come from the peer
    /// sources of the item. Other next-hops are tunnels.
    //////////////////////////////////////////////////////////////////
    pub fn advertise_peer_item(
        &self,
        db: &RoutingDb,
        peer: &Peer,
        vrf: &str,
        prefix: &Prefix,
        item: &PeerRouteItem,
    ) {
        if db.vrftable.get_vrf(vrf).is_err() {
            debug!("Ignoring item for {prefix} from {peer}: no vrf {vrf}");
            return;
        }
        let mut members = vec![];
        if item
            .nexthops
            .iter()
            .any(|nh| nh.address == self.params.router_id)
        {
            members = ComponentListBuilder::new(db, self.mapper.as_ref()).build(
                vrf,
                item.item_type,
                &item.peer_sources,
            );
            if members.is_empty() {
                debug!("No local member for {prefix} in {vrf} yet");
            }
        }
        members.extend(
            item.nexthops
                .iter()
                .filter(|nh| nh.address != self.params.router_id)
                .map(|nh| {
                    let tunnel = TunnelNh::new(nh.address, nh.mac, nh.tunnel_types.preferred());
                    ComponentNhKey::new(nh.label, NextHopKey::Tunnel(tunnel))
                }),
        );
        let desired = self.members_advertisement(db, members, item.params.clone());
        let key = Self::item_key(item.item_type, prefix);
        self.sync_path(db, vrf, key, peer, desired);
    }

    //////////////////////////////////////////////////////////////////
    /// Remove the path of a peer route item
    //////////////////////////////////////////////////////////////////
    pub fn withdraw_peer_item(
        &self,
        db: &RoutingDb,
        peer: &Peer,
        vrf: &str,
        prefix: &Prefix,
        item_type: NhItemType,
    ) {
        let key = Self::item_key(item_type, prefix);
        self.sync_path(db, vrf, key, peer, None);
    }

    fn item_key(item_type: NhItemType, prefix: &Prefix) -> RouteKey {
        match item_type {
            NhItemType::Evpn => RouteKey::Evpn(EvpnRouteKey::type5(*prefix)),
            NhItemType::Inet => RouteKey::Inet(*prefix),
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Withdraw every path the advertiser owns in a VRF. Used when a
    /// VRF stops being a routing VRF.
    //////////////////////////////////////////////////////////////////
    pub fn withdraw_all(&self, db: &RoutingDb, vrf_name: &str) {
        let Ok(vrf) = db.vrftable.get_vrf(vrf_name) else {
            return;
        };
        let peers = [&self.params.interface_peer, &self.params.vxlan_bgp_peer];
        let inet = vrf.inet().iter().map(|r| (RouteKey::Inet(*r.prefix()), r));
        let evpn = vrf.evpn().iter().map(|(k, r)| (RouteKey::Evpn(*k), r));
        let mut count = 0;
        for (key, route) in inet.chain(evpn) {
            for peer in peers {
                if route.find_path(peer).is_some() {
                    self.tx.send(RouteRequest::DeletePath {
                        vrf: vrf_name.to_owned(),
                        key: key.clone(),
                        peer: peer.clone(),
                    });
                    count += 1;
                }
            }
        }
        if count > 0 {
            info!("Withdrawing {count} path(s) from former routing vrf {vrf_name}");
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Look up the MAC of a router in the fabric VRF: the host route
    /// to it must have a BGP tunnel path with a MAC.
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn lookup_router_mac(&self, db: &RoutingDb, router: &IpAddr) -> Option<MacAddress> {
        let fabric = db.vrftable.get_vrf(&self.params.fabric_vrf).ok()?;
        let route = fabric.inet().find_exact(&Prefix::host(*router))?;
        route
            .paths()
            .iter()
            .filter(|p| p.peer().is_bgp())
            .filter_map(|p| p.nexthop().as_tunnel())
            .map(|t| t.rewrite_dmac)
            .find(|mac| *mac != MacAddress::default())
    }

    /// Build the tunnel of an advertisement, resolving the MAC if unknown
    fn resolve_tunnel(&self, db: &RoutingDb, params: &RouteParameters, tunnel_type: TunnelTypes) -> Option<TunnelNh> {
        let dip = params.nh_addr?;
        let mut mac = params.nh_mac;
        if mac == MacAddress::default() {
            mac = self.lookup_router_mac(db, &dip).unwrap_or_default();
        }
        Some(TunnelNh::new(dip, mac, tunnel_type))
    }

    //////////////////////////////////////////////////////////////////
    /// Advertisement for a local next-hop. Only interface next-hops
    /// on VM interfaces and composites of those qualify.
    //////////////////////////////////////////////////////////////////
    fn local_advertisement(&self, db: &RoutingDb, nh: &NextHop, params: RouteParameters) -> Option<Advertisement> {
        match nh {
            NextHop::Interface(interface) => {
                let iface = db.iftable.get_interface(&interface.ifname)?;
                if !iface.is_vm_interface() {
                    return None;
                }
                Some(Advertisement::Local {
                    nh: nh.key(),
                    attrs: params.into_attributes(TunnelTypes::VXLAN),
                })
            }
            NextHop::Composite(composite) => {
                let members = self.composite_members(db, composite, true);
                self.members_advertisement(db, members, params)
            }
            _ => None,
        }
    }

    /// Live members of a composite. Interface members must be on VM
    /// interfaces; tunnel members are kept unless `local_only`.
    fn composite_members(&self, db: &RoutingDb, composite: &CompositeNh, local_only: bool) -> Vec<ComponentNhKey> {
        composite
            .live_components()
            .filter(|c| match &c.nh {
                NextHop::Interface(i) => db
                    .iftable
                    .get_interface(&i.ifname)
                    .is_some_and(|iface| iface.is_vm_interface()),
                NextHop::Tunnel(_) => !local_only,
                _ => false,
            })
            .map(|c| ComponentNhKey::new(c.label, c.nh.key()))
            .collect()
    }

    //////////////////////////////////////////////////////////////////
    /// Advertisement for a list of members: nothing for none, a plain
    /// interface or tunnel route for one, a composite for more.
    //////////////////////////////////////////////////////////////////
    fn members_advertisement(
        &self,
        db: &RoutingDb,
        mut members: Vec<ComponentNhKey>,
        params: RouteParameters,
    ) -> Option<Advertisement> {
        match members.len() {
            0 => None,
            1 => {
                let member = members.remove(0);
                match member.key {
                    NextHopKey::Interface { .. } => Some(Advertisement::Local {
                        nh: member.key,
                        attrs: params.into_attributes(TunnelTypes::VXLAN),
                    }),
                    NextHopKey::Tunnel(tunnel) => {
                        let vxlan_id = Vni::new_checked(member.label).ok().or(params.vxlan_id);
                        let params = params
                            .with_nexthop(tunnel.dip, tunnel.rewrite_dmac)
                            .with_vxlan_id(vxlan_id);
                        let tunnel = self.resolve_tunnel(db, &params, tunnel.tunnel_type)?;
                        let attrs = params.into_attributes(tunnel.tunnel_type);
                        Some(Advertisement::Tunnel { tunnel, attrs })
                    }
                    key => unreachable!("Unexpected {:?} member", key.nh_type()),
                }
            }
            _ => {
                let all_local = members
                    .iter()
                    .all(|m| matches!(m.key, NextHopKey::Interface { .. }));
                let ctype = if all_local {
                    CompositeType::LocalEcmp
                } else {
                    CompositeType::Ecmp
                };
                Some(Advertisement::Ecmp {
                    composite: NextHopKey::Composite {
                        ctype,
                        components: members,
                    },
                    attrs: params.into_attributes(TunnelTypes::VXLAN),
                })
            }
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Get the path of a peer for a route to what a decision wants.
    /// A path that no longer matches is replaced in place, or deleted
    /// if the decision is to have nothing. Returns true if a request
    /// was enqueued.
    //////////////////////////////////////////////////////////////////
    fn sync_path(
        &self,
        db: &RoutingDb,
        vrf: &str,
        key: RouteKey,
        peer: &Peer,
        desired: Option<Advertisement>,
    ) -> bool {
        let existing = db.find_path(vrf, &key, peer);
        match (existing, desired) {
            (None, None) => false,
            (Some(_), None) => {
                debug!("Withdrawing {key} in {vrf} from {peer}");
                self.tx.send(RouteRequest::DeletePath {
                    vrf: vrf.to_owned(),
                    key,
                    peer: peer.clone(),
                });
                true
            }
            (Some(path), Some(desired)) if desired.matches(path) => false,
            (existing, Some(desired)) => {
                let request = self.build_request(vrf, key, peer, desired, existing);
                self.tx.send(request);
                true
            }
        }
    }

    fn build_request(
        &self,
        vrf: &str,
        key: RouteKey,
        peer: &Peer,
        desired: Advertisement,
        existing: Option<&AgentPath>,
    ) -> RouteRequest {
        let vrf = vrf.to_owned();
        let peer = peer.clone();
        match desired {
            Advertisement::Local { nh, attrs } => RouteRequest::AddLocalRoute {
                vrf,
                key,
                peer,
                nh,
                attrs,
            },
            Advertisement::Tunnel { tunnel, attrs } => RouteRequest::AddTunnelRoute {
                vrf,
                key,
                peer,
                tunnel,
                attrs,
            },
            Advertisement::Ecmp { composite, mut attrs } => {
                let NextHopKey::Composite { components, .. } = &composite else {
                    unreachable!("Ecmp advertisement without a composite");
                };
                let known = existing.and_then(|path| match path.nexthop().key() {
                    NextHopKey::Composite { components, .. } => Some(components),
                    _ => None,
                });
                let new_members: Vec<ComponentNhKey> = components
                    .iter()
                    .filter(|c| !known.as_ref().is_some_and(|known| known.contains(c)))
                    .cloned()
                    .collect();
                let same_members = known.as_ref().is_some_and(|known| known == components);
                attrs.local_ecmp_sequence = match existing {
                    Some(path) if same_members => path.attrs().local_ecmp_sequence,
                    _ => self
                        .mapper
                        .logical_router_of_vrf(&vrf)
                        .map_or(0, |lr| self.mapper.next_local_ecmp_sequence(&lr)),
                };
                RouteRequest::AddRemoteEcmpRoute {
                    vrf,
                    key,
                    peer,
                    data: EcmpRouteData {
                        composite,
                        attrs,
                        new_members,
                    },
                }
            }
        }
    }
}
