// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Build the component list of a composite next-hop out of the peer sources
//! of a route item. Each source names a local route whose next-hops become
//! members. Sources that don't parse or don't resolve are skipped.

use crate::encapsulation::INVALID_LABEL;
use crate::nexthop::{ComponentNhKey, NextHop, NextHopType, NhItemType};
use crate::peer::PeerType;
use crate::routingdb::RoutingDb;
use crate::vxlan::classify::{is_bgpaas_composite, is_bgpaas_interface};
use crate::vxlan::locator::find_route;
use crate::vxlan::mapper::RoutedVrfMap;
use lpm::codec::parse_prefix_str;
use std::net::IpAddr;
#[allow(unused)]
use tracing::{debug, error};

pub struct ComponentListBuilder<'a> {
    db: &'a RoutingDb,
    mapper: &'a dyn RoutedVrfMap,
}

impl<'a> ComponentListBuilder<'a> {
    #[must_use]
    pub fn new(db: &'a RoutingDb, mapper: &'a dyn RoutedVrfMap) -> Self {
        Self { db, mapper }
    }

    //////////////////////////////////////////////////////////////////
    /// Build the members for a set of peer sources, in source order.
    /// A source contributes the members of its local export path or,
    /// if it has none, those of a BGPaaS-backed local route.
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn build(&self, vrf: &str, item_type: NhItemType, peer_sources: &[String]) -> Vec<ComponentNhKey> {
        let sources: Vec<(IpAddr, u8)> = peer_sources
            .iter()
            .filter_map(|source| match parse_prefix_str(source) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    error!("Skipping peer source '{source}': {e}");
                    None
                }
            })
            .collect();

        let mut components = vec![];
        for (ip, plen) in &sources {
            let before = components.len();
            self.local_export_members(vrf, item_type, *ip, *plen, &mut components);
            if components.len() == before {
                self.bgpaas_members(vrf, *ip, *plen, &mut components);
            }
        }
        if components.is_empty() && !sources.is_empty() {
            debug!("None of {} peer source(s) resolve in {vrf}", sources.len());
        }
        components
    }

    fn local_export_members(
        &self,
        vrf: &str,
        item_type: NhItemType,
        ip: IpAddr,
        plen: u8,
        out: &mut Vec<ComponentNhKey>,
    ) {
        let Some(route) = find_route(&self.db.vrftable, vrf, ip, plen, item_type) else {
            return;
        };
        let Some(path) = route.find_path_by_type(PeerType::LocalVmExport) else {
            return;
        };
        match path.nexthop() {
            NextHop::Interface(nh) => out.push(ComponentNhKey::new(nh.label, path.nexthop().key())),
            NextHop::Composite(composite) => out.extend(
                composite
                    .live_components()
                    .map(|c| ComponentNhKey::new(c.label, c.nh.key())),
            ),
            nh => unreachable!(
                "Local export path for {ip}/{plen} in {vrf} has a {:?} next-hop",
                nh.nh_type()
            ),
        }
    }

    /// Search the VRF, then the bridges attached to it, for a local VM
    /// route backed by a BGPaaS interface
    fn bgpaas_members(&self, vrf: &str, ip: IpAddr, plen: u8, out: &mut Vec<ComponentNhKey>) {
        let bridges = self.mapper.bridge_vrfs_of(vrf).into_iter().map(|(_, v)| v);
        for candidate in std::iter::once(vrf.to_owned()).chain(bridges) {
            let Some(path) = find_route(&self.db.vrftable, &candidate, ip, plen, NhItemType::Inet)
                .and_then(|route| route.find_path_by_type(PeerType::LocalVmPort))
            else {
                continue;
            };
            let nh = path.nexthop();
            if is_bgpaas_interface(self.db, Some(nh)) {
                out.push(ComponentNhKey::new(INVALID_LABEL, nh.key()));
                return;
            }
            if let NextHop::Composite(composite) = nh
                && is_bgpaas_composite(self.db, Some(nh))
            {
                out.extend(
                    composite
                        .live_components()
                        .filter(|c| c.nh.nh_type() == NextHopType::Interface)
                        .map(|c| ComponentNhKey::new(INVALID_LABEL, c.nh.key())),
                );
                return;
            }
        }
    }
}
