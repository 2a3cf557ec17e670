// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The VXLAN routing manager owns the logical router map, the route
//! advertiser and the receiving end of the request queue. Configuration and
//! table events enter here and are dispatched to the advertiser.

use crate::errors::RouterError;
use crate::interfaces::interface::Interface;
use crate::nexthop::NhItemType;
use crate::peer::Peer;
use crate::rib::request::{
    RouteKey, RouteNotification, RouteRequestRx, RouteRequestTx, route_request_channel,
};
use crate::routingdb::RoutingDb;
use crate::vxlan::advertiser::RouteAdvertiser;
use crate::vxlan::mapper::{LogicalRouterId, RoutedVrfMap, VnConfig, VxlanRoutingVrfMapper};
use crate::vxlan::params::{AdvertiserParams, PeerRouteItem};
use lpm::prefix::Prefix;
use std::collections::BTreeSet;
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, info, warn};

pub struct VxlanRoutingManager {
    mapper: Arc<VxlanRoutingVrfMapper>,
    advertiser: RouteAdvertiser,
    tx: RouteRequestTx,
    rx: RouteRequestRx,
}

impl VxlanRoutingManager {
    #[must_use]
    pub fn new(params: AdvertiserParams) -> Self {
        let mapper = Arc::new(VxlanRoutingVrfMapper::new());
        let (tx, rx) = route_request_channel();
        let advertiser = RouteAdvertiser::new(params, mapper.clone(), tx.clone());
        debug!("Created VXLAN routing manager");
        Self {
            mapper,
            advertiser,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn mapper(&self) -> &VxlanRoutingVrfMapper {
        &self.mapper
    }

    #[must_use]
    pub fn advertiser(&self) -> &RouteAdvertiser {
        &self.advertiser
    }

    /// Get a sender to enqueue route requests for the tables
    #[must_use]
    pub fn request_sender(&self) -> RouteRequestTx {
        self.tx.clone()
    }

    fn routing_vrfs(&self) -> BTreeSet<String> {
        self.mapper
            .logical_routers()
            .iter()
            .filter_map(|lr| self.mapper.lookup(lr))
            .filter_map(|info| info.routing_vrf)
            .collect()
    }

    /// Withdraw what the advertiser owns in VRFs that were routing VRFs
    /// before a mapper change and no longer are
    fn withdraw_lost(&self, db: &RoutingDb, before: &BTreeSet<String>) {
        let after = self.routing_vrfs();
        for vrf in before.difference(&after) {
            info!("Vrf {vrf} is no longer a routing vrf");
            self.advertiser.withdraw_all(db, vrf);
        }
    }

    /// Detach a VN from every VRF that carries it, except `keep`
    fn clear_vn(db: &mut RoutingDb, vn: &str, keep: Option<&str>) {
        let vrfs: Vec<String> = db
            .vrftable
            .values()
            .filter(|vrf| vrf.vn() == Some(vn) && Some(vrf.name.as_str()) != keep)
            .map(|vrf| vrf.name.clone())
            .collect();
        for vrf in &vrfs {
            debug!("Vrf {vrf} no longer carries VN {vn}");
            if let Err(e) = db.vrftable.set_vn(vrf, None) {
                error!("Failed to clear VN of vrf {vrf}: {e}");
            }
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Apply the configuration of a VN and reconcile the logical
    /// routers it affects.
    ///
    /// # Errors
    ///
    /// Fails if the VRF of the VN does not exist
    //////////////////////////////////////////////////////////////////
    pub fn vn_update(&self, db: &mut RoutingDb, config: &VnConfig) -> Result<(), RouterError> {
        db.vrftable.get_vrf(&config.vrf)?;
        Self::clear_vn(db, &config.name, Some(&config.vrf));
        db.vrftable.set_vn(&config.vrf, Some(&config.name))?;
        let before = self.routing_vrfs();
        let affected = self.mapper.vn_update(config);
        self.withdraw_lost(db, &before);
        for lr in &affected {
            self.walk_logical_router(db, lr);
        }
        Ok(())
    }

    //////////////////////////////////////////////////////////////////
    /// Forget a VN and reconcile the logical router it belonged to
    //////////////////////////////////////////////////////////////////
    pub fn vn_delete(&self, db: &mut RoutingDb, vn: &str) {
        Self::clear_vn(db, vn, None);
        let before = self.routing_vrfs();
        let affected = self.mapper.vn_delete(vn);
        self.withdraw_lost(db, &before);
        if let Some(lr) = affected {
            self.walk_logical_router(db, &lr);
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Run every direction for every prefix known to a logical router:
    /// the routes of its bridges and of its routing VRF
    //////////////////////////////////////////////////////////////////
    pub fn walk_logical_router(&self, db: &RoutingDb, lr: &LogicalRouterId) {
        let Some(info) = self.mapper.lookup(lr) else {
            debug!("Logical router {lr} is gone");
            return;
        };
        let Some(routing_vrf) = info.routing_vrf else {
            debug!("Logical router {lr} has no routing vrf yet");
            return;
        };
        let mut prefixes: BTreeSet<Prefix> = BTreeSet::new();
        for bridge in info.bridge_vns.values() {
            if let Ok(vrf) = db.vrftable.get_vrf(bridge) {
                prefixes.extend(vrf.inet().iter().map(|r| *r.prefix()));
            }
        }
        if let Ok(vrf) = db.vrftable.get_vrf(&routing_vrf) {
            prefixes.extend(
                vrf.evpn()
                    .iter()
                    .filter(|(key, _)| key.is_type5())
                    .map(|(key, _)| key.prefix),
            );
            prefixes.extend(vrf.inet().iter().map(|r| *r.prefix()));
        }
        debug!(
            "Walking {} prefix(es) of logical router {lr} ({routing_vrf})",
            prefixes.len()
        );
        for prefix in &prefixes {
            self.advertiser.reconcile_bridge_to_evpn(db, &routing_vrf, prefix);
            self.advertiser.reconcile_evpn_to_inet(db, &routing_vrf, prefix);
            self.advertiser.reconcile_inet_to_evpn(db, &routing_vrf, prefix);
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Dispatch a route change to the direction it feeds
    //////////////////////////////////////////////////////////////////
    pub fn route_notify(&self, db: &RoutingDb, notification: &RouteNotification) {
        let Ok(vrf) = db.vrftable.get_vrf(&notification.vrf) else {
            return;
        };
        let prefix = notification.key.prefix();
        if self.mapper.is_routing_vrf(vrf) {
            match &notification.key {
                RouteKey::Evpn(key) if key.is_type5() => {
                    self.advertiser.reconcile_evpn_to_inet(db, &vrf.name, prefix);
                }
                RouteKey::Evpn(_) => {}
                RouteKey::Inet(_) => {
                    self.advertiser.reconcile_inet_to_evpn(db, &vrf.name, prefix);
                }
            }
        } else if self.mapper.is_bridge_vrf(vrf) && matches!(notification.key, RouteKey::Inet(_)) {
            self.advertiser.advertise_bridge_route(db, &vrf.name, prefix);
        }
    }

    //////////////////////////////////////////////////////////////////
    /// A peer delivered a route item
    //////////////////////////////////////////////////////////////////
    pub fn xmpp_route_update(
        &self,
        db: &RoutingDb,
        peer: &Peer,
        vrf: &str,
        prefix: &Prefix,
        item: &PeerRouteItem,
    ) {
        self.advertiser.advertise_peer_item(db, peer, vrf, prefix, item);
    }

    //////////////////////////////////////////////////////////////////
    /// A peer withdrew a route item
    //////////////////////////////////////////////////////////////////
    pub fn xmpp_route_withdraw(
        &self,
        db: &RoutingDb,
        peer: &Peer,
        vrf: &str,
        prefix: &Prefix,
        item_type: NhItemType,
    ) {
        self.advertiser.withdraw_peer_item(db, peer, vrf, prefix, item_type);
    }

    //////////////////////////////////////////////////////////////////
    /// Add an interface or replace the one with the same name, then
    /// reconcile what uses it
    ///
    /// # Errors
    ///
    /// Fails if the interface table rejects the interface
    //////////////////////////////////////////////////////////////////
    pub fn interface_update(&self, db: &mut RoutingDb, iface: Interface) -> Result<(), RouterError> {
        let ifname = iface.name.clone();
        if db.iftable.contains(&ifname) {
            db.iftable.mod_interface(iface)?;
        } else {
            db.iftable.add_interface(iface)?;
        }
        self.interface_notify(db, &ifname);
        Ok(())
    }

    //////////////////////////////////////////////////////////////////
    /// Remove an interface and reconcile what used it
    //////////////////////////////////////////////////////////////////
    pub fn interface_delete(&self, db: &mut RoutingDb, ifname: &str) {
        if db.iftable.del_interface(ifname).is_none() {
            debug!("Interface {ifname} is not known");
            return;
        }
        self.interface_notify(db, ifname);
    }

    //////////////////////////////////////////////////////////////////
    /// An interface was added, changed or removed: refresh the paths
    /// using it and reconcile all logical routers
    //////////////////////////////////////////////////////////////////
    pub fn interface_notify(&self, db: &mut RoutingDb, ifname: &str) {
        for notification in db.refresh_interface(ifname) {
            self.route_notify(db, &notification);
        }
        for lr in self.mapper.logical_routers() {
            self.walk_logical_router(db, &lr);
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Apply queued route requests to the tables, feeding the changes
    /// back to the advertiser, until the queue is empty. Returns the
    /// number of route changes.
    //////////////////////////////////////////////////////////////////
    pub fn process_requests(&mut self, db: &mut RoutingDb) -> usize {
        let mut changes = 0;
        while let Some(request) = self.rx.try_recv() {
            if let Some(notification) = db.apply(request) {
                changes += 1;
                self.route_notify(db, &notification);
            }
        }
        if changes > 0 {
            debug!("Applied {changes} route change(s)");
        }
        changes
    }
}
