// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VXLAN routing: the logical router map, the route advertiser and the
//! manager that drives them.

pub mod advertiser;
pub mod classify;
pub mod composite;
pub mod diag;
pub mod locator;
pub mod manager;
pub mod mapper;
pub mod params;

#[cfg(test)]
pub mod tests {
    use crate::bgpaas::BgpaasTable;
    use crate::interfaces::interface::{IfType, Interface};
    use crate::interfaces::tests::vm_mac;
    use crate::nexthop::NextHopKey;
    use crate::peer::{Peer, PeerType};
    use crate::rib::path::PathAttributes;
    use crate::rib::request::{RouteKey, RouteRequest};
    use crate::routingdb::RoutingDb;
    use crate::vxlan::manager::VxlanRoutingManager;
    use crate::vxlan::mapper::{LogicalRouterId, VnConfig};
    use crate::vxlan::params::{AdvertiserParams, AdvertiserParamsBuilder, DEFAULT_FABRIC_VRF};
    use lpm::prefix::Prefix;
    use std::net::IpAddr;
    use std::str::FromStr;
    use uuid::Uuid;

    pub const ROUTER_ID: &str = "10.100.0.1";
    pub const LR1: LogicalRouterId = Uuid::from_u128(0x1111_0000_0000_0000_0000_0000_0000_0001);
    pub const ROUTING_VNI: u32 = 5001;

    pub fn addr(a: &str) -> IpAddr {
        IpAddr::from_str(a).expect("Bad address")
    }

    pub fn host(a: &str) -> Prefix {
        Prefix::host(addr(a))
    }

    pub fn test_params() -> AdvertiserParams {
        AdvertiserParamsBuilder::default()
            .router_id(addr(ROUTER_ID))
            .build()
            .expect("Should succeed")
    }

    pub fn vn_config(name: &str, vrf: &str, lr: Option<LogicalRouterId>, routing_vn: bool) -> VnConfig {
        VnConfig {
            name: name.to_owned(),
            vrf: vrf.to_owned(),
            logical_router: lr,
            routing_vn,
        }
    }

    pub fn local_vm_peer() -> Peer {
        Peer::new("local-vm", PeerType::LocalVmPort)
    }

    pub fn controller() -> Peer {
        Peer::new("control-node-1", PeerType::Bgp)
    }

    /// Request for a local VM route of the local VM peer
    pub fn local_vm_route(vrf: &str, prefix: Prefix, nh: NextHopKey) -> RouteRequest {
        RouteRequest::AddLocalRoute {
            vrf: vrf.to_owned(),
            key: RouteKey::Inet(prefix),
            peer: local_vm_peer(),
            nh,
            attrs: PathAttributes {
                sg_list: vec![8_000_001],
                sequence: 1,
                ..Default::default()
            },
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Build the tables of the test scenarios:
    /// * vrf-blue, vrf-green: bridge VRFs
    /// * vrf-lr1: routing VRF, vni 5001
    /// * the fabric VRF
    /// * vmi-7 (10.0.0.5) and vmi-8 (10.0.0.6): VM interfaces
    /// * bgp-a (192.0.2.10) and bgp-b (192.0.2.11): VM interfaces with
    ///   a BGPaaS session each
    /// * vrf-blue holds the local VM routes of vmi-7, bgp-a and bgp-b
    //////////////////////////////////////////////////////////////////
    pub fn build_scenario_db() -> RoutingDb {
        let mut bgpaas = BgpaasTable::new();
        bgpaas.add_session("bgp-a", addr("192.0.2.10"));
        bgpaas.add_session("bgp-b", addr("192.0.2.11"));
        let mut db = RoutingDb::with_bgpaas(Box::new(bgpaas));

        let interfaces = [
            Interface::new_vm("vmi-7", 25, vm_mac(7), Some("vn-blue"))
                .with_primary_address(addr("10.0.0.5")),
            Interface::new_vm("vmi-8", 26, vm_mac(8), Some("vn-blue"))
                .with_primary_address(addr("10.0.0.6")),
            Interface::new_vm("bgp-a", 40, vm_mac(10), Some("vn-blue"))
                .with_primary_address(addr("192.0.2.10")),
            Interface::new_vm("bgp-b", 41, vm_mac(11), Some("vn-blue"))
                .with_primary_address(addr("192.0.2.11")),
            Interface::new("eth0", IfType::Physical, 0),
        ];
        for iface in interfaces {
            db.iftable.add_interface(iface).expect("Should succeed");
        }

        db.vrftable.add_vrf("vrf-blue", None).expect("Should succeed");
        db.vrftable.add_vrf("vrf-green", None).expect("Should succeed");
        db.vrftable
            .add_vrf("vrf-lr1", Some(ROUTING_VNI))
            .expect("Should succeed");
        db.vrftable
            .add_vrf(DEFAULT_FABRIC_VRF, None)
            .expect("Should succeed");

        for (ip, ifname) in [
            ("10.0.0.5", "vmi-7"),
            ("192.0.2.10", "bgp-a"),
            ("192.0.2.11", "bgp-b"),
        ] {
            let request = local_vm_route("vrf-blue", host(ip), NextHopKey::interface(ifname, false));
            assert!(db.apply(request).is_some());
        }
        db
    }

    //////////////////////////////////////////////////////////////////
    /// Build the scenario tables and a manager where LR1 has vn-lr1 as
    /// routing VN and vn-blue as bridge VN, with all requests applied
    //////////////////////////////////////////////////////////////////
    pub fn build_scenario() -> (RoutingDb, VxlanRoutingManager) {
        let mut db = build_scenario_db();
        let mut manager = VxlanRoutingManager::new(test_params());
        manager
            .vn_update(&mut db, &vn_config("vn-lr1", "vrf-lr1", Some(LR1), true))
            .expect("Should succeed");
        manager
            .vn_update(&mut db, &vn_config("vn-blue", "vrf-blue", Some(LR1), false))
            .expect("Should succeed");
        manager.process_requests(&mut db);
        (db, manager)
    }
}
