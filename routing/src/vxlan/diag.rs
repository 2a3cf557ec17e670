// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Operator-triggered dumps of the state VXLAN routing works on. Dumps are
//! logged at info level and returned.

use crate::display::LogicalRouterMap;
use crate::errors::RouterError;
use crate::routingdb::RoutingDb;
use crate::vxlan::mapper::RoutedVrfMap;
#[allow(unused)]
use tracing::{debug, info};

/// Dump the EVPN table of a VRF
///
/// # Errors
///
/// Fails if there is no such VRF
pub fn dump_evpn_table(db: &RoutingDb, vrf: &str) -> Result<String, RouterError> {
    let vrf = db.vrftable.get_vrf(vrf)?;
    let dump = format!(" Vrf: '{}'\n{}", vrf.name, vrf.evpn());
    info!("\n{dump}");
    Ok(dump)
}

/// Dump the Inet table of a VRF
///
/// # Errors
///
/// Fails if there is no such VRF
pub fn dump_inet_table(db: &RoutingDb, vrf: &str) -> Result<String, RouterError> {
    let vrf = db.vrftable.get_vrf(vrf)?;
    let dump = format!(" Vrf: '{}'\n{}", vrf.name, vrf.inet());
    info!("\n{dump}");
    Ok(dump)
}

/// Dump the logical routers and their VNs
pub fn dump_lr_map(mapper: &dyn RoutedVrfMap) -> String {
    let dump = LogicalRouterMap(mapper).to_string();
    info!("\n{dump}");
    dump
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vxlan::tests::build_scenario;

    #[test]
    fn test_dumps() {
        let (db, manager) = build_scenario();

        let evpn = dump_evpn_table(&db, "vrf-lr1").expect("Should succeed");
        assert!(evpn.contains("EVPN routes (3)"));
        assert!(evpn.contains("10.0.0.5/32"));
        assert!(evpn.contains("routing-vrf-interface-peer"));
        assert!(evpn.contains("interface vmi-7 label 25"));

        let inet = dump_inet_table(&db, "vrf-lr1").expect("Should succeed");
        assert!(inet.contains("Inet routes (3)"));
        assert!(inet.contains("routing-vrf-vxlan-bgp-peer"));

        let map = dump_lr_map(manager.mapper());
        assert!(map.contains("Logical routers (1)"));
        assert!(map.contains("routing vn : vn-lr1 (vrf vrf-lr1)"));
        assert!(map.contains("bridge vn  : vn-blue (vrf vrf-blue)"));

        assert!(matches!(
            dump_evpn_table(&db, "vrf-nowhere"),
            Err(RouterError::NoSuchVrf(_))
        ));
    }
}
