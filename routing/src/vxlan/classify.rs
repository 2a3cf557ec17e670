// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Next-hop classification. All functions are pure and total: a missing
//! next-hop classifies as nothing.

use crate::encapsulation::INVALID_LABEL;
use crate::nexthop::{NextHop, NextHopType};
use crate::routingdb::RoutingDb;

/// Tell if a next-hop is an interface next-hop
#[must_use]
pub fn is_interface_nexthop(nh: Option<&NextHop>) -> bool {
    nh.is_some_and(|nh| nh.nh_type() == NextHopType::Interface)
}

/// Tell if a next-hop is a composite whose live components are of some type.
/// If `strict`, all of them must be, and a composite without live components
/// qualifies. Otherwise, at least one must be.
#[must_use]
pub fn is_composite_of_type(nh: Option<&NextHop>, target: NextHopType, strict: bool) -> bool {
    let Some(NextHop::Composite(composite)) = nh else {
        return false;
    };
    let mut live = composite.live_components();
    if strict {
        live.all(|c| c.nh.nh_type() == target)
    } else {
        live.any(|c| c.nh.nh_type() == target)
    }
}

/// Tell if a next-hop is an interface next-hop towards a VM that runs a
/// BGPaaS session on its primary IPv4 or IPv6 address
#[must_use]
pub fn is_bgpaas_interface(db: &RoutingDb, nh: Option<&NextHop>) -> bool {
    let Some(NextHop::Interface(nh)) = nh else {
        return false;
    };
    if nh.label == INVALID_LABEL {
        return false;
    }
    db.iftable
        .get_interface(&nh.ifname)
        .is_some_and(|iface| {
            iface
                .primary_addresses()
                .any(|address| db.bgpaas.is_bgpaas(&nh.ifname, &address))
        })
}

/// Tell if a next-hop is a composite with at least one BGPaaS interface member
#[must_use]
pub fn is_bgpaas_composite(db: &RoutingDb, nh: Option<&NextHop>) -> bool {
    let Some(NextHop::Composite(composite)) = nh else {
        return false;
    };
    composite
        .live_components()
        .any(|c| is_bgpaas_interface(db, Some(&c.nh)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bgpaas::BgpaasTable;
    use crate::encapsulation::TunnelTypes;
    use crate::interfaces::tests::build_test_iftable;
    use crate::nexthop::{ComponentNh, ComponentNhKey, CompositeNh, CompositeType, InterfaceNh, TunnelNh};
    use mac_address::MacAddress;
    use std::net::IpAddr;
    use std::str::FromStr;

    fn interface(ifname: &str, label: u32) -> NextHop {
        NextHop::Interface(InterfaceNh {
            ifname: ifname.to_owned(),
            label,
            policy: false,
        })
    }

    fn tunnel() -> NextHop {
        NextHop::Tunnel(TunnelNh::new(
            IpAddr::from_str("192.0.2.1").unwrap(),
            MacAddress::default(),
            TunnelTypes::VXLAN,
        ))
    }

    fn composite(members: Vec<Option<NextHop>>) -> NextHop {
        let components: Vec<Option<ComponentNh>> = members
            .into_iter()
            .map(|m| m.map(|nh| ComponentNh { label: 1, nh }))
            .collect();
        let keys = components
            .iter()
            .flatten()
            .map(|c| ComponentNhKey::new(c.label, c.nh.key()))
            .collect();
        NextHop::Composite(CompositeNh {
            ctype: CompositeType::Ecmp,
            keys,
            components,
        })
    }

    #[test]
    fn test_interface_and_missing() {
        assert!(is_interface_nexthop(Some(&interface("tap1", 17))));
        assert!(!is_interface_nexthop(Some(&tunnel())));
        assert!(!is_interface_nexthop(None));
        assert!(!is_composite_of_type(None, NextHopType::Interface, true));
        assert!(!is_composite_of_type(
            Some(&interface("tap1", 17)),
            NextHopType::Interface,
            false
        ));
    }

    #[test]
    fn test_composite_strictness() {
        let mixed = composite(vec![Some(interface("tap1", 17)), Some(tunnel())]);
        assert!(!is_composite_of_type(Some(&mixed), NextHopType::Interface, true));
        assert!(is_composite_of_type(Some(&mixed), NextHopType::Interface, false));

        /* holes are not members */
        let holed = composite(vec![None, Some(interface("tap1", 17)), None]);
        assert!(is_composite_of_type(Some(&holed), NextHopType::Interface, true));

        /* no live members: vacuously strict, never loose */
        let empty = composite(vec![None]);
        assert!(is_composite_of_type(Some(&empty), NextHopType::Tunnel, true));
        assert!(!is_composite_of_type(Some(&empty), NextHopType::Tunnel, false));
    }

    #[test]
    fn test_composite_strictness_arbitrary() {
        bolero::check!()
            .with_type::<Vec<Option<bool>>>()
            .for_each(|members| {
                let nh = composite(
                    members
                        .iter()
                        .map(|m| m.map(|is_if| if is_if { interface("tap1", 17) } else { tunnel() }))
                        .collect(),
                );
                let live: Vec<bool> = members.iter().flatten().copied().collect();
                assert_eq!(
                    is_composite_of_type(Some(&nh), NextHopType::Interface, true),
                    live.iter().all(|is_if| *is_if)
                );
                assert_eq!(
                    is_composite_of_type(Some(&nh), NextHopType::Interface, false),
                    live.iter().any(|is_if| *is_if)
                );
            });
    }

    #[test]
    fn test_bgpaas() {
        let mut bgpaas = BgpaasTable::new();
        bgpaas.add_session("tap2", IpAddr::from_str("fd00:1::4").unwrap());
        let mut db = RoutingDb::with_bgpaas(Box::new(bgpaas));
        db.iftable = build_test_iftable();

        /* matched on the primary ipv6 address */
        assert!(is_bgpaas_interface(&db, Some(&interface("tap2", 18))));
        /* no session */
        assert!(!is_bgpaas_interface(&db, Some(&interface("tap1", 17))));
        /* label must be valid */
        assert!(!is_bgpaas_interface(&db, Some(&interface("tap2", INVALID_LABEL))));
        /* not a vm interface */
        assert!(!is_bgpaas_interface(&db, Some(&interface("eth0", 0))));
        assert!(!is_bgpaas_interface(&db, None));

        let nh = composite(vec![Some(tunnel()), Some(interface("tap2", 18))]);
        assert!(is_bgpaas_composite(&db, Some(&nh)));
        let nh = composite(vec![Some(tunnel()), Some(interface("tap1", 17))]);
        assert!(!is_bgpaas_composite(&db, Some(&nh)));
    }
}
