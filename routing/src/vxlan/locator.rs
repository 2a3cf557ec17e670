// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Locate the route a prefix binds to in a VRF. Only exact hits count:
//! a less specific covering route is never returned, and neither is a
//! route whose network address differs from the queried address.

use crate::nexthop::NhItemType;
use crate::rib::evpn::EvpnRouteKey;
use crate::rib::route::AgentRoute;
use crate::rib::vrf::Vrf;
use crate::rib::vrftable::VrfTable;
use lpm::prefix::Prefix;
use std::net::IpAddr;

//////////////////////////////////////////////////////////////////
/// Find the route for (ip, plen) in a VRF. EVPN lookups target
/// the Type-5 key. Inet lookups use LPM as search primitive.
//////////////////////////////////////////////////////////////////
#[must_use]
pub fn find_route_in_vrf(vrf: &Vrf, ip: IpAddr, plen: u8, item_type: NhItemType) -> Option<&AgentRoute> {
    let query = Prefix::new(ip, plen).ok()?;
    let route = match item_type {
        NhItemType::Evpn => vrf.evpn().find(&EvpnRouteKey::type5(query))?,
        NhItemType::Inet => vrf.inet().find_lpm(&query)?,
    };
    (*route.prefix() == query && route.prefix().as_address() == ip).then_some(route)
}

/// Same as [`find_route_in_vrf`], for a VRF given by name
#[must_use]
pub fn find_route<'a>(
    vrftable: &'a VrfTable,
    vrf: &str,
    ip: IpAddr,
    plen: u8,
    item_type: NhItemType,
) -> Option<&'a AgentRoute> {
    let vrf = vrftable.get_vrf(vrf).ok()?;
    find_route_in_vrf(vrf, ip, plen, item_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nexthop::NextHop;
    use crate::peer::{Peer, PeerType};
    use crate::rib::path::{AgentPath, PathAttributes};
    use std::str::FromStr;

    fn build_test_vrftable() -> VrfTable {
        let mut vrftable = VrfTable::new();
        vrftable.add_vrf("red", None).unwrap();
        let vrf = vrftable.get_vrf_mut("red").unwrap();
        let path = AgentPath::new(
            Peer::new("p", PeerType::Bgp),
            NextHop::Discard,
            PathAttributes::default(),
        );
        vrf.inet
            .get_or_create(&Prefix::expect_from(("10.0.0.0", 16)))
            .add_path(path.clone());
        vrf.evpn
            .get_or_create(&EvpnRouteKey::type5(Prefix::expect_from(("10.2.0.0", 24))))
            .add_path(path);
        vrftable
    }

    fn ip(s: &str) -> IpAddr {
        IpAddr::from_str(s).unwrap()
    }

    #[test]
    fn test_inet_requires_exact_hit() {
        let vrftable = build_test_vrftable();
        let route = find_route(&vrftable, "red", ip("10.0.0.0"), 16, NhItemType::Inet)
            .expect("Should be an exact hit");
        assert_eq!(route.prefix().length(), 16);
        /* host bits in the query do not bind to the network */
        assert!(find_route(&vrftable, "red", ip("10.0.5.5"), 16, NhItemType::Inet).is_none());
        /* covered by 10.0/16 but not an exact hit */
        assert!(find_route(&vrftable, "red", ip("10.0.5.5"), 32, NhItemType::Inet).is_none());
        assert!(find_route(&vrftable, "red", ip("10.0.0.0"), 8, NhItemType::Inet).is_none());
        /* bad length, unknown vrf */
        assert!(find_route(&vrftable, "red", ip("10.0.0.0"), 33, NhItemType::Inet).is_none());
        assert!(find_route(&vrftable, "blue", ip("10.0.0.0"), 16, NhItemType::Inet).is_none());
    }

    #[test]
    fn test_evpn_is_exact_match() {
        let vrftable = build_test_vrftable();
        assert!(find_route(&vrftable, "red", ip("10.2.0.0"), 24, NhItemType::Evpn).is_some());
        assert!(find_route(&vrftable, "red", ip("10.2.0.1"), 32, NhItemType::Evpn).is_none());
        assert!(find_route(&vrftable, "red", ip("10.2.0.1"), 24, NhItemType::Evpn).is_none());
        /* tables are distinct */
        assert!(find_route(&vrftable, "red", ip("10.0.0.0"), 16, NhItemType::Evpn).is_none());
    }
}
