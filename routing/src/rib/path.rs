// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Paths of a route and the attributes they carry

use crate::encapsulation::{TunnelTypes, Vni};
use crate::nexthop::NextHop;
use crate::peer::Peer;
use bitflags::bitflags;

bitflags! {
    /// Packet fields that feed the ECMP hash
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EcmpLoadBalance: u8 {
        const SOURCE_IP        = 0b0_0001;
        const DESTINATION_IP   = 0b0_0010;
        const IP_PROTOCOL      = 0b0_0100;
        const SOURCE_PORT      = 0b0_1000;
        const DESTINATION_PORT = 0b1_0000;
    }
}

impl EcmpLoadBalance {
    /// The classic 5-tuple
    #[must_use]
    pub fn five_tuple() -> Self {
        EcmpLoadBalance::all()
    }
}

/// Path preference, as signaled by peers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathPreference {
    pub sequence: u32,
    pub preference: u32,
    pub ecmp: bool,
}

impl PathPreference {
    #[must_use]
    pub fn new(sequence: u32, preference: u32, ecmp: bool) -> Self {
        Self {
            sequence,
            preference,
            ecmp,
        }
    }
}

/// Everything a path carries besides its owner and next-hop
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathAttributes {
    pub dest_vn_list: Vec<String>,
    pub sg_list: Vec<u32>,
    pub communities: Vec<String>,
    pub tag_list: Vec<u32>,
    pub path_preference: PathPreference,
    pub ecmp_load_balance: EcmpLoadBalance,
    pub sequence: u64,
    pub vxlan_id: Option<Vni>,
    pub tunnel_type: TunnelTypes,
    pub policy_enabled: bool,
    /// Stamped on local ECMP composites when their member set changes
    pub local_ecmp_sequence: u64,
}

impl PathAttributes {
    /// Compare with another set of attributes, ignoring the local ECMP sequence
    #[must_use]
    pub fn same_as(&self, other: &PathAttributes) -> bool {
        let mut other = other.clone();
        other.local_ecmp_sequence = self.local_ecmp_sequence;
        *self == other
    }
}

/// A path of a route, owned by one peer
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPath {
    peer: Peer,
    nexthop: NextHop,
    attrs: PathAttributes,
}

impl AgentPath {
    #[must_use]
    pub fn new(peer: Peer, nexthop: NextHop, attrs: PathAttributes) -> Self {
        Self {
            peer,
            nexthop,
            attrs,
        }
    }
    #[must_use]
    pub fn peer(&self) -> &Peer {
        &self.peer
    }
    #[must_use]
    pub fn nexthop(&self) -> &NextHop {
        &self.nexthop
    }
    #[must_use]
    pub fn attrs(&self) -> &PathAttributes {
        &self.attrs
    }
    pub(crate) fn set_nexthop(&mut self, nexthop: NextHop) {
        self.nexthop = nexthop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_as_ignores_local_ecmp_sequence() {
        let a = PathAttributes {
            dest_vn_list: vec!["vn-red".to_owned()],
            local_ecmp_sequence: 1,
            ..Default::default()
        };
        let mut b = a.clone();
        b.local_ecmp_sequence = 7;
        assert!(a.same_as(&b));
        assert_ne!(a, b);
        b.sg_list.push(8000001);
        assert!(!a.same_as(&b));
    }
}
