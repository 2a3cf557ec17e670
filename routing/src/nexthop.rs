// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Next-hop objects. Requests carry [`NextHopKey`]s, which route tables
//! resolve into [`NextHop`]s when a path is installed. Resolution of a
//! composite may leave holes: a component whose interface is unknown is
//! kept as `None` next to its key, so that it can be resolved later.

use crate::encapsulation::{MplsLabel, TunnelTypes};
use mac_address::MacAddress;
use std::net::IpAddr;

/// Kinds of next-hops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextHopType {
    Interface,
    Composite,
    Tunnel,
    Vrf,
    Receive,
    Discard,
}

/// Kinds of composite next-hops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompositeType {
    /// ECMP over local interfaces only
    LocalEcmp,
    /// ECMP over local interfaces and remote tunnels
    Ecmp,
}

/// The kind of table a peer route item is destined to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NhItemType {
    Evpn,
    Inet,
}

/// A tunnel next-hop. It needs no resolution: its key is its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TunnelNh {
    pub dip: IpAddr,
    pub rewrite_dmac: MacAddress,
    pub tunnel_type: TunnelTypes,
}

impl TunnelNh {
    #[must_use]
    pub fn new(dip: IpAddr, rewrite_dmac: MacAddress, tunnel_type: TunnelTypes) -> Self {
        Self {
            dip,
            rewrite_dmac,
            tunnel_type,
        }
    }
}

/// A component of a composite next-hop key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentNhKey {
    pub label: MplsLabel,
    pub key: NextHopKey,
}

impl ComponentNhKey {
    #[must_use]
    pub fn new(label: MplsLabel, key: NextHopKey) -> Self {
        Self { label, key }
    }
}

/// Identity of a next-hop
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NextHopKey {
    Interface {
        ifname: String,
        policy: bool,
    },
    Composite {
        ctype: CompositeType,
        components: Vec<ComponentNhKey>,
    },
    Tunnel(TunnelNh),
    Vrf(String),
    Receive,
    Discard,
}

impl NextHopKey {
    #[must_use]
    pub fn interface(ifname: &str, policy: bool) -> Self {
        NextHopKey::Interface {
            ifname: ifname.to_owned(),
            policy,
        }
    }
    #[must_use]
    pub fn nh_type(&self) -> NextHopType {
        match self {
            NextHopKey::Interface { .. } => NextHopType::Interface,
            NextHopKey::Composite { .. } => NextHopType::Composite,
            NextHopKey::Tunnel(_) => NextHopType::Tunnel,
            NextHopKey::Vrf(_) => NextHopType::Vrf,
            NextHopKey::Receive => NextHopType::Receive,
            NextHopKey::Discard => NextHopType::Discard,
        }
    }

    /// Tell if this key, or any of its components, names an interface
    #[must_use]
    pub fn references_interface(&self, ifname: &str) -> bool {
        match self {
            NextHopKey::Interface { ifname: name, .. } => name == ifname,
            NextHopKey::Composite { components, .. } => components
                .iter()
                .any(|c| c.key.references_interface(ifname)),
            _ => false,
        }
    }
}

/// A resolved interface next-hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceNh {
    pub ifname: String,
    pub label: MplsLabel,
    pub policy: bool,
}

/// A resolved component of a composite next-hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNh {
    pub label: MplsLabel,
    pub nh: NextHop,
}

/// A resolved composite next-hop. `components` is aligned with `keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeNh {
    pub ctype: CompositeType,
    pub keys: Vec<ComponentNhKey>,
    pub components: Vec<Option<ComponentNh>>,
}

impl CompositeNh {
    /// Components that resolved
    pub fn live_components(&self) -> impl Iterator<Item = &ComponentNh> {
        self.components.iter().flatten()
    }
}

/// A resolved next-hop, as held by installed paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextHop {
    Interface(InterfaceNh),
    Composite(CompositeNh),
    Tunnel(TunnelNh),
    Vrf(String),
    Receive,
    Discard,
}

impl NextHop {
    #[must_use]
    pub fn nh_type(&self) -> NextHopType {
        match self {
            NextHop::Interface(_) => NextHopType::Interface,
            NextHop::Composite(_) => NextHopType::Composite,
            NextHop::Tunnel(_) => NextHopType::Tunnel,
            NextHop::Vrf(_) => NextHopType::Vrf,
            NextHop::Receive => NextHopType::Receive,
            NextHop::Discard => NextHopType::Discard,
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Rebuild the key a next-hop was resolved from. For composites,
    /// this includes the components that did not resolve.
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn key(&self) -> NextHopKey {
        match self {
            NextHop::Interface(nh) => NextHopKey::interface(&nh.ifname, nh.policy),
            NextHop::Composite(c) => NextHopKey::Composite {
                ctype: c.ctype,
                components: c.keys.clone(),
            },
            NextHop::Tunnel(t) => NextHopKey::Tunnel(t.clone()),
            NextHop::Vrf(vrf) => NextHopKey::Vrf(vrf.clone()),
            NextHop::Receive => NextHopKey::Receive,
            NextHop::Discard => NextHopKey::Discard,
        }
    }

    #[must_use]
    pub fn as_interface(&self) -> Option<&InterfaceNh> {
        match self {
            NextHop::Interface(nh) => Some(nh),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_composite(&self) -> Option<&CompositeNh> {
        match self {
            NextHop::Composite(nh) => Some(nh),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_tunnel(&self) -> Option<&TunnelNh> {
        match self {
            NextHop::Tunnel(nh) => Some(nh),
            _ => None,
        }
    }

    /// Tell if this next-hop, or any of its components, uses an interface
    #[must_use]
    pub fn references_interface(&self, ifname: &str) -> bool {
        match self {
            NextHop::Interface(nh) => nh.ifname == ifname,
            NextHop::Composite(c) => c.keys.iter().any(|k| k.key.references_interface(ifname)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_composite_key_keeps_holes() {
        let tunnel = TunnelNh::new(
            IpAddr::from_str("10.0.0.2").unwrap(),
            MacAddress::default(),
            TunnelTypes::VXLAN,
        );
        let keys = vec![
            ComponentNhKey::new(17, NextHopKey::interface("tap9", false)),
            ComponentNhKey::new(100, NextHopKey::interface("tap1", false)),
            ComponentNhKey::new(5001, NextHopKey::Tunnel(tunnel.clone())),
        ];
        let composite = NextHop::Composite(CompositeNh {
            ctype: CompositeType::Ecmp,
            keys: keys.clone(),
            components: vec![
                None,
                Some(ComponentNh {
                    label: 100,
                    nh: NextHop::Interface(InterfaceNh {
                        ifname: "tap1".to_owned(),
                        label: 20,
                        policy: false,
                    }),
                }),
                Some(ComponentNh {
                    label: 5001,
                    nh: NextHop::Tunnel(tunnel.clone()),
                }),
            ],
        });
        let expected = NextHopKey::Composite {
            ctype: CompositeType::Ecmp,
            components: keys,
        };
        assert_eq!(composite.key(), expected);
        assert!(composite.references_interface("tap1"));
        assert!(composite.references_interface("tap9"));
        assert!(!composite.references_interface("tap2"));
        assert_eq!(composite.as_composite().unwrap().live_components().count(), 2);
    }
}
