// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Route owners. Every path in a route table belongs to exactly one peer.

use std::fmt::Display;

/// Kinds of peers, ordered by path preference: paths of a lower kind win
/// the active-path selection in a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeerType {
    /// Routes for locally attached VM ports
    LocalVmPort,
    /// Routes exported by the agent into routing VRFs
    LocalVmExport,
    /// Other locally originated routes
    Local,
    /// Routes learnt from a control-node (XMPP) peer
    Bgp,
    /// Routes leaked between the EVPN and Inet tables of a routing VRF
    VxlanBgp,
    /// Fabric routes
    Fabric,
}

impl PeerType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerType::LocalVmPort => "local-vm-port",
            PeerType::LocalVmExport => "local-vm-export",
            PeerType::Local => "local",
            PeerType::Bgp => "bgp",
            PeerType::VxlanBgp => "vxlan-bgp",
            PeerType::Fabric => "fabric",
        }
    }
}

/// A route owner. Peers are compared by name and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Peer {
    name: String,
    ptype: PeerType,
}

impl Peer {
    #[must_use]
    pub fn new(name: &str, ptype: PeerType) -> Self {
        Self {
            name: name.to_owned(),
            ptype,
        }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[must_use]
    pub fn ptype(&self) -> PeerType {
        self.ptype
    }
    #[must_use]
    pub fn is_bgp(&self) -> bool {
        self.ptype == PeerType::Bgp
    }
}

impl Display for PeerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.ptype)
    }
}
