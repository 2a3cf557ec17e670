// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Parameters of the route advertiser and of single advertisements

use crate::encapsulation::{TunnelTypes, Vni};
use crate::nexthop::{NextHop, NhItemType};
use crate::peer::{Peer, PeerType};
use crate::rib::path::{AgentPath, EcmpLoadBalance, PathAttributes, PathPreference};
use derive_builder::Builder;
use mac_address::MacAddress;
use std::fmt::Display;
use std::net::IpAddr;

pub const DEFAULT_FABRIC_VRF: &str = "default-domain:default-project:ip-fabric:__default__";
pub const DEFAULT_INTERFACE_PEER: &str = "routing-vrf-interface-peer";
pub const DEFAULT_VXLAN_BGP_PEER: &str = "routing-vrf-vxlan-bgp-peer";

/// Struct to configure the route advertiser. N.B we derive a builder type
/// `AdvertiserParamsBuilder` and provide defaults for all fields but the router id.
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct AdvertiserParams {
    /// Address of this agent on the fabric. Peer next-hops with this
    /// address denote local destinations.
    pub router_id: IpAddr,

    /// VRF holding the fabric routes used to resolve router MACs
    #[builder(setter(into), default = DEFAULT_FABRIC_VRF.to_string())]
    pub fabric_vrf: String,

    /// Owner of the paths exported from bridge VRFs into routing VRFs
    #[builder(default = Peer::new(DEFAULT_INTERFACE_PEER, PeerType::LocalVmExport))]
    pub interface_peer: Peer,

    /// Owner of the paths leaked between the tables of a routing VRF
    #[builder(default = Peer::new(DEFAULT_VXLAN_BGP_PEER, PeerType::VxlanBgp))]
    pub vxlan_bgp_peer: Peer,
}

impl Display for AdvertiserParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        writeln!(f, "Route advertiser config")?;
        writeln!(f, "  router id     : {}", self.router_id)?;
        writeln!(f, "  fabric vrf    : {}", self.fabric_vrf)?;
        writeln!(f, "  interface peer: {}", self.interface_peer)?;
        writeln!(f, "  vxlan-bgp peer: {}", self.vxlan_bgp_peer)
    }
}

/// What one advertisement carries besides its next-hop. Built per call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteParameters {
    pub nh_addr: Option<IpAddr>,
    pub nh_mac: MacAddress,
    pub dest_vn_list: Vec<String>,
    pub sg_list: Vec<u32>,
    pub communities: Vec<String>,
    pub path_preference: PathPreference,
    pub ecmp_load_balance: EcmpLoadBalance,
    pub tag_list: Vec<u32>,
    pub sequence: u64,
    pub vxlan_id: Option<Vni>,
    pub policy_enabled: bool,
}

impl RouteParameters {
    //////////////////////////////////////////////////////////////////
    /// Clone the parameters of an existing path. For tunnel paths,
    /// the next-hop address and MAC are those of the tunnel.
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn from_path(path: &AgentPath) -> Self {
        let attrs = path.attrs();
        let (nh_addr, nh_mac) = match path.nexthop() {
            NextHop::Tunnel(t) => (Some(t.dip), t.rewrite_dmac),
            _ => (None, MacAddress::default()),
        };
        Self {
            nh_addr,
            nh_mac,
            dest_vn_list: attrs.dest_vn_list.clone(),
            sg_list: attrs.sg_list.clone(),
            communities: attrs.communities.clone(),
            path_preference: attrs.path_preference,
            ecmp_load_balance: attrs.ecmp_load_balance,
            tag_list: attrs.tag_list.clone(),
            sequence: attrs.sequence,
            vxlan_id: attrs.vxlan_id,
            policy_enabled: attrs.policy_enabled,
        }
    }

    #[must_use]
    pub fn with_dest_vns(mut self, dest_vn_list: Vec<String>) -> Self {
        self.dest_vn_list = dest_vn_list;
        self
    }

    #[must_use]
    pub fn with_vxlan_id(mut self, vxlan_id: Option<Vni>) -> Self {
        self.vxlan_id = vxlan_id;
        self
    }

    #[must_use]
    pub fn with_nexthop(mut self, address: IpAddr, mac: MacAddress) -> Self {
        self.nh_addr = Some(address);
        self.nh_mac = mac;
        self
    }

    /// Build path attributes for an advertisement with some encapsulation
    #[must_use]
    pub fn into_attributes(self, tunnel_type: TunnelTypes) -> PathAttributes {
        PathAttributes {
            dest_vn_list: self.dest_vn_list,
            sg_list: self.sg_list,
            communities: self.communities,
            tag_list: self.tag_list,
            path_preference: self.path_preference,
            ecmp_load_balance: self.ecmp_load_balance,
            sequence: self.sequence,
            vxlan_id: self.vxlan_id,
            tunnel_type,
            policy_enabled: self.policy_enabled,
            local_ecmp_sequence: 0,
        }
    }
}

/// A next-hop of a route item delivered by a peer
#[derive(Debug, Clone, PartialEq)]
pub struct PeerNexthop {
    pub address: IpAddr,
    /// MPLS label, or VNI for VXLAN
    pub label: u32,
    pub tunnel_types: TunnelTypes,
    pub mac: MacAddress,
}

/// A route item delivered by a peer
#[derive(Debug, Clone, PartialEq)]
pub struct PeerRouteItem {
    pub item_type: NhItemType,
    pub nexthops: Vec<PeerNexthop>,
    /// Prefix strings of the local routes that back a local next-hop
    pub peer_sources: Vec<String>,
    pub params: RouteParameters,
}
