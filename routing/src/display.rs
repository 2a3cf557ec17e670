// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Module that implements Display for routing objects

use crate::nexthop::{ComponentNhKey, NextHop, NextHopKey, TunnelNh};
use crate::rib::evpn::EvpnTable;
use crate::rib::inet::InetUnicastTable;
use crate::rib::path::AgentPath;
use crate::rib::route::AgentRoute;
use crate::vxlan::mapper::{RoutedVrfInfo, RoutedVrfMap};
use std::fmt::Display;

const LINE_WIDTH: usize = 81;

pub(crate) struct Heading(pub String);
impl Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = LINE_WIDTH.saturating_sub(self.0.len() + 2) / 2;
        write!(f, " {0:─<width$}", "─", width = len)?;
        write!(f, " {} ", self.0)?;
        writeln!(f, " {0:─<width$}", "─", width = len)
    }
}
pub(crate) fn line(f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, " {0:─<width$}", "─", width = LINE_WIDTH)
}

impl Display for TunnelNh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tunnel to {} dmac {} ({})", self.dip, self.rewrite_dmac, self.tunnel_type)
    }
}

impl Display for ComponentNhKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} label {}", self.key, self.label)
    }
}

impl Display for NextHopKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextHopKey::Interface { ifname, policy } => {
                write!(f, "interface {ifname}")?;
                if *policy {
                    write!(f, " (policy)")?;
                }
                Ok(())
            }
            NextHopKey::Composite { ctype, components } => {
                write!(f, "{ctype:?} composite [")?;
                for (n, component) in components.iter().enumerate() {
                    if n > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{component}")?;
                }
                write!(f, "]")
            }
            NextHopKey::Tunnel(tunnel) => tunnel.fmt(f),
            NextHopKey::Vrf(vrf) => write!(f, "vrf {vrf}"),
            NextHopKey::Receive => write!(f, "receive"),
            NextHopKey::Discard => write!(f, "discard"),
        }
    }
}

impl Display for NextHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextHop::Interface(nh) => write!(f, "interface {} label {}", nh.ifname, nh.label),
            NextHop::Composite(nh) => {
                write!(f, "{:?} composite [", nh.ctype)?;
                for (n, (key, component)) in nh.keys.iter().zip(nh.components.iter()).enumerate() {
                    if n > 0 {
                        write!(f, ", ")?;
                    }
                    match component {
                        Some(component) => write!(f, "{} label {}", component.nh, component.label)?,
                        None => write!(f, "{} (unresolved)", key.key)?,
                    }
                }
                write!(f, "]")
            }
            NextHop::Tunnel(tunnel) => tunnel.fmt(f),
            NextHop::Vrf(vrf) => write!(f, "vrf {vrf}"),
            NextHop::Receive => write!(f, "receive"),
            NextHop::Discard => write!(f, "discard"),
        }
    }
}

impl Display for AgentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let attrs = self.attrs();
        write!(f, "{} via {}", self.peer(), self.nexthop())?;
        if let Some(vni) = attrs.vxlan_id {
            write!(f, " vni {vni}")?;
        }
        if !attrs.dest_vn_list.is_empty() {
            write!(f, " vn {}", attrs.dest_vn_list.join(","))?;
        }
        if !attrs.sg_list.is_empty() {
            write!(f, " sg {:?}", attrs.sg_list)?;
        }
        if attrs.local_ecmp_sequence != 0 {
            write!(f, " ecmp-seq {}", attrs.local_ecmp_sequence)?;
        }
        write!(f, " seq {}", attrs.sequence)
    }
}

impl Display for AgentRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  {}", self.prefix())?;
        for (n, path) in self.paths().iter().enumerate() {
            let mark = if n == 0 { '*' } else { ' ' };
            writeln!(f, "     {mark} {path}")?;
        }
        Ok(())
    }
}

impl Display for EvpnTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Heading(format!("EVPN routes ({})", self.len())).fmt(f)?;
        for (key, route) in self.iter() {
            write!(f, "  [{}, tag {}]", key.mac, key.ethernet_tag)?;
            route.fmt(f)?;
        }
        line(f)
    }
}

impl Display for InetUnicastTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Heading(format!("Inet routes ({})", self.len())).fmt(f)?;
        for route in self.iter() {
            route.fmt(f)?;
        }
        line(f)
    }
}

impl Display for RoutedVrfInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "  routing vn : {} (vrf {})",
            self.routing_vn.as_deref().unwrap_or("--"),
            self.routing_vrf.as_deref().unwrap_or("--")
        )?;
        for (vn, vrf) in &self.bridge_vns {
            writeln!(f, "  bridge vn  : {vn} (vrf {vrf})")?;
        }
        writeln!(f, "  ecmp seq   : {}", self.local_ecmp_sequence)
    }
}

/// The whole logical router map
pub struct LogicalRouterMap<'a>(pub &'a dyn RoutedVrfMap);
impl Display for LogicalRouterMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lrs = self.0.logical_routers();
        Heading(format!("Logical routers ({})", lrs.len())).fmt(f)?;
        for lr in &lrs {
            if let Some(info) = self.0.lookup(lr) {
                writeln!(f, " {lr}")?;
                info.fmt(f)?;
            }
        }
        line(f)
    }
}
