// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Network interface model

use crate::encapsulation::MplsLabel;
use mac_address::MacAddress;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Clone, Debug, PartialEq)]
/// Specific data for VM interfaces
pub struct IfDataVm {
    pub mac: MacAddress,
    pub primary_ipv4: Option<Ipv4Addr>,
    pub primary_ipv6: Option<Ipv6Addr>,
    /// The VN the interface belongs to
    pub vn: Option<String>,
}

/// Type that contains data specific to the type of interface
#[derive(Clone, Debug, PartialEq)]
pub enum IfType {
    VmInterface(IfDataVm),
    Physical,
    Inet,
}

#[derive(Clone, Debug, PartialEq)]
/// An interface known to the agent
pub struct Interface {
    pub name: String,
    pub iftype: IfType,
    /// Label local routes via this interface are advertised with
    pub label: MplsLabel,
}

impl Interface {
    //////////////////////////////////////////////////////////////////
    /// Create an [`Interface`] of some type
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn new(name: &str, iftype: IfType, label: MplsLabel) -> Self {
        Self {
            name: name.to_owned(),
            iftype,
            label,
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Create a VM interface
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn new_vm(name: &str, label: MplsLabel, mac: MacAddress, vn: Option<&str>) -> Self {
        let data = IfDataVm {
            mac,
            primary_ipv4: None,
            primary_ipv6: None,
            vn: vn.map(str::to_owned),
        };
        Self::new(name, IfType::VmInterface(data), label)
    }

    /// Set the primary address of a VM interface, for the family of the address.
    /// This is a no-op for other kinds of interfaces.
    pub fn set_primary_address(&mut self, address: IpAddr) {
        if let IfType::VmInterface(data) = &mut self.iftype {
            match address {
                IpAddr::V4(a) => data.primary_ipv4 = Some(a),
                IpAddr::V6(a) => data.primary_ipv6 = Some(a),
            }
        }
    }

    #[must_use]
    pub fn with_primary_address(mut self, address: IpAddr) -> Self {
        self.set_primary_address(address);
        self
    }

    #[must_use]
    pub fn is_vm_interface(&self) -> bool {
        matches!(self.iftype, IfType::VmInterface(_))
    }

    #[must_use]
    pub fn vm_data(&self) -> Option<&IfDataVm> {
        match &self.iftype {
            IfType::VmInterface(data) => Some(data),
            _ => None,
        }
    }

    /// The primary addresses of a VM interface, IPv4 first
    pub fn primary_addresses(&self) -> impl Iterator<Item = IpAddr> {
        let data = self.vm_data();
        let v4 = data.and_then(|d| d.primary_ipv4).map(IpAddr::V4);
        let v6 = data.and_then(|d| d.primary_ipv6).map(IpAddr::V6);
        v4.into_iter().chain(v6)
    }

    #[must_use]
    pub fn mac(&self) -> Option<MacAddress> {
        self.vm_data().map(|d| d.mac)
    }
}
