// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VRF module to store the Inet and EVPN route tables of a VRF

use crate::encapsulation::Vni;
use crate::rib::evpn::EvpnTable;
use crate::rib::inet::InetUnicastTable;

pub struct Vrf {
    pub name: String,
    pub(crate) vn: Option<String>,
    pub(crate) vni: Option<Vni>,
    pub(crate) inet: InetUnicastTable,
    pub(crate) evpn: EvpnTable,
}

impl Vrf {
    /////////////////////////////////////////////////////////////////////////
    /// Create a new VRF with the given name, with empty tables
    /////////////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            vn: None,
            vni: None,
            inet: InetUnicastTable::new(),
            evpn: EvpnTable::new(),
        }
    }

    /// The virtual network this VRF belongs to
    #[must_use]
    pub fn vn(&self) -> Option<&str> {
        self.vn.as_deref()
    }
    pub fn set_vn(&mut self, vn: Option<&str>) {
        self.vn = vn.map(str::to_owned);
    }
    #[must_use]
    pub fn vni(&self) -> Option<Vni> {
        self.vni
    }
    pub(crate) fn set_vni(&mut self, vni: Option<Vni>) {
        self.vni = vni;
    }
    #[must_use]
    pub fn inet(&self) -> &InetUnicastTable {
        &self.inet
    }
    #[must_use]
    pub fn evpn(&self) -> &EvpnTable {
        &self.evpn
    }
}
