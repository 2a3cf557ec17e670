// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Objects to model packet encapsulations: VXLAN network identifiers,
//! MPLS labels and the tunnel types a next-hop may use.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::NonZero;

/// An MPLS label. For VXLAN tunnels the label field carries the VNI.
pub type MplsLabel = u32;

/// Label value for paths that carry no label
pub const INVALID_LABEL: MplsLabel = u32::MAX;

/// A VXLAN Network Identifier: 24 bits, zero is reserved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(transparent)]
pub struct Vni(NonZero<u32>);

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidVni {
    #[error("Zero is not a legal Vni")]
    ReservedZero,
    #[error("The value {0} is too large to be a Vni (max is {MAX})", MAX = Vni::MAX)]
    TooLarge(u32),
}

impl Vni {
    pub const MAX: u32 = 0x00_FF_FF_FF;

    /// Build a [`Vni`]
    ///
    /// # Errors
    /// Fails if the value is zero or does not fit in 24 bits.
    pub fn new_checked(vni: u32) -> Result<Vni, InvalidVni> {
        match NonZero::<u32>::new(vni) {
            None => Err(InvalidVni::ReservedZero),
            _ if vni > Vni::MAX => Err(InvalidVni::TooLarge(vni)),
            Some(vni) => Ok(Vni(vni)),
        }
    }

    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0.get()
    }
}

impl Display for Vni {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.get())
    }
}

impl From<Vni> for u32 {
    fn from(vni: Vni) -> u32 {
        vni.as_u32()
    }
}

impl TryFrom<u32> for Vni {
    type Error = InvalidVni;

    fn try_from(vni: u32) -> Result<Vni, Self::Error> {
        Vni::new_checked(vni)
    }
}

bitflags! {
    /// Tunnel encapsulations. A tunnel next-hop uses exactly one; peers may
    /// advertise a set of them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct TunnelTypes: u8 {
        const MPLS_GRE = 0b001;
        const MPLS_UDP = 0b010;
        const VXLAN    = 0b100;
    }
}

impl TunnelTypes {
    /// Pick the encapsulation to use out of an advertised set. VXLAN wins.
    #[must_use]
    pub fn preferred(self) -> TunnelTypes {
        [TunnelTypes::VXLAN, TunnelTypes::MPLS_UDP, TunnelTypes::MPLS_GRE]
            .into_iter()
            .find(|t| self.contains(*t))
            .unwrap_or(TunnelTypes::empty())
    }
}

impl Display for TunnelTypes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        write!(f, "{}", names.join("|"))
    }
}
