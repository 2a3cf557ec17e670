// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Vrf table module that stores multiple vrfs. Every vrf is uniquely identified by its name
//! and optionally identified by a Vni.

use crate::encapsulation::Vni;
use crate::errors::RouterError;
use crate::rib::vrf::Vrf;
use ahash::RandomState;
use std::collections::HashMap;

#[allow(unused)]
use tracing::{debug, error};

pub struct VrfTable {
    by_name: HashMap<String, Vrf, RandomState>,
    by_vni: HashMap<Vni, String, RandomState>,
}

#[allow(clippy::new_without_default)]
#[allow(clippy::len_without_is_empty)]
impl VrfTable {
    //////////////////////////////////////////////////////////////////
    /// Create an empty [`VrfTable`]
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: HashMap::with_hasher(RandomState::with_seed(0)),
            by_vni: HashMap::with_hasher(RandomState::with_seed(0)),
        }
    }

    //////////////////////////////////////////////////////////////////
    /// Create a new [`Vrf`] with some name and optional Vni.
    ///
    /// # Errors
    ///
    /// Fails if the name or the Vni are in use, or if the Vni is invalid
    //////////////////////////////////////////////////////////////////
    pub fn add_vrf(&mut self, name: &str, vni: Option<u32>) -> Result<(), RouterError> {
        let vni = vni.map(Vni::new_checked).transpose()?;

        if self.by_name.contains_key(name) {
            error!("Failed to add VRF {name}: a VRF with that name already exists");
            return Err(RouterError::VrfExists(name.to_owned()));
        }
        if let Some(vni) = vni {
            if let Some(other) = self.by_vni.get(&vni) {
                error!("Failed to add VRF {name}: Vni {vni} is already used by {other}");
                return Err(RouterError::Internal("Vni already in use"));
            }
            self.by_vni.insert(vni, name.to_owned());
        }

        let mut vrf = Vrf::new(name);
        vrf.set_vni(vni);
        self.by_name.insert(name.to_owned(), vrf);
        debug!("Successfully added VRF {name}");
        Ok(())
    }

    //////////////////////////////////////////////////////////////////
    /// Remove the vrf with the given name
    ///
    /// # Errors
    ///
    /// Fails if there is no such VRF
    //////////////////////////////////////////////////////////////////
    pub fn remove_vrf(&mut self, name: &str) -> Result<Vrf, RouterError> {
        debug!("Removing VRF {name}...");
        let Some(vrf) = self.by_name.remove(name) else {
            error!("No vrf with name {name} exists");
            return Err(RouterError::NoSuchVrf(name.to_owned()));
        };
        if let Some(vni) = vrf.vni() {
            debug!("Unregistering vni {vni}");
            self.by_vni.remove(&vni);
        }
        Ok(vrf)
    }

    //////////////////////////////////////////////////////////////////
    /// Associate a VRF with a virtual network, or clear the association
    ///
    /// # Errors
    ///
    /// Fails if there is no such VRF
    //////////////////////////////////////////////////////////////////
    pub fn set_vn(&mut self, name: &str, vn: Option<&str>) -> Result<(), RouterError> {
        self.get_vrf_mut(name)?.set_vn(vn);
        Ok(())
    }

    //////////////////////////////////////////////////////////////////
    /// Access a VRF by name
    ///
    /// # Errors
    ///
    /// Fails if there is no such VRF
    //////////////////////////////////////////////////////////////////
    pub fn get_vrf(&self, name: &str) -> Result<&Vrf, RouterError> {
        self.by_name
            .get(name)
            .ok_or_else(|| RouterError::NoSuchVrf(name.to_owned()))
    }

    //////////////////////////////////////////////////////////////////
    /// Access a VRF by name, mutably
    ///
    /// # Errors
    ///
    /// Fails if there is no such VRF
    //////////////////////////////////////////////////////////////////
    pub fn get_vrf_mut(&mut self, name: &str) -> Result<&mut Vrf, RouterError> {
        self.by_name
            .get_mut(name)
            .ok_or_else(|| RouterError::NoSuchVrf(name.to_owned()))
    }

    //////////////////////////////////////////////////////////////////
    /// Access a VRF by Vni
    ///
    /// # Errors
    ///
    /// Fails if the Vni is invalid or no VRF has it
    //////////////////////////////////////////////////////////////////
    pub fn get_vrf_by_vni(&self, vni: u32) -> Result<&Vrf, RouterError> {
        let vni = Vni::new_checked(vni)?;
        let name = self
            .by_vni
            .get(&vni)
            .ok_or_else(|| RouterError::NoSuchVrf(format!("vni {vni}")))?;
        self.get_vrf(name)
    }

    pub fn values(&self) -> impl Iterator<Item = &Vrf> {
        self.by_name.values()
    }
    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Vrf> {
        self.by_name.values_mut()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}
