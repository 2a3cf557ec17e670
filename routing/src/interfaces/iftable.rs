// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A table of interfaces

use crate::errors::RouterError;
use crate::interfaces::interface::Interface;
use ahash::RandomState;
use std::collections::HashMap;

#[allow(unused)]
use tracing::{debug, error};

#[derive(Clone)]
/// A table of network interface objects, keyed by name
pub struct IfTable {
    by_name: HashMap<String, Interface, RandomState>,
}

#[allow(clippy::new_without_default)]
impl IfTable {
    //////////////////////////////////////////////////////////////////
    /// Create an interface table. All interfaces should live here.
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: HashMap::with_hasher(RandomState::with_seed(0)),
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    //////////////////////////////////////////////////////////////////
    /// Add an [`Interface`] to the table
    ///
    /// # Errors
    ///
    /// Fails if an interface with the same name exists
    //////////////////////////////////////////////////////////////////
    pub fn add_interface(&mut self, iface: Interface) -> Result<(), RouterError> {
        if self.contains(&iface.name) {
            error!("Failed to add interface {}: already exists!", iface.name);
            return Err(RouterError::InterfaceExists(iface.name));
        }
        debug!("Added interface {} to the interface table", iface.name);
        self.by_name.insert(iface.name.clone(), iface);
        Ok(())
    }

    //////////////////////////////////////////////////////////////////
    /// Replace the [`Interface`] with the same name
    ///
    /// # Errors
    ///
    /// Fails if the interface does not exist
    //////////////////////////////////////////////////////////////////
    pub fn mod_interface(&mut self, iface: Interface) -> Result<(), RouterError> {
        let Some(existing) = self.by_name.get_mut(&iface.name) else {
            error!("Failed to modify interface {}: not found", iface.name);
            return Err(RouterError::NoSuchInterface(iface.name));
        };
        *existing = iface;
        debug!("Modified interface {}", existing.name);
        Ok(())
    }

    //////////////////////////////////////////////////////////////////
    /// Remove an interface from the table
    //////////////////////////////////////////////////////////////////
    pub fn del_interface(&mut self, name: &str) -> Option<Interface> {
        let iface = self.by_name.remove(name);
        if iface.is_some() {
            debug!("Deleted interface '{name}'");
        }
        iface
    }

    //////////////////////////////////////////////////////////////////
    /// Get an immutable reference to an [`Interface`]
    //////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn get_interface(&self, name: &str) -> Option<&Interface> {
        self.by_name.get(name)
    }
}
