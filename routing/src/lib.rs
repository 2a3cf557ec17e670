// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A library to implement VXLAN routing: keeping the routing VRF of each
//! logical router in sync with the bridge VRFs attached to it, and mirroring
//! routes between the EVPN and Inet tables of routing VRFs.

#![deny(clippy::all)]
#![allow(clippy::similar_names)]
#![allow(clippy::module_name_repetitions)]

pub mod bgpaas;
pub mod config;
mod display;
pub mod encapsulation;
mod errors;
pub mod interfaces;
pub mod nexthop;
pub mod peer;
pub mod rib;
pub mod routingdb;
pub mod vxlan;

// re-exports
pub use config::VxlanRoutingConfig;
pub use display::LogicalRouterMap;
pub use errors::RouterError;
pub use lpm::prefix;
pub use routingdb::RoutingDb;
pub use vxlan::manager::VxlanRoutingManager;
pub use vxlan::params::{AdvertiserParams, AdvertiserParamsBuilder};
