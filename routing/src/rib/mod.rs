// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The route tables of the agent: VRFs with Inet and EVPN tables whose routes
//! hold one path per peer, and the queue through which they are changed.

pub mod evpn;
pub mod inet;
pub mod path;
pub mod request;
pub mod route;
pub mod vrf;
pub mod vrftable;

// re-exports
pub use evpn::{EvpnRouteKey, EvpnTable};
pub use inet::InetUnicastTable;
pub use path::{AgentPath, EcmpLoadBalance, PathAttributes, PathPreference};
pub use request::{
    EcmpRouteData, RouteKey, RouteNotification, RouteRequest, RouteRequestRx, RouteRequestTx,
    route_request_channel,
};
pub use route::AgentRoute;
pub use vrf::Vrf;
pub use vrftable::VrfTable;
