// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Route change requests. Requests are queued and applied in order by the
//! owner of the route tables. Every applied request that changes a route
//! yields a [`RouteNotification`].

use crate::nexthop::{ComponentNhKey, NextHopKey, TunnelNh};
use crate::peer::Peer;
use crate::rib::evpn::EvpnRouteKey;
use crate::rib::path::PathAttributes;
use lpm::prefix::Prefix;
use std::fmt::Display;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
#[allow(unused)]
use tracing::{debug, error};

/// Identifies a route in one of the tables of a VRF
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKey {
    Inet(Prefix),
    Evpn(EvpnRouteKey),
}

impl RouteKey {
    #[must_use]
    pub fn prefix(&self) -> &Prefix {
        match self {
            RouteKey::Inet(prefix) => prefix,
            RouteKey::Evpn(key) => &key.prefix,
        }
    }
}

impl Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteKey::Inet(prefix) => write!(f, "inet {prefix}"),
            RouteKey::Evpn(key) => write!(f, "evpn {}/{}/{}", key.mac, key.prefix, key.ethernet_tag),
        }
    }
}

/// Payload to install a composite path
#[derive(Debug, Clone, PartialEq)]
pub struct EcmpRouteData {
    pub composite: NextHopKey,
    pub attrs: PathAttributes,
    /// Members that the path currently installed for the same key lacks
    pub new_members: Vec<ComponentNhKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteRequest {
    AddLocalRoute {
        vrf: String,
        key: RouteKey,
        peer: Peer,
        nh: NextHopKey,
        attrs: PathAttributes,
    },
    AddRemoteEcmpRoute {
        vrf: String,
        key: RouteKey,
        peer: Peer,
        data: EcmpRouteData,
    },
    AddTunnelRoute {
        vrf: String,
        key: RouteKey,
        peer: Peer,
        tunnel: TunnelNh,
        attrs: PathAttributes,
    },
    DeletePath {
        vrf: String,
        key: RouteKey,
        peer: Peer,
    },
}

impl RouteRequest {
    #[must_use]
    pub fn vrf(&self) -> &str {
        match self {
            RouteRequest::AddLocalRoute { vrf, .. }
            | RouteRequest::AddRemoteEcmpRoute { vrf, .. }
            | RouteRequest::AddTunnelRoute { vrf, .. }
            | RouteRequest::DeletePath { vrf, .. } => vrf,
        }
    }
    #[must_use]
    pub fn key(&self) -> &RouteKey {
        match self {
            RouteRequest::AddLocalRoute { key, .. }
            | RouteRequest::AddRemoteEcmpRoute { key, .. }
            | RouteRequest::AddTunnelRoute { key, .. }
            | RouteRequest::DeletePath { key, .. } => key,
        }
    }
    #[must_use]
    pub fn peer(&self) -> &Peer {
        match self {
            RouteRequest::AddLocalRoute { peer, .. }
            | RouteRequest::AddRemoteEcmpRoute { peer, .. }
            | RouteRequest::AddTunnelRoute { peer, .. }
            | RouteRequest::DeletePath { peer, .. } => peer,
        }
    }
}

/// Emitted when a route changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNotification {
    pub vrf: String,
    pub key: RouteKey,
}

/// Sending side of the route request queue
#[derive(Clone)]
pub struct RouteRequestTx(UnboundedSender<RouteRequest>);

impl RouteRequestTx {
    /// Enqueue a request. This never blocks.
    pub fn send(&self, request: RouteRequest) {
        debug!(
            "Enqueuing request for {} in {} by {}",
            request.key(),
            request.vrf(),
            request.peer()
        );
        if let Err(e) = self.0.send(request) {
            error!("Failed to enqueue route request: queue is closed ({e})");
        }
    }
}

/// Receiving side of the route request queue
pub struct RouteRequestRx(UnboundedReceiver<RouteRequest>);

impl RouteRequestRx {
    /// Pop the oldest request, if any
    pub fn try_recv(&mut self) -> Option<RouteRequest> {
        match self.0.try_recv() {
            Ok(request) => Some(request),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                debug!("Route request queue has no senders left");
                None
            }
        }
    }
}

/// Create a route request queue
#[must_use]
pub fn route_request_channel() -> (RouteRequestTx, RouteRequestRx) {
    let (tx, rx) = unbounded_channel();
    (RouteRequestTx(tx), RouteRequestRx(rx))
}
