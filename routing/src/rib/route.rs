// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Routes: a prefix and the paths to it, at most one per peer

use crate::peer::{Peer, PeerType};
use crate::rib::path::AgentPath;
use lpm::prefix::Prefix;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentRoute {
    prefix: Prefix,
    /// Sorted by preference: the first path is the active one
    paths: Vec<AgentPath>,
}

impl AgentRoute {
    #[must_use]
    pub fn new(prefix: Prefix) -> Self {
        Self {
            prefix,
            paths: Vec::with_capacity(1),
        }
    }
    #[must_use]
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }
    #[must_use]
    pub fn paths(&self) -> &[AgentPath] {
        &self.paths
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The best path of the route
    #[must_use]
    pub fn active_path(&self) -> Option<&AgentPath> {
        self.paths.first()
    }

    #[must_use]
    pub fn find_path(&self, peer: &Peer) -> Option<&AgentPath> {
        self.paths.iter().find(|p| p.peer() == peer)
    }

    /// The best path owned by a peer of some type
    #[must_use]
    pub fn find_path_by_type(&self, ptype: PeerType) -> Option<&AgentPath> {
        self.paths.iter().find(|p| p.peer().ptype() == ptype)
    }

    pub(crate) fn paths_mut(&mut self) -> impl Iterator<Item = &mut AgentPath> {
        self.paths.iter_mut()
    }

    //////////////////////////////////////////////////////////////////
    /// Add a path, replacing the one of the same peer if any.
    /// Returns true if the route changed.
    //////////////////////////////////////////////////////////////////
    pub fn add_path(&mut self, path: AgentPath) -> bool {
        if let Some(existing) = self.paths.iter_mut().find(|p| p.peer() == path.peer()) {
            if *existing == path {
                return false;
            }
            *existing = path;
        } else {
            self.paths.push(path);
        }
        self.sort_paths();
        true
    }

    //////////////////////////////////////////////////////////////////
    /// Remove the path of a peer
    //////////////////////////////////////////////////////////////////
    pub fn remove_path(&mut self, peer: &Peer) -> Option<AgentPath> {
        let index = self.paths.iter().position(|p| p.peer() == peer)?;
        Some(self.paths.remove(index))
    }

    fn sort_paths(&mut self) {
        self.paths.sort_by(|a, b| {
            a.peer()
                .ptype()
                .cmp(&b.peer().ptype())
                .then(
                    b.attrs()
                        .path_preference
                        .preference
                        .cmp(&a.attrs().path_preference.preference),
                )
                .then(a.peer().name().cmp(b.peer().name()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nexthop::NextHop;
    use crate::rib::path::{PathAttributes, PathPreference};

    fn path(peer: &Peer, preference: u32) -> AgentPath {
        let attrs = PathAttributes {
            path_preference: PathPreference::new(0, preference, false),
            ..Default::default()
        };
        AgentPath::new(peer.clone(), NextHop::Discard, attrs)
    }

    #[test]
    fn test_path_selection() {
        let bgp1 = Peer::new("controller-1", PeerType::Bgp);
        let bgp2 = Peer::new("controller-2", PeerType::Bgp);
        let export = Peer::new("export", PeerType::LocalVmExport);

        let mut route = AgentRoute::new(Prefix::expect_from(("10.0.0.0", 24)));
        assert!(route.add_path(path(&bgp1, 100)));
        assert!(route.add_path(path(&bgp2, 200)));
        assert_eq!(route.active_path().unwrap().peer(), &bgp2);

        assert!(route.add_path(path(&export, 0)));
        assert_eq!(route.active_path().unwrap().peer(), &export);
        assert_eq!(route.paths().len(), 3);

        /* same path again: no change */
        assert!(!route.add_path(path(&bgp1, 100)));
        /* replacement keeps one path per peer */
        assert!(route.add_path(path(&bgp1, 300)));
        assert_eq!(route.paths().len(), 3);
        assert_eq!(route.find_path_by_type(PeerType::Bgp).unwrap().peer(), &bgp1);

        assert!(route.remove_path(&export).is_some());
        assert!(route.remove_path(&export).is_none());
        assert_eq!(route.active_path().unwrap().peer(), &bgp1);
    }
}
