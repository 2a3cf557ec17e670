// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration of VXLAN routing, as loaded from YAML

use crate::errors::RouterError;
use crate::peer::{Peer, PeerType};
use crate::vxlan::params::{AdvertiserParams, AdvertiserParamsBuilder};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
#[allow(unused)]
use tracing::{debug, error};

/// VXLAN routing configuration. Everything but the router id is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VxlanRoutingConfig {
    pub router_id: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_vrf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_peer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vxlan_bgp_peer_name: Option<String>,
}

impl VxlanRoutingConfig {
    /// Parse a configuration from YAML
    ///
    /// # Errors
    ///
    /// Fails if the YAML is malformed or does not describe a configuration
    pub fn from_yaml(yaml: &str) -> Result<Self, RouterError> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            error!("Failed to parse vxlan routing config: {e}");
            RouterError::InvalidConfig(e.to_string())
        })
    }
}

fn non_empty<'a>(what: &str, value: &'a str) -> Result<&'a str, RouterError> {
    if value.trim().is_empty() {
        error!("Invalid vxlan routing config: empty {what}");
        return Err(RouterError::InvalidConfig(format!("empty {what}")));
    }
    Ok(value)
}

impl TryFrom<&VxlanRoutingConfig> for AdvertiserParams {
    type Error = RouterError;

    fn try_from(config: &VxlanRoutingConfig) -> Result<Self, Self::Error> {
        if config.router_id.is_unspecified() || config.router_id.is_multicast() {
            error!("Invalid vxlan routing config: bad router id {}", config.router_id);
            return Err(RouterError::InvalidConfig(format!(
                "bad router id {}",
                config.router_id
            )));
        }
        let mut builder = AdvertiserParamsBuilder::default();
        builder.router_id(config.router_id);
        if let Some(vrf) = &config.fabric_vrf {
            builder.fabric_vrf(non_empty("fabric vrf", vrf)?);
        }
        if let Some(name) = &config.interface_peer_name {
            let name = non_empty("interface peer name", name)?;
            builder.interface_peer(Peer::new(name, PeerType::LocalVmExport));
        }
        if let Some(name) = &config.vxlan_bgp_peer_name {
            let name = non_empty("vxlan-bgp peer name", name)?;
            builder.vxlan_bgp_peer(Peer::new(name, PeerType::VxlanBgp));
        }
        let params = builder
            .build()
            .map_err(|e| RouterError::InvalidConfig(e.to_string()))?;
        if params.interface_peer.name() == params.vxlan_bgp_peer.name() {
            error!(
                "Invalid vxlan routing config: both peers are named {}",
                params.interface_peer.name()
            );
            return Err(RouterError::InvalidConfig(
                "interface and vxlan-bgp peers must have distinct names".to_string(),
            ));
        }
        debug!("Built route advertiser params from config:\n{params}");
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vxlan::params::{DEFAULT_FABRIC_VRF, DEFAULT_INTERFACE_PEER};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use tracing_test::traced_test;

    #[test]
    fn test_minimal_config() {
        let config = VxlanRoutingConfig::from_yaml("router_id: 10.100.0.1\n").expect("Should parse");
        let params = AdvertiserParams::try_from(&config).expect("Should be valid");
        assert_eq!(params.router_id, IpAddr::from_str("10.100.0.1").unwrap());
        assert_eq!(params.fabric_vrf, DEFAULT_FABRIC_VRF);
        assert_eq!(params.interface_peer.name(), DEFAULT_INTERFACE_PEER);
    }

    #[test]
    fn test_full_config() {
        let yaml = r"
router_id: fd00::1
fabric_vrf: underlay
interface_peer_name: export-peer
vxlan_bgp_peer_name: leak-peer
";
        let config = VxlanRoutingConfig::from_yaml(yaml).expect("Should parse");
        let params = AdvertiserParams::try_from(&config).expect("Should be valid");
        assert_eq!(params.fabric_vrf, "underlay");
        assert_eq!(params.interface_peer, Peer::new("export-peer", PeerType::LocalVmExport));
        assert_eq!(params.vxlan_bgp_peer, Peer::new("leak-peer", PeerType::VxlanBgp));

        let yaml = serde_yaml_ng::to_string(&config).expect("Should serialize");
        assert_eq!(VxlanRoutingConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[traced_test]
    #[test]
    fn test_bad_configs() {
        assert!(VxlanRoutingConfig::from_yaml("fabric_vrf: x\n").is_err());
        assert!(VxlanRoutingConfig::from_yaml("router_id: 10.0.0.1\ncolor: blue\n").is_err());
        assert!(logs_contain("Failed to parse vxlan routing config"));

        let config = VxlanRoutingConfig::from_yaml("router_id: 0.0.0.0\n").unwrap();
        assert!(AdvertiserParams::try_from(&config).is_err());

        let yaml = "router_id: 10.0.0.1\ninterface_peer_name: same\nvxlan_bgp_peer_name: same\n";
        let config = VxlanRoutingConfig::from_yaml(yaml).unwrap();
        assert!(matches!(
            AdvertiserParams::try_from(&config),
            Err(RouterError::InvalidConfig(_))
        ));
        assert!(logs_contain("both peers are named same"));

        let config = VxlanRoutingConfig::from_yaml("router_id: 10.0.0.1\nfabric_vrf: ''\n").unwrap();
        assert!(AdvertiserParams::try_from(&config).is_err());
        assert!(logs_contain("empty fabric vrf"));
    }
}
