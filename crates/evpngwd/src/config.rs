//! Configuration file support for evpngwd
//!
//! Loads gateway configuration from TOML. Default location:
//! /etc/evpngwd/evpngwd.toml. Command-line flags override file values.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use evpn_gw_common::{GwError, GwResult};
use serde::{Deserialize, Serialize};

use crate::server::ServerSettings;
use crate::types::{DEFAULT_LOCAL_AS, DEFAULT_TENANT_BRIDGE, IFNAME_MAX_LEN};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/evpngwd/evpngwd.toml";

/// API listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Address the HTTP API binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

/// EVPN fabric configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvpnConfig {
    /// Local AS for per-VRF BGP instances
    #[serde(default = "default_local_as")]
    pub local_as: u32,

    /// VLAN-aware bridge carrying all logical bridges
    #[serde(default = "default_tenant_bridge")]
    pub tenant_bridge: String,

    /// Local VTEP address for VXLAN devices
    #[serde(default)]
    pub vtep_ip: Option<IpAddr>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `evpngwd=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

/// Complete evpngwd configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub evpn: EvpnConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_local_as() -> u32 {
    DEFAULT_LOCAL_AS
}

fn default_tenant_bridge() -> String {
    DEFAULT_TENANT_BRIDGE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for EvpnConfig {
    fn default() -> Self {
        Self {
            local_as: default_local_as(),
            tenant_bridge: default_tenant_bridge(),
            vtep_ip: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl GatewayConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> GwResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| GwError::config("config file", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> GwResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| GwError::config(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> GwResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> GwResult<()> {
        if self.evpn.local_as == 0 {
            return Err(GwError::config("evpn.local_as", "must be > 0"));
        }
        let bridge = &self.evpn.tenant_bridge;
        if bridge.is_empty() || bridge.len() > IFNAME_MAX_LEN || bridge.contains(['/', ' ']) {
            return Err(GwError::config(
                "evpn.tenant_bridge",
                format!("{:?} is not a valid interface name", bridge),
            ));
        }
        Ok(())
    }

    /// Server settings derived from this configuration
    pub fn settings(&self) -> ServerSettings {
        ServerSettings {
            local_as: self.evpn.local_as,
            tenant_bridge: self.evpn.tenant_bridge.clone(),
            vtep_ip: self.evpn.vtep_ip,
        }
    }
}
