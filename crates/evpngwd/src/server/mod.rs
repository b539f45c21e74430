//! Resource lifecycle orchestration.
//!
//! [`Server`] composes validation, identity assignment, the resource stores,
//! pagination and the two backends. Every mutating request follows the same
//! sequence: validate, assign the name, probe the store, derive computed
//! fields, drive the kernel-link backend, then the routing daemon, and only
//! then commit to the store.
//!
//! Each resource kind has its own store behind its own async mutex, held for
//! the whole sequence so that two concurrent creates on one name cannot both
//! reach the backends. Nothing is rolled back: a backend failure is returned
//! as-is and any artifacts created by earlier steps stay in place.

mod bridge;
mod port;
mod vrf;

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::backend::{FrrAdapter, LinkAdapter};
use crate::pagination::PageTokens;
use crate::store::ResourceStore;
use crate::types::{
    BridgePort, LogicalBridge, Vrf, DEFAULT_LOCAL_AS, DEFAULT_TENANT_BRIDGE,
};

/// Site-wide values the server reports or realizes with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// AS number reported in VRF status and used for per-VRF BGP instances.
    pub local_as: u32,
    /// VLAN-aware bridge carrying all logical bridges.
    pub tenant_bridge: String,
    /// Default local VTEP address for VXLAN devices.
    pub vtep_ip: Option<IpAddr>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            local_as: DEFAULT_LOCAL_AS,
            tenant_bridge: DEFAULT_TENANT_BRIDGE.to_string(),
            vtep_ip: None,
        }
    }
}

/// The EVPN gateway lifecycle manager.
pub struct Server {
    vrfs: Mutex<ResourceStore<Vrf>>,
    bridges: Mutex<ResourceStore<LogicalBridge>>,
    ports: Mutex<ResourceStore<BridgePort>>,
    pagination: PageTokens,
    link: Arc<dyn LinkAdapter>,
    frr: Arc<dyn FrrAdapter>,
    settings: ServerSettings,
}

impl Server {
    pub fn new(
        link: Arc<dyn LinkAdapter>,
        frr: Arc<dyn FrrAdapter>,
        settings: ServerSettings,
    ) -> Self {
        Self {
            vrfs: Mutex::new(ResourceStore::new()),
            bridges: Mutex::new(ResourceStore::new()),
            ports: Mutex::new(ResourceStore::new()),
            pagination: PageTokens::new(),
            link,
            frr,
            settings,
        }
    }
}
