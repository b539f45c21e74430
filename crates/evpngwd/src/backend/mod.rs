//! Backend adapters driven by the lifecycle manager.
//!
//! Two heterogeneous backends realize every resource:
//!
//! - [`LinkAdapter`]: kernel network links (VRF devices, bridges, VXLAN
//!   devices, ports), bridge VLAN membership and addresses
//! - [`FrrAdapter`]: routing-daemon configuration for VRFs
//!
//! Both are treated as synchronous, fallible operations from the server's
//! point of view: one call either fully succeeds or returns an error, and
//! no retries happen at this layer.
//!
//! Production implementations live in [`iproute`] and [`vtysh`].

pub mod iproute;
pub mod vtysh;

use std::net::IpAddr;

use async_trait::async_trait;
use evpn_gw_common::GwResult;
use evpn_types::{IpPrefix, MacAddress, VlanId, Vni};

pub use iproute::IpRoute2;
pub use vtysh::Vtysh;

/// Kind-specific attributes of a link to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// L3 master device bound to a routing table.
    Vrf { table: u32 },
    /// Linux bridge.
    Bridge { vlan_filtering: bool },
    /// VXLAN tunnel device.
    Vxlan {
        vni: Vni,
        local: Option<IpAddr>,
        dstport: u16,
    },
    /// Dummy device standing in for a bridge port.
    Dummy,
}

impl LinkKind {
    /// iproute2 `type` keyword for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Vrf { .. } => "vrf",
            LinkKind::Bridge { .. } => "bridge",
            LinkKind::Vxlan { .. } => "vxlan",
            LinkKind::Dummy => "dummy",
        }
    }
}

/// Desired state of a link. Created links are always brought up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub name: String,
    pub kind: LinkKind,
    pub address: Option<MacAddress>,
    pub master: Option<String>,
}

impl LinkSpec {
    pub fn new(name: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            name: name.into(),
            kind,
            address: None,
            master: None,
        }
    }

    pub fn with_address(mut self, address: MacAddress) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_master(mut self, master: impl Into<String>) -> Self {
        self.master = Some(master.into());
        self
    }
}

/// A link as reported by the kernel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    pub name: String,
    pub ifindex: u32,
    pub kind: Option<String>,
    pub mtu: u32,
    pub address: Option<MacAddress>,
    pub oper_state: String,
}

/// VLAN tagging mode of a bridge member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggingMode {
    Tagged,
    Untagged,
}

impl TaggingMode {
    /// Extra `bridge vlan add` arguments for this mode.
    pub fn to_bridge_cmd(&self) -> &'static str {
        match self {
            TaggingMode::Tagged => "",
            TaggingMode::Untagged => "pvid untagged",
        }
    }
}

/// Kernel-link backend.
#[async_trait]
pub trait LinkAdapter: Send + Sync {
    /// Creates a link, enslaves it to its master (if any) and brings it up.
    async fn link_add(&self, spec: &LinkSpec) -> GwResult<()>;

    /// Deletes a link by name.
    async fn link_del(&self, name: &str) -> GwResult<()>;

    /// Looks up a live link; `NotFound` when the kernel has no such link.
    async fn link_by_name(&self, name: &str) -> GwResult<Link>;

    /// Re-applies link attributes to an existing link.
    async fn link_modify(&self, link: &Link) -> GwResult<()>;

    /// Adds an address to a link.
    async fn addr_add(&self, name: &str, prefix: &IpPrefix) -> GwResult<()>;

    /// Adds a VLAN to a bridge member, or to the bridge itself when
    /// `on_bridge` is set.
    async fn bridge_vlan_add(
        &self,
        dev: &str,
        vlan: VlanId,
        mode: TaggingMode,
        on_bridge: bool,
    ) -> GwResult<()>;

    /// Removes a VLAN from a bridge member or bridge.
    async fn bridge_vlan_del(&self, dev: &str, vlan: VlanId, on_bridge: bool) -> GwResult<()>;
}

/// Routing-daemon view of a VRF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrrVrfConfig {
    /// VRF device name (the resource's short id).
    pub name: String,
    pub vni: Option<Vni>,
    pub local_as: u32,
    pub router_id: Option<IpAddr>,
}

/// Routing-daemon backend.
#[async_trait]
pub trait FrrAdapter: Send + Sync {
    /// Applies route-target and address-family configuration for a VRF.
    async fn apply_vrf(&self, vrf: &FrrVrfConfig) -> GwResult<()>;

    /// Removes everything [`FrrAdapter::apply_vrf`] configured.
    async fn remove_vrf(&self, vrf: &FrrVrfConfig) -> GwResult<()>;
}
