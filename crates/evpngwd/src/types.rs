//! Resource and request types for the EVPN gateway API.
//!
//! The shapes mirror the EVPN gateway resource model: every resource has a
//! relative `name` (`<collection>/<id>`), a client-owned `spec` and a
//! server-computed `status`. Status sent by clients is ignored.

use evpn_types::{IpPrefix, MacAddress, VlanId, Vni};
use serde::{Deserialize, Serialize};

/// Collection name for VRF resources.
pub const VRF_COLLECTION: &str = "vrfs";

/// Collection name for logical bridge resources.
pub const BRIDGE_COLLECTION: &str = "bridges";

/// Collection name for bridge port resources.
pub const PORT_COLLECTION: &str = "ports";

/// Default local AS reported in VRF status.
pub const DEFAULT_LOCAL_AS: u32 = 4;

/// Routing table used by VRFs without a VNI.
pub const DEFAULT_ROUTING_TABLE: u32 = 1000;

/// First routing table handed to VRFs with a VNI.
pub const VNI_ROUTING_TABLE_BASE: u32 = 1001;

/// Name of the VLAN-aware bridge that carries all logical bridges.
pub const DEFAULT_TENANT_BRIDGE: &str = "br-tenant";

/// Longest kernel interface name (IFNAMSIZ - 1).
pub const IFNAME_MAX_LEN: usize = 15;

/// Standard VXLAN UDP port.
pub const VXLAN_DST_PORT: u16 = 4789;

/// Anything stored under a resource name.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Full resource name, e.g. `vrfs/blue`.
    fn name(&self) -> &str;
}

// --- VRF ---

/// A Virtual Routing and Forwarding domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vrf {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub spec: VrfSpec,
    #[serde(default)]
    pub status: VrfStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VrfSpec {
    /// L3 VNI; when set the VRF is attached to the EVPN fabric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vni: Option<Vni>,
    /// Address assigned to the VRF device; also used as BGP router-id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loopback_ip_prefix: Option<IpPrefix>,
    /// Local VTEP address for the L3 VXLAN device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vtep_ip_prefix: Option<IpPrefix>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VrfStatus {
    pub local_as: u32,
    pub routing_table: u32,
    pub rmac: MacAddress,
}

impl Resource for Vrf {
    fn name(&self) -> &str {
        &self.name
    }
}

// --- Logical bridge ---

/// An L2 broadcast domain, optionally stretched over a VXLAN segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalBridge {
    #[serde(default)]
    pub name: String,
    pub spec: LogicalBridgeSpec,
    #[serde(default)]
    pub status: LogicalBridgeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalBridgeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vni: Option<Vni>,
    pub vlan_id: VlanId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogicalBridgeStatus {
    pub oper_status: OperStatus,
}

impl Resource for LogicalBridge {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Operational status of bridges and ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperStatus {
    #[default]
    Unspecified,
    Up,
    Down,
}

// --- Bridge port ---

/// A port attached to one or more logical bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgePort {
    #[serde(default)]
    pub name: String,
    pub spec: BridgePortSpec,
    #[serde(default)]
    pub status: BridgePortStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgePortSpec {
    pub mac_address: MacAddress,
    #[serde(default)]
    pub ptype: BridgePortType,
    /// Logical bridge names (`bridges/{id}`), in attachment order.
    #[serde(default)]
    pub logical_bridges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BridgePortStatus {
    pub oper_status: OperStatus,
}

impl Resource for BridgePort {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Bridge port type.
///
/// An ACCESS port carries a single untagged VLAN; a TRUNK port carries any
/// number of tagged VLANs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgePortType {
    #[default]
    Unspecified,
    Access,
    Trunk,
}

// --- Requests ---

#[derive(Debug, Clone)]
pub struct CreateVrfRequest {
    /// Caller-chosen short id; empty means system-generated.
    pub vrf_id: String,
    pub vrf: Vrf,
}

#[derive(Debug, Clone)]
pub struct UpdateVrfRequest {
    pub vrf: Vrf,
}

#[derive(Debug, Clone)]
pub struct CreateLogicalBridgeRequest {
    pub logical_bridge_id: String,
    pub logical_bridge: LogicalBridge,
}

#[derive(Debug, Clone)]
pub struct UpdateLogicalBridgeRequest {
    pub logical_bridge: LogicalBridge,
}

#[derive(Debug, Clone)]
pub struct CreateBridgePortRequest {
    pub bridge_port_id: String,
    pub bridge_port: BridgePort,
}

/// Get request shared by all resource kinds.
#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    pub name: String,
}

/// Delete request shared by all resource kinds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub name: String,
    /// Succeed silently when the resource does not exist.
    #[serde(default)]
    pub allow_missing: bool,
}

/// List request shared by all resource kinds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
    /// Maximum page length; `0` selects the default.
    #[serde(default)]
    pub page_size: i32,
    /// Token from a previous response; empty starts from the beginning.
    #[serde(default)]
    pub page_token: String,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Empty when the listing is exhausted.
    pub next_page_token: String,
}
