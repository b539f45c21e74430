//! Value types for the EVPN gateway control plane.
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses, including the random
//!   router MACs assigned to VRFs
//! - [`IpPrefix`]: IPv4/IPv6 prefixes in CIDR notation (loopback and VTEP
//!   addresses)
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`Vni`]: 24-bit VXLAN network identifiers

mod ip;
mod mac;
mod vlan;
mod vni;

pub use ip::IpPrefix;
pub use mac::MacAddress;
pub use vlan::VlanId;
pub use vni::Vni;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid VNI: {0} (must be below 16777216)")]
    InvalidVni(u32),
}
