//! VXLAN network identifier.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 24-bit VXLAN Network Identifier.
///
/// VNI 0 is accepted: the kernel allows it and nothing in the control plane
/// reserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Vni(u32);

impl Vni {
    /// Largest encodable VNI (2^24 - 1).
    pub const MAX: u32 = (1 << 24) - 1;

    /// Creates a new VNI.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit in 24 bits.
    pub const fn new(vni: u32) -> Result<Self, ParseError> {
        if vni <= Self::MAX {
            Ok(Vni(vni))
        } else {
            Err(ParseError::InvalidVni(vni))
        }
    }

    /// Returns the VNI as a u32.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Kernel name of the VXLAN device carrying this VNI (`vni<N>`).
    pub fn vxlan_ifname(&self) -> String {
        format!("vni{}", self.0)
    }

    /// Kernel name of the L3 bridge paired with this VNI (`br<N>`).
    pub fn bridge_ifname(&self) -> String {
        format!("br{}", self.0)
    }
}

impl fmt::Display for Vni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Vni {
    type Error = ParseError;

    fn try_from(vni: u32) -> Result<Self, Self::Error> {
        Vni::new(vni)
    }
}

impl From<Vni> for u32 {
    fn from(vni: Vni) -> u32 {
        vni.0
    }
}
