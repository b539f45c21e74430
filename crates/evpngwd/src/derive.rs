//! Values computed by the server at creation time.

use evpn_types::{MacAddress, Vni};

use crate::types::{DEFAULT_ROUTING_TABLE, VNI_ROUTING_TABLE_BASE};

/// Routing table for a VRF: `1001 + (vni mod 10)`, or `1000` without a VNI.
///
/// VRFs whose VNIs share a residue modulo 10 get the same table. Callers
/// rely on the exact mapping, so collisions are not resolved here.
pub fn routing_table_for(vni: Option<Vni>) -> u32 {
    match vni {
        Some(vni) => VNI_ROUTING_TABLE_BASE + vni.as_u32() % 10,
        None => DEFAULT_ROUTING_TABLE,
    }
}

/// Random router MAC for a new VRF.
pub fn generate_rmac() -> MacAddress {
    MacAddress::random_local(&mut rand::thread_rng())
}
