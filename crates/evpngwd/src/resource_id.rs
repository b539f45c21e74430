//! Resource identity: short ids and collection-prefixed names.
//!
//! A resource name is assigned exactly once, before the idempotency probe,
//! so that repeated creates with the same caller id land on the same key.

use tracing::info;
use uuid::Uuid;

use crate::types::{IFNAME_MAX_LEN, PORT_COLLECTION, VRF_COLLECTION};

/// Hex digits of a v4 UUID kept in interface-safe ids.
const INTERFACE_ID_HEX_LEN: usize = 12;

/// Whether resources in `collection` are realized as a kernel link named
/// by their short id.
fn names_interface(collection: &str) -> bool {
    matches!(collection, VRF_COLLECTION | PORT_COLLECTION)
}

/// Generates a new system-assigned short id.
///
/// Ids that become interface names are `r` plus the first 12 hex digits of a
/// v4 UUID, which fits IFNAMSIZ and the user-settable grammar. Everything
/// else gets the full UUID.
pub fn new_system_generated(collection: &str) -> String {
    let uuid = Uuid::new_v4();
    if !names_interface(collection) {
        return uuid.to_string();
    }
    let hex = uuid.simple().to_string();
    let id = format!("r{}", &hex[..INTERFACE_ID_HEX_LEN]);
    debug_assert!(id.len() <= IFNAME_MAX_LEN);
    id
}

/// Builds the canonical resource name `<collection>/<id>`.
pub fn full_name(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}

/// Returns the short id of a resource name (its last path segment).
pub fn short_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Resolves the name for a create request.
///
/// A caller-supplied id (already validated) wins over whatever `name` the
/// client put in the resource body; otherwise a fresh id is generated.
pub fn assign(collection: &str, user_id: &str, client_name: &str) -> String {
    let id = if user_id.is_empty() {
        new_system_generated(collection)
    } else {
        if !client_name.is_empty() {
            info!(
                "client provided the ID of a resource {}, ignoring the name field {}",
                user_id, client_name
            );
        }
        user_id.to_string()
    };
    full_name(collection, &id)
}
