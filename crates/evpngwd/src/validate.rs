//! Request validation.
//!
//! Pure checks run before any store or backend access. Every failure is
//! reported as [`GwError::InvalidArgument`].

use evpn_gw_common::{GwError, GwResult};

use crate::types::{
    BridgePortType, CreateBridgePortRequest, CreateLogicalBridgeRequest, CreateVrfRequest,
    DeleteRequest, GetRequest, UpdateLogicalBridgeRequest, UpdateVrfRequest, BRIDGE_COLLECTION,
    IFNAME_MAX_LEN, VRF_COLLECTION,
};

const MIN_ID_LEN: usize = 4;
const MAX_ID_LEN: usize = 63;

/// Checks a caller-supplied short id.
///
/// Ids are 4 to 63 characters of lowercase letters, digits and hyphens,
/// starting with a letter and ending with a letter or digit.
pub fn validate_user_settable_id(id: &str) -> GwResult<()> {
    if id.len() < MIN_ID_LEN || id.len() > MAX_ID_LEN {
        return Err(GwError::invalid_argument(format!(
            "user-settable ID must be between {} and {} characters (got {})",
            MIN_ID_LEN,
            MAX_ID_LEN,
            id.len()
        )));
    }
    if !id.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(GwError::invalid_argument(
            "user-settable ID must begin with a letter",
        ));
    }
    if id.ends_with('-') {
        return Err(GwError::invalid_argument(
            "user-settable ID must end with a letter or number",
        ));
    }
    if let Some((position, character)) = id
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(GwError::invalid_argument(format!(
            "user-settable ID must only contain lowercase, numbers and hyphens (got: '{}' in position {})",
            character, position
        )));
    }
    Ok(())
}

/// Checks that `name` is a well-formed `<collection>/<id>` name.
pub fn validate_resource_name(name: &str, collection: &str) -> GwResult<()> {
    if name.is_empty() {
        return Err(GwError::invalid_argument("missing required field: name"));
    }
    let id = name
        .strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| {
            GwError::invalid_argument(format!(
                "resource name {} must be of the form {}/{{id}}",
                name, collection
            ))
        })?;
    if id.is_empty() || id.contains('/') || id.chars().any(char::is_whitespace) {
        return Err(GwError::invalid_argument(format!(
            "invalid resource name {}",
            name
        )));
    }
    Ok(())
}

fn validate_optional_id(id: &str) -> GwResult<()> {
    if id.is_empty() {
        Ok(())
    } else {
        validate_user_settable_id(id)
    }
}

/// Like [`validate_optional_id`], for kinds whose short id is also the
/// kernel interface name.
fn validate_optional_interface_id(id: &str, field: &str) -> GwResult<()> {
    validate_optional_id(id)?;
    if id.len() > IFNAME_MAX_LEN {
        return Err(GwError::invalid_argument(format!(
            "{} {} is longer than {} characters and cannot name an interface",
            field, id, IFNAME_MAX_LEN
        )));
    }
    Ok(())
}

pub fn validate_create_vrf_request(req: &CreateVrfRequest) -> GwResult<()> {
    validate_optional_interface_id(&req.vrf_id, "vrf_id")
}

pub fn validate_update_vrf_request(req: &UpdateVrfRequest) -> GwResult<()> {
    validate_resource_name(&req.vrf.name, VRF_COLLECTION)
}

pub fn validate_create_logical_bridge_request(req: &CreateLogicalBridgeRequest) -> GwResult<()> {
    validate_optional_id(&req.logical_bridge_id)
}

pub fn validate_update_logical_bridge_request(req: &UpdateLogicalBridgeRequest) -> GwResult<()> {
    validate_resource_name(&req.logical_bridge.name, BRIDGE_COLLECTION)
}

pub fn validate_create_bridge_port_request(req: &CreateBridgePortRequest) -> GwResult<()> {
    let spec = &req.bridge_port.spec;
    if spec.ptype == BridgePortType::Unspecified {
        return Err(GwError::invalid_argument(
            "missing required field: bridge_port.spec.ptype",
        ));
    }
    if spec.mac_address.is_zero() || spec.mac_address.is_multicast() {
        return Err(GwError::invalid_argument(format!(
            "bridge port MAC address {} must be a unicast address",
            spec.mac_address
        )));
    }
    // an ACCESS port carries exactly one untagged VLAN
    let length = spec.logical_bridges.len();
    if spec.ptype == BridgePortType::Access && length > 1 {
        return Err(GwError::invalid_argument(format!(
            "ACCESS type must have single LogicalBridge and not ({})",
            length
        )));
    }
    for bridge in &spec.logical_bridges {
        validate_resource_name(bridge, BRIDGE_COLLECTION)?;
    }
    validate_optional_interface_id(&req.bridge_port_id, "bridge_port_id")
}

pub fn validate_get_request(req: &GetRequest, collection: &str) -> GwResult<()> {
    validate_resource_name(&req.name, collection)
}

pub fn validate_delete_request(req: &DeleteRequest, collection: &str) -> GwResult<()> {
    validate_resource_name(&req.name, collection)
}
