//! Logical bridge lifecycle
//!
//! A logical bridge is a VLAN on the tenant bridge. With a VNI it is
//! stretched over a VXLAN device `vni<N>` enslaved to the tenant bridge with
//! the VLAN as its untagged pvid.

use evpn_gw_common::{GwError, GwResult};
use evpn_types::{VlanId, Vni};
use tracing::{debug, info, instrument};

use super::Server;
use crate::backend::{LinkKind, LinkSpec, TaggingMode};
use crate::resource_id;
use crate::types::{
    CreateLogicalBridgeRequest, DeleteRequest, GetRequest, ListRequest, ListResponse,
    LogicalBridge, LogicalBridgeSpec, LogicalBridgeStatus, OperStatus,
    UpdateLogicalBridgeRequest, BRIDGE_COLLECTION, VXLAN_DST_PORT,
};
use crate::validate::{
    validate_create_logical_bridge_request, validate_delete_request, validate_get_request,
    validate_update_logical_bridge_request,
};

impl Server {
    /// Create a logical bridge, or return the existing one under the same name
    #[instrument(skip(self, req), fields(logical_bridge_id = %req.logical_bridge_id))]
    pub async fn create_logical_bridge(
        &self,
        req: CreateLogicalBridgeRequest,
    ) -> GwResult<LogicalBridge> {
        validate_create_logical_bridge_request(&req)?;
        let name = resource_id::assign(
            BRIDGE_COLLECTION,
            &req.logical_bridge_id,
            &req.logical_bridge.name,
        );

        let mut bridges = self.bridges.lock().await;
        if let Some(existing) = bridges.get(&name) {
            info!("Already existing LogicalBridge with id {}", name);
            return Ok(existing.clone());
        }

        let spec = req.logical_bridge.spec;
        if let Some(owner) = bridges.find(|b| shares_segment(&b.spec, &spec)) {
            return Err(GwError::invalid_argument(format!(
                "{} would share VLAN {} or its VNI with {}",
                name, spec.vlan_id, owner.name
            )));
        }
        self.realize_logical_bridge(&spec).await?;

        let bridge = LogicalBridge {
            name: name.clone(),
            spec,
            status: bridge_status(),
        };
        bridges.insert(bridge.clone());
        info!(
            "Created logical bridge {} on VLAN {}",
            name, bridge.spec.vlan_id
        );
        Ok(bridge)
    }

    /// Delete a logical bridge and its VXLAN device
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn delete_logical_bridge(&self, req: DeleteRequest) -> GwResult<()> {
        validate_delete_request(&req, BRIDGE_COLLECTION)?;

        let mut bridges = self.bridges.lock().await;
        let Some(bridge) = bridges.get(&req.name).cloned() else {
            if req.allow_missing {
                debug!("Logical bridge {} not found, allow_missing set", req.name);
                return Ok(());
            }
            return Err(GwError::not_found(&req.name));
        };

        if let Some(vni) = bridge.spec.vni {
            self.link.link_del(&vni.vxlan_ifname()).await?;
        }
        self.link
            .bridge_vlan_del(&self.settings.tenant_bridge, bridge.spec.vlan_id, true)
            .await?;

        bridges.remove(&bridge.name);
        info!("Deleted logical bridge {}", bridge.name);
        Ok(())
    }

    /// Update a logical bridge's spec
    ///
    /// Bridges with a VNI must still have their `vni<N>` device; bridges
    /// without one have no dedicated link to check.
    #[instrument(skip(self, req), fields(name = %req.logical_bridge.name))]
    pub async fn update_logical_bridge(
        &self,
        req: UpdateLogicalBridgeRequest,
    ) -> GwResult<LogicalBridge> {
        validate_update_logical_bridge_request(&req)?;

        let mut bridges = self.bridges.lock().await;
        let existing = bridges
            .get(&req.logical_bridge.name)
            .cloned()
            .ok_or_else(|| GwError::not_found(&req.logical_bridge.name))?;
        check_segment_unchanged(&existing.spec, &req.logical_bridge.spec)?;

        if let Some(vni) = existing.spec.vni {
            let link = self.link.link_by_name(&vni.vxlan_ifname()).await?;
            self.link.link_modify(&link).await?;
        }

        let bridge = LogicalBridge {
            name: existing.name,
            spec: req.logical_bridge.spec,
            status: bridge_status(),
        };
        bridges.insert(bridge.clone());
        info!("Updated logical bridge {}", bridge.name);
        Ok(bridge)
    }

    /// Fetch a logical bridge
    pub async fn get_logical_bridge(&self, req: GetRequest) -> GwResult<LogicalBridge> {
        validate_get_request(&req, BRIDGE_COLLECTION)?;

        let stored = self
            .bridges
            .lock()
            .await
            .get(&req.name)
            .cloned()
            .ok_or_else(|| GwError::not_found(&req.name))?;
        if let Some(vni) = stored.spec.vni {
            self.link.link_by_name(&vni.vxlan_ifname()).await?;
        }

        Ok(LogicalBridge {
            status: bridge_status(),
            ..stored
        })
    }

    /// List logical bridges in name order
    pub async fn list_logical_bridges(
        &self,
        req: ListRequest,
    ) -> GwResult<ListResponse<LogicalBridge>> {
        let snapshot = self.bridges.lock().await.sorted_snapshot();
        let (items, next_page_token) =
            self.pagination
                .paginate(snapshot, req.page_size, &req.page_token)?;
        Ok(ListResponse {
            items,
            next_page_token,
        })
    }

    async fn realize_logical_bridge(&self, spec: &LogicalBridgeSpec) -> GwResult<()> {
        let tenant = &self.settings.tenant_bridge;
        self.link
            .bridge_vlan_add(tenant, spec.vlan_id, TaggingMode::Tagged, true)
            .await?;

        if let Some(vni) = spec.vni {
            self.realize_vxlan(vni, spec.vlan_id).await?;
        }
        Ok(())
    }

    async fn realize_vxlan(&self, vni: Vni, vlan_id: VlanId) -> GwResult<()> {
        let vxlan = vni.vxlan_ifname();
        self.link
            .link_add(
                &LinkSpec::new(
                    vxlan.as_str(),
                    LinkKind::Vxlan {
                        vni,
                        local: self.settings.vtep_ip,
                        dstport: VXLAN_DST_PORT,
                    },
                )
                .with_master(self.settings.tenant_bridge.as_str()),
            )
            .await?;
        self.link
            .bridge_vlan_add(&vxlan, vlan_id, TaggingMode::Untagged, false)
            .await
    }
}

fn bridge_status() -> LogicalBridgeStatus {
    LogicalBridgeStatus {
        oper_status: OperStatus::Up,
    }
}

/// Two bridges on the same VLAN or VNI would share the tenant bridge VLAN
/// or the `vni<N>` device, and deleting either would strip the other.
fn shares_segment(a: &LogicalBridgeSpec, b: &LogicalBridgeSpec) -> bool {
    a.vlan_id == b.vlan_id || (a.vni.is_some() && a.vni == b.vni)
}

/// VNI and VLAN name the kernel objects backing the bridge; changing them
/// would orphan those objects.
fn check_segment_unchanged(stored: &LogicalBridgeSpec, requested: &LogicalBridgeSpec) -> GwResult<()> {
    if stored.vni != requested.vni || stored.vlan_id != requested.vlan_id {
        return Err(GwError::invalid_argument(
            "vni and vlan_id cannot be changed after creation",
        ));
    }
    Ok(())
}
