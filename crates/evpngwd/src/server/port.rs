//! Bridge port lifecycle
//!
//! A port is a link named by its short id, enslaved to the tenant bridge and
//! joined to the VLAN of every referenced logical bridge.

use evpn_gw_common::{GwError, GwResult};
use evpn_types::VlanId;
use tracing::{debug, info, instrument};

use super::Server;
use crate::backend::{LinkKind, LinkSpec, TaggingMode};
use crate::resource_id::{self, short_id};
use crate::types::{
    BridgePort, BridgePortSpec, BridgePortStatus, BridgePortType, CreateBridgePortRequest,
    DeleteRequest, GetRequest, ListRequest, ListResponse, OperStatus, PORT_COLLECTION,
};
use crate::validate::{
    validate_create_bridge_port_request, validate_delete_request, validate_get_request,
};

impl Server {
    /// Create a bridge port, or return the existing one under the same name
    ///
    /// Every referenced logical bridge must already exist.
    #[instrument(skip(self, req), fields(bridge_port_id = %req.bridge_port_id))]
    pub async fn create_bridge_port(&self, req: CreateBridgePortRequest) -> GwResult<BridgePort> {
        validate_create_bridge_port_request(&req)?;
        let name = resource_id::assign(PORT_COLLECTION, &req.bridge_port_id, &req.bridge_port.name);

        let mut ports = self.ports.lock().await;
        if let Some(existing) = ports.get(&name) {
            info!("Already existing BridgePort with id {}", name);
            return Ok(existing.clone());
        }

        let spec = req.bridge_port.spec;
        // lock order: ports, then bridges
        let vlans = {
            let bridges = self.bridges.lock().await;
            spec.logical_bridges
                .iter()
                .map(|reference| {
                    bridges
                        .get(reference)
                        .map(|bridge| bridge.spec.vlan_id)
                        .ok_or_else(|| GwError::not_found(reference))
                })
                .collect::<GwResult<Vec<VlanId>>>()?
        };

        self.realize_bridge_port(short_id(&name), &spec, &vlans).await?;

        let port = BridgePort {
            name: name.clone(),
            spec,
            status: port_status(),
        };
        ports.insert(port.clone());
        info!(
            "Created bridge port {} on {} logical bridge(s)",
            name,
            vlans.len()
        );
        Ok(port)
    }

    /// Delete a bridge port and its link
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn delete_bridge_port(&self, req: DeleteRequest) -> GwResult<()> {
        validate_delete_request(&req, PORT_COLLECTION)?;

        let mut ports = self.ports.lock().await;
        let Some(port) = ports.get(&req.name).cloned() else {
            if req.allow_missing {
                debug!("Bridge port {} not found, allow_missing set", req.name);
                return Ok(());
            }
            return Err(GwError::not_found(&req.name));
        };

        self.link.link_del(short_id(&port.name)).await?;

        ports.remove(&port.name);
        info!("Deleted bridge port {}", port.name);
        Ok(())
    }

    /// Fetch a bridge port, confirming its link still exists
    pub async fn get_bridge_port(&self, req: GetRequest) -> GwResult<BridgePort> {
        validate_get_request(&req, PORT_COLLECTION)?;

        let stored = self
            .ports
            .lock()
            .await
            .get(&req.name)
            .cloned()
            .ok_or_else(|| GwError::not_found(&req.name))?;
        self.link.link_by_name(short_id(&stored.name)).await?;

        Ok(BridgePort {
            status: port_status(),
            ..stored
        })
    }

    /// List bridge ports in name order
    pub async fn list_bridge_ports(&self, req: ListRequest) -> GwResult<ListResponse<BridgePort>> {
        let snapshot = self.ports.lock().await.sorted_snapshot();
        let (items, next_page_token) =
            self.pagination
                .paginate(snapshot, req.page_size, &req.page_token)?;
        Ok(ListResponse {
            items,
            next_page_token,
        })
    }

    async fn realize_bridge_port(
        &self,
        id: &str,
        spec: &BridgePortSpec,
        vlans: &[VlanId],
    ) -> GwResult<()> {
        self.link
            .link_add(
                &LinkSpec::new(id, LinkKind::Dummy)
                    .with_address(spec.mac_address)
                    .with_master(self.settings.tenant_bridge.as_str()),
            )
            .await?;

        let mode = match spec.ptype {
            BridgePortType::Access => TaggingMode::Untagged,
            _ => TaggingMode::Tagged,
        };
        for vlan in vlans {
            self.link.bridge_vlan_add(id, *vlan, mode, false).await?;
        }
        Ok(())
    }
}

fn port_status() -> BridgePortStatus {
    BridgePortStatus {
        oper_status: OperStatus::Up,
    }
}
