//! VRF lifecycle
//!
//! A VRF is realized as a kernel VRF device named by its short id. With an
//! L3 VNI it also gets an SVI bridge `br<N>` and a VXLAN device `vni<N>`
//! under it, plus a per-VRF BGP instance in FRR.

use evpn_gw_common::{GwError, GwResult};
use evpn_types::{IpPrefix, MacAddress};
use tracing::{debug, info, instrument};

use super::Server;
use crate::backend::{FrrVrfConfig, LinkKind, LinkSpec};
use crate::derive::{generate_rmac, routing_table_for};
use crate::resource_id::{self, short_id};
use crate::types::{
    CreateVrfRequest, DeleteRequest, GetRequest, ListRequest, ListResponse, UpdateVrfRequest,
    Vrf, VrfSpec, VrfStatus, VRF_COLLECTION, VXLAN_DST_PORT,
};
use crate::validate::{
    validate_create_vrf_request, validate_delete_request, validate_get_request,
    validate_update_vrf_request,
};

impl Server {
    /// Create a VRF, or return the existing one under the same name
    #[instrument(skip(self, req), fields(vrf_id = %req.vrf_id))]
    pub async fn create_vrf(&self, req: CreateVrfRequest) -> GwResult<Vrf> {
        validate_create_vrf_request(&req)?;
        let name = resource_id::assign(VRF_COLLECTION, &req.vrf_id, &req.vrf.name);

        let mut vrfs = self.vrfs.lock().await;
        if let Some(existing) = vrfs.get(&name) {
            info!("Already existing Vrf with id {}", name);
            return Ok(existing.clone());
        }

        let spec = req.vrf.spec;
        let routing_table = routing_table_for(spec.vni);
        let rmac = generate_rmac();
        debug!(
            "Derived routing table {} and rmac {} for {}",
            routing_table, rmac, name
        );

        let id = short_id(&name);
        self.realize_vrf(id, &spec, routing_table, rmac).await?;
        self.frr.apply_vrf(&self.frr_vrf_config(id, &spec)).await?;

        let vrf = Vrf {
            name: name.clone(),
            spec,
            status: VrfStatus {
                local_as: self.settings.local_as,
                routing_table,
                rmac,
            },
        };
        vrfs.insert(vrf.clone());
        info!("Created VRF {} with routing table {}", name, routing_table);
        Ok(vrf)
    }

    /// Delete a VRF and tear down its kernel and FRR state
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn delete_vrf(&self, req: DeleteRequest) -> GwResult<()> {
        validate_delete_request(&req, VRF_COLLECTION)?;

        let mut vrfs = self.vrfs.lock().await;
        let Some(vrf) = vrfs.get(&req.name).cloned() else {
            if req.allow_missing {
                debug!("VRF {} not found, allow_missing set", req.name);
                return Ok(());
            }
            return Err(GwError::not_found(&req.name));
        };

        let id = short_id(&vrf.name);
        if let Some(vni) = vrf.spec.vni {
            self.link.link_del(&vni.vxlan_ifname()).await?;
            self.link.link_del(&vni.bridge_ifname()).await?;
        }
        self.link.link_del(id).await?;
        self.frr.remove_vrf(&self.frr_vrf_config(id, &vrf.spec)).await?;

        vrfs.remove(&vrf.name);
        info!("Deleted VRF {}", vrf.name);
        Ok(())
    }

    /// Update a VRF; the live VRF device must still exist and the realized
    /// spec fields must match what is stored
    #[instrument(skip(self, req), fields(name = %req.vrf.name))]
    pub async fn update_vrf(&self, req: UpdateVrfRequest) -> GwResult<Vrf> {
        validate_update_vrf_request(&req)?;

        let mut vrfs = self.vrfs.lock().await;
        let existing = vrfs
            .get(&req.vrf.name)
            .cloned()
            .ok_or_else(|| GwError::not_found(&req.vrf.name))?;
        check_realized_fields_unchanged(&existing.spec, &req.vrf.spec)?;

        let link = self.link.link_by_name(short_id(&existing.name)).await?;
        self.link.link_modify(&link).await?;

        let vrf = Vrf {
            name: existing.name,
            spec: req.vrf.spec,
            status: self.vrf_status(&existing.status),
        };
        vrfs.insert(vrf.clone());
        info!("Updated VRF {}", vrf.name);
        Ok(vrf)
    }

    /// Fetch a VRF, confirming its kernel device still exists
    pub async fn get_vrf(&self, req: GetRequest) -> GwResult<Vrf> {
        validate_get_request(&req, VRF_COLLECTION)?;

        let stored = self
            .vrfs
            .lock()
            .await
            .get(&req.name)
            .cloned()
            .ok_or_else(|| GwError::not_found(&req.name))?;
        self.link.link_by_name(short_id(&stored.name)).await?;

        Ok(Vrf {
            status: self.vrf_status(&stored.status),
            ..stored
        })
    }

    /// List VRFs in name order
    pub async fn list_vrfs(&self, req: ListRequest) -> GwResult<ListResponse<Vrf>> {
        let snapshot = self.vrfs.lock().await.sorted_snapshot();
        let (items, next_page_token) =
            self.pagination
                .paginate(snapshot, req.page_size, &req.page_token)?;
        Ok(ListResponse {
            items,
            next_page_token,
        })
    }

    /// Status view: routing table and rmac are fixed at creation
    fn vrf_status(&self, stored: &VrfStatus) -> VrfStatus {
        VrfStatus {
            local_as: self.settings.local_as,
            routing_table: stored.routing_table,
            rmac: stored.rmac,
        }
    }

    fn frr_vrf_config(&self, id: &str, spec: &VrfSpec) -> FrrVrfConfig {
        FrrVrfConfig {
            name: id.to_string(),
            vni: spec.vni,
            local_as: self.settings.local_as,
            router_id: spec.loopback_ip_prefix.as_ref().map(IpPrefix::address),
        }
    }

    async fn realize_vrf(
        &self,
        id: &str,
        spec: &VrfSpec,
        routing_table: u32,
        rmac: MacAddress,
    ) -> GwResult<()> {
        self.link
            .link_add(
                &LinkSpec::new(id, LinkKind::Vrf { table: routing_table }).with_address(rmac),
            )
            .await?;
        if let Some(prefix) = &spec.loopback_ip_prefix {
            self.link.addr_add(id, prefix).await?;
        }

        let Some(vni) = spec.vni else {
            return Ok(());
        };
        let bridge = vni.bridge_ifname();
        self.link
            .link_add(
                &LinkSpec::new(
                    bridge.as_str(),
                    LinkKind::Bridge {
                        vlan_filtering: false,
                    },
                )
                .with_address(rmac)
                .with_master(id),
            )
            .await?;

        let local = spec
            .vtep_ip_prefix
            .as_ref()
            .map(IpPrefix::address)
            .or(self.settings.vtep_ip);
        self.link
            .link_add(
                &LinkSpec::new(
                    vni.vxlan_ifname(),
                    LinkKind::Vxlan {
                        vni,
                        local,
                        dstport: VXLAN_DST_PORT,
                    },
                )
                .with_master(bridge),
            )
            .await?;
        Ok(())
    }
}

/// Every spec field is baked into kernel or FRR state at creation: the VNI
/// selects the routing table and L3 devices, the loopback prefix is the VRF
/// device address and router-id, and the VTEP prefix is the VXLAN `local`.
/// None of them is re-applied on update, so a change is refused.
fn check_realized_fields_unchanged(stored: &VrfSpec, requested: &VrfSpec) -> GwResult<()> {
    if stored.vni != requested.vni {
        return Err(GwError::invalid_argument(format!(
            "vni cannot be changed after creation (stored {:?}, requested {:?})",
            stored.vni.map(|v| v.as_u32()),
            requested.vni.map(|v| v.as_u32())
        )));
    }
    check_prefix_unchanged(
        "loopback_ip_prefix",
        &stored.loopback_ip_prefix,
        &requested.loopback_ip_prefix,
    )?;
    check_prefix_unchanged(
        "vtep_ip_prefix",
        &stored.vtep_ip_prefix,
        &requested.vtep_ip_prefix,
    )
}

fn check_prefix_unchanged(
    field: &str,
    stored: &Option<IpPrefix>,
    requested: &Option<IpPrefix>,
) -> GwResult<()> {
    if stored == requested {
        return Ok(());
    }
    let show = |p: &Option<IpPrefix>| p.map_or_else(|| "none".to_string(), |p| p.to_string());
    Err(GwError::invalid_argument(format!(
        "{} cannot be changed after creation (stored {}, requested {})",
        field,
        show(stored),
        show(requested)
    )))
}
