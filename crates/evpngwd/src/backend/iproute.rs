//! iproute2-backed kernel link adapter.

use async_trait::async_trait;
use evpn_gw_common::{shell, GwError, GwResult};
use evpn_types::{IpPrefix, VlanId};
use serde::Deserialize;
use tracing::{debug, instrument};

#[cfg(test)]
use parking_lot::Mutex;

use super::{Link, LinkAdapter, LinkSpec, TaggingMode};
use crate::commands::*;

/// Drives kernel links through the `ip` and `bridge` tools.
#[derive(Default)]
pub struct IpRoute2 {
    #[cfg(test)]
    mock_mode: bool,
    #[cfg(test)]
    captured_commands: Mutex<Vec<String>>,
}

impl IpRoute2 {
    pub fn new() -> Self {
        Self::default()
    }

    async fn exec(&self, cmd: &str) -> GwResult<String> {
        #[cfg(test)]
        if self.mock_mode {
            self.captured_commands.lock().push(cmd.to_string());
            return Ok(String::new());
        }

        shell::exec_checked(cmd).await
    }

    #[cfg(test)]
    pub fn with_mock_mode(mut self) -> Self {
        self.mock_mode = true;
        self
    }

    #[cfg(test)]
    pub fn captured_commands(&self) -> Vec<String> {
        self.captured_commands.lock().clone()
    }
}

#[derive(Deserialize)]
struct IpLinkJson {
    ifindex: u32,
    ifname: String,
    #[serde(default)]
    mtu: u32,
    #[serde(default)]
    operstate: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    linkinfo: Option<IpLinkInfoJson>,
}

#[derive(Deserialize)]
struct IpLinkInfoJson {
    #[serde(default)]
    info_kind: Option<String>,
}

/// Parses `ip -j -d link show` output for a single device.
///
/// Empty output means the device does not exist.
pub(crate) fn parse_link_json(name: &str, output: &str) -> GwResult<Link> {
    if output.trim().is_empty() {
        return Err(GwError::not_found(name));
    }
    let mut links: Vec<IpLinkJson> = serde_json::from_str(output)
        .map_err(|e| GwError::netlink("link show", format!("{}: {}", name, e)))?;
    if links.is_empty() {
        return Err(GwError::not_found(name));
    }
    let link = links.swap_remove(0);
    Ok(Link {
        name: link.ifname,
        ifindex: link.ifindex,
        kind: link.linkinfo.and_then(|info| info.info_kind),
        mtu: link.mtu,
        // non-ethernet devices report addresses that are not MACs
        address: link.address.and_then(|a| a.parse().ok()),
        oper_state: link.operstate,
    })
}

#[async_trait]
impl LinkAdapter for IpRoute2 {
    #[instrument(skip(self, spec), fields(link = %spec.name, kind = spec.kind.as_str()))]
    async fn link_add(&self, spec: &LinkSpec) -> GwResult<()> {
        self.exec(&build_link_add_cmd(spec))
            .await
            .map_err(|e| GwError::netlink("link add", e.to_string()))?;
        if let Some(master) = &spec.master {
            self.exec(&build_link_set_master_cmd(&spec.name, master))
                .await
                .map_err(|e| GwError::netlink("link set master", e.to_string()))?;
        }
        self.exec(&build_link_set_up_cmd(&spec.name))
            .await
            .map_err(|e| GwError::netlink("link set up", e.to_string()))?;
        debug!("Created link {}", spec.name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn link_del(&self, name: &str) -> GwResult<()> {
        self.exec(&build_link_del_cmd(name))
            .await
            .map_err(|e| GwError::netlink("link del", e.to_string()))?;
        debug!("Deleted link {}", name);
        Ok(())
    }

    async fn link_by_name(&self, name: &str) -> GwResult<Link> {
        match self.exec(&build_link_show_cmd(name)).await {
            Ok(output) => parse_link_json(name, &output),
            Err(GwError::ShellCommandFailed { .. }) => Err(GwError::not_found(name)),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, link), fields(link = %link.name))]
    async fn link_modify(&self, link: &Link) -> GwResult<()> {
        self.exec(&build_link_set_up_cmd(&link.name))
            .await
            .map_err(|e| GwError::netlink("link modify", e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn addr_add(&self, name: &str, prefix: &IpPrefix) -> GwResult<()> {
        self.exec(&build_addr_add_cmd(name, prefix))
            .await
            .map_err(|e| GwError::netlink("address add", e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn bridge_vlan_add(
        &self,
        dev: &str,
        vlan: VlanId,
        mode: TaggingMode,
        on_bridge: bool,
    ) -> GwResult<()> {
        self.exec(&build_bridge_vlan_add_cmd(dev, vlan, mode, on_bridge))
            .await
            .map_err(|e| GwError::netlink("bridge vlan add", e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn bridge_vlan_del(&self, dev: &str, vlan: VlanId, on_bridge: bool) -> GwResult<()> {
        self.exec(&build_bridge_vlan_del_cmd(dev, vlan, on_bridge))
            .await
            .map_err(|e| GwError::netlink("bridge vlan del", e.to_string()))?;
        Ok(())
    }
}
