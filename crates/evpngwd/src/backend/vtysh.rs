//! FRR adapter driving `vtysh`.

use async_trait::async_trait;
use evpn_gw_common::{shell, GwError, GwResult};
use tracing::{debug, info, instrument};

#[cfg(test)]
use parking_lot::Mutex;

use super::{FrrAdapter, FrrVrfConfig};
use crate::commands::{build_vtysh_cmd, frr_vrf_config_lines, frr_vrf_remove_lines};

/// Configures bgpd/zebra through the integrated vtysh shell.
///
/// VRFs without an L3 VNI are not part of the EVPN fabric and need no
/// routing-daemon configuration.
#[derive(Default)]
pub struct Vtysh {
    #[cfg(test)]
    mock_mode: bool,
    #[cfg(test)]
    captured_commands: Mutex<Vec<String>>,
}

impl Vtysh {
    pub fn new() -> Self {
        Self::default()
    }

    async fn exec(&self, operation: &str, lines: &[String]) -> GwResult<()> {
        let cmd = build_vtysh_cmd(lines);

        #[cfg(test)]
        if self.mock_mode {
            self.captured_commands.lock().push(cmd);
            return Ok(());
        }

        shell::exec_checked(&cmd)
            .await
            .map(|_| ())
            .map_err(|e| GwError::frr(operation, e.to_string()))
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

#[async_trait]
impl FrrAdapter for Vtysh {
    #[instrument(skip(self, vrf), fields(vrf = %vrf.name))]
    async fn apply_vrf(&self, vrf: &FrrVrfConfig) -> GwResult<()> {
        let Some(vni) = vrf.vni else {
            debug!("No L3 VNI, skipping FRR configuration");
            return Ok(());
        };
        self.exec("apply vrf", &frr_vrf_config_lines(vrf, vni)).await?;
        info!("Configured FRR for VRF {}", vrf.name);
        Ok(())
    }

    #[instrument(skip(self, vrf), fields(vrf = %vrf.name))]
    async fn remove_vrf(&self, vrf: &FrrVrfConfig) -> GwResult<()> {
        let Some(vni) = vrf.vni else {
            return Ok(());
        };
        self.exec("remove vrf", &frr_vrf_remove_lines(vrf, vni)).await?;
        info!("Removed FRR configuration for VRF {}", vrf.name);
        Ok(())
    }
}
