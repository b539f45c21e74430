//! Tenant bridge initialization
//!
//! All logical bridges share one VLAN-aware Linux bridge; each logical
//! bridge is a VLAN on it and bridge ports are enslaved to it.

use evpn_gw_common::{Code, GwResult};
use tracing::{debug, info};

use crate::backend::{LinkAdapter, LinkKind, LinkSpec};

/// Check if the tenant bridge already exists
pub async fn bridge_exists(link: &dyn LinkAdapter, name: &str) -> GwResult<bool> {
    match link.link_by_name(name).await {
        Ok(_) => Ok(true),
        Err(e) if e.code() == Code::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Create the tenant bridge with VLAN filtering unless it is already present
///
/// Called once on daemon startup, before the API starts serving.
pub async fn ensure_tenant_bridge(link: &dyn LinkAdapter, name: &str) -> GwResult<()> {
    if bridge_exists(link, name).await? {
        debug!("Tenant bridge {} already exists", name);
        return Ok(());
    }

    info!("Creating tenant bridge {}", name);
    link.link_add(&LinkSpec::new(
        name,
        LinkKind::Bridge {
            vlan_filtering: true,
        },
    ))
    .await?;
    info!("Tenant bridge {} created with VLAN filtering", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::IpRoute2;

    #[tokio::test]
    async fn test_ensure_tenant_bridge_creates_missing_bridge() {
        // mock mode reports every link as absent
        let ip = IpRoute2::new().with_mock_mode();
        ensure_tenant_bridge(&ip, "br-tenant").await.unwrap();

        let cmds = ip.captured_commands();
        assert!(cmds[0].contains("link show dev \"br-tenant\""));
        assert!(cmds[1].contains("link add \"br-tenant\" type bridge vlan_filtering 1"));
    }

    #[tokio::test]
    async fn test_bridge_exists_mock_mode() {
        let ip = IpRoute2::new().with_mock_mode();
        assert!(!bridge_exists(&ip, "br-tenant").await.unwrap());
    }
}
