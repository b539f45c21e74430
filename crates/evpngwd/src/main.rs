//! EVPN gateway daemon entry point.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use evpngwd::backend::{IpRoute2, Vtysh};
use evpngwd::config::{GatewayConfig, DEFAULT_CONFIG_PATH};
use evpngwd::rest_api;
use evpngwd::tenant_bridge::ensure_tenant_bridge;
use evpngwd::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// EVPN gateway control-plane daemon
#[derive(Parser, Debug)]
#[command(name = "evpngwd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// API listen address (overrides the config file)
    #[arg(short = 'l', long)]
    listen: Option<SocketAddr>,

    /// Local AS for per-VRF BGP instances
    #[arg(long)]
    local_as: Option<u32>,

    /// VLAN-aware bridge carrying all logical bridges
    #[arg(long)]
    tenant_bridge: Option<String>,

    /// Local VTEP address for VXLAN devices
    #[arg(long)]
    vtep_ip: Option<IpAddr>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Overlay command-line values on top of the file configuration
    fn apply(self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(listen) = self.listen {
            config.server.listen_addr = listen;
        }
        if let Some(local_as) = self.local_as {
            config.evpn.local_as = local_as;
        }
        if let Some(tenant_bridge) = self.tenant_bridge {
            config.evpn.tenant_bridge = tenant_bridge;
        }
        if self.vtep_ip.is_some() {
            config.evpn.vtep_ip = self.vtep_ip;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        config.logging.json |= self.log_json;
        config
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {:?}", level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("evpngwd: Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = GatewayConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let config = args.apply(config);
    config.validate()?;

    init_logging(&config.logging.level, config.logging.json)?;

    info!("Starting evpngwd");
    info!("Local AS: {}", config.evpn.local_as);
    info!("Tenant bridge: {}", config.evpn.tenant_bridge);
    if let Some(vtep) = config.evpn.vtep_ip {
        info!("VTEP address: {}", vtep);
    }

    let link = Arc::new(IpRoute2::new());
    ensure_tenant_bridge(link.as_ref(), &config.evpn.tenant_bridge).await?;

    let server = Arc::new(Server::new(link, Arc::new(Vtysh::new()), config.settings()));
    let app = rest_api::router(server);

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.server.listen_addr))?;
    info!("evpngwd: Listening on http://{}", config.server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("evpngwd: Shutdown complete");
    Ok(())
}
