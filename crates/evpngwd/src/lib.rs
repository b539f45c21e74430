//! EVPN gateway daemon
//!
//! Lifecycle manager for VRFs, logical bridges and bridge ports. Requests
//! arrive over the REST API in [`rest_api`], are orchestrated by
//! [`server::Server`] and realized through the kernel-link and FRR
//! backends in [`backend`].

pub mod backend;
pub mod commands;
pub mod config;
pub mod derive;
pub mod pagination;
pub mod resource_id;
pub mod rest_api;
pub mod server;
pub mod store;
pub mod tenant_bridge;
pub mod types;
pub mod validate;

pub use backend::{FrrAdapter, LinkAdapter};
pub use config::GatewayConfig;
pub use server::{Server, ServerSettings};
