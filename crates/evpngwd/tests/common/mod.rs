//! In-memory backends for lifecycle tests
//!
//! `FakeLinks` keeps a map of live links so that link lookups behave like
//! the kernel, records every call, and can be told to fail a given
//! operation. `FakeFrr` records applied and removed VRF configurations.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use evpn_gw_common::{GwError, GwResult};
use evpn_types::{IpPrefix, VlanId};
use evpngwd::backend::{FrrAdapter, FrrVrfConfig, Link, LinkAdapter, LinkSpec, TaggingMode};
use evpngwd::types::IFNAME_MAX_LEN;
use evpngwd::{Server, ServerSettings};
use parking_lot::Mutex;

#[derive(Default)]
pub struct FakeLinks {
    links: Mutex<HashMap<String, Link>>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
    next_ifindex: Mutex<u32>,
}

impl FakeLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls, e.g. `link_add blue` or `bridge_vlan_add port1 10 untagged`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn has_link(&self, name: &str) -> bool {
        self.links.lock().contains_key(name)
    }

    pub fn link_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.links.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Make every call whose operation name equals `operation` fail
    pub fn fail_on(&self, operation: &str) {
        *self.fail_on.lock() = Some(operation.to_string());
    }

    pub fn clear_failure(&self) {
        *self.fail_on.lock() = None;
    }

    /// Remove a link behind the server's back
    pub fn remove_out_of_band(&self, name: &str) {
        self.links.lock().remove(name);
    }

    /// Pre-create a link, as if it already existed on the host
    pub fn add_existing(&self, name: &str) {
        self.links.lock().insert(
            name.to_string(),
            Link {
                name: name.to_string(),
                ..Default::default()
            },
        );
    }

    fn record(&self, operation: &str, detail: String) -> GwResult<()> {
        self.calls.lock().push(format!("{} {}", operation, detail));
        if self.fail_on.lock().as_deref() == Some(operation) {
            return Err(GwError::netlink(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkAdapter for FakeLinks {
    async fn link_add(&self, spec: &LinkSpec) -> GwResult<()> {
        self.record("link_add", spec.name.clone())?;
        if spec.name.len() > IFNAME_MAX_LEN {
            return Err(GwError::netlink(
                "link_add",
                format!("\"{}\" not a valid ifname", spec.name),
            ));
        }
        let mut links = self.links.lock();
        if links.contains_key(&spec.name) {
            return Err(GwError::netlink("link_add", "file exists"));
        }
        let mut next = self.next_ifindex.lock();
        *next += 1;
        links.insert(
            spec.name.clone(),
            Link {
                name: spec.name.clone(),
                ifindex: *next,
                kind: Some(spec.kind.as_str().to_string()),
                mtu: 1500,
                address: spec.address,
                oper_state: "UP".to_string(),
            },
        );
        Ok(())
    }

    async fn link_del(&self, name: &str) -> GwResult<()> {
        self.record("link_del", name.to_string())?;
        self.links
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| GwError::netlink("link_del", format!("cannot find device {}", name)))
    }

    async fn link_by_name(&self, name: &str) -> GwResult<Link> {
        self.record("link_by_name", name.to_string())?;
        self.links
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| GwError::not_found(name))
    }

    async fn link_modify(&self, link: &Link) -> GwResult<()> {
        self.record("link_modify", link.name.clone())
    }

    async fn addr_add(&self, name: &str, prefix: &IpPrefix) -> GwResult<()> {
        self.record("addr_add", format!("{} {}", name, prefix))
    }

    async fn bridge_vlan_add(
        &self,
        dev: &str,
        vlan: VlanId,
        mode: TaggingMode,
        on_bridge: bool,
    ) -> GwResult<()> {
        let mode = match mode {
            TaggingMode::Tagged => "tagged",
            TaggingMode::Untagged => "untagged",
        };
        let target = if on_bridge { " self" } else { "" };
        self.record("bridge_vlan_add", format!("{} {} {}{}", dev, vlan, mode, target))
    }

    async fn bridge_vlan_del(&self, dev: &str, vlan: VlanId, on_bridge: bool) -> GwResult<()> {
        let target = if on_bridge { " self" } else { "" };
        self.record("bridge_vlan_del", format!("{} {}{}", dev, vlan, target))
    }
}

#[derive(Default)]
pub struct FakeFrr {
    applied: Mutex<Vec<FrrVrfConfig>>,
    removed: Mutex<Vec<FrrVrfConfig>>,
    fail: Mutex<bool>,
}

impl FakeFrr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Vec<FrrVrfConfig> {
        self.applied.lock().clone()
    }

    pub fn removed(&self) -> Vec<FrrVrfConfig> {
        self.removed.lock().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl FrrAdapter for FakeFrr {
    async fn apply_vrf(&self, vrf: &FrrVrfConfig) -> GwResult<()> {
        if *self.fail.lock() {
            return Err(GwError::frr("apply vrf", "vtysh connection refused"));
        }
        self.applied.lock().push(vrf.clone());
        Ok(())
    }

    async fn remove_vrf(&self, vrf: &FrrVrfConfig) -> GwResult<()> {
        if *self.fail.lock() {
            return Err(GwError::frr("remove vrf", "vtysh connection refused"));
        }
        self.removed.lock().push(vrf.clone());
        Ok(())
    }
}

pub struct Harness {
    pub server: Arc<Server>,
    pub links: Arc<FakeLinks>,
    pub frr: Arc<FakeFrr>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(ServerSettings {
            vtep_ip: Some("10.0.0.1".parse().unwrap()),
            ..Default::default()
        })
    }

    pub fn with_settings(settings: ServerSettings) -> Self {
        let links = Arc::new(FakeLinks::new());
        let frr = Arc::new(FakeFrr::new());
        let server = Arc::new(Server::new(links.clone(), frr.clone(), settings));
        Self { server, links, frr }
    }
}
