//! VRF lifecycle against in-memory backends

mod common;

use std::collections::HashSet;

use common::Harness;
use evpn_gw_common::Code;
use evpn_types::Vni;
use evpngwd::types::{
    CreateVrfRequest, DeleteRequest, GetRequest, ListRequest, UpdateVrfRequest, Vrf, VrfSpec,
    IFNAME_MAX_LEN,
};
use pretty_assertions::assert_eq;

fn create_request(id: &str, vni: Option<u32>) -> CreateVrfRequest {
    CreateVrfRequest {
        vrf_id: id.to_string(),
        vrf: Vrf {
            spec: VrfSpec {
                vni: vni.map(|v| Vni::new(v).unwrap()),
                ..Default::default()
            },
            ..Default::default()
        },
    }
}

fn delete_request(name: &str, allow_missing: bool) -> DeleteRequest {
    DeleteRequest {
        name: name.to_string(),
        allow_missing,
    }
}

#[tokio::test]
async fn test_create_is_idempotent() {
    let h = Harness::new();

    let first = h.server.create_vrf(create_request("blue", Some(1000))).await.unwrap();
    let calls_after_first = h.links.calls().len();
    let second = h.server.create_vrf(create_request("blue", Some(1000))).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.name, "vrfs/blue");
    assert_eq!(h.links.calls().len(), calls_after_first);
    assert_eq!(h.frr.applied().len(), 1);
}

#[tokio::test]
async fn test_routing_table_derivation() {
    let h = Harness::new();

    let with_vni = h.server.create_vrf(create_request("blue", Some(12))).await.unwrap();
    assert_eq!(with_vni.status.routing_table, 1003);

    let without_vni = h.server.create_vrf(create_request("red1", None)).await.unwrap();
    assert_eq!(without_vni.status.routing_table, 1000);
    assert_eq!(without_vni.status.local_as, 4);
}

#[tokio::test]
async fn test_create_realizes_l3_devices() {
    let h = Harness::new();
    let vrf = h.server.create_vrf(create_request("blue", Some(100))).await.unwrap();

    assert_eq!(h.links.link_names(), ["blue", "br100", "vni100"]);
    assert!(vrf.status.rmac.is_local());
    assert!(!vrf.status.rmac.is_multicast());

    let applied = h.frr.applied();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].name, "blue");
    assert_eq!(applied[0].vni, Some(Vni::new(100).unwrap()));
}

#[tokio::test]
async fn test_create_with_system_generated_id() {
    let h = Harness::new();
    let vrf = h.server.create_vrf(create_request("", Some(100))).await.unwrap();
    let id = vrf.name.strip_prefix("vrfs/").unwrap();
    assert!(!id.is_empty());
    assert!(id.len() <= IFNAME_MAX_LEN, "{} does not fit an ifname", id);
    assert!(h.links.has_link(id));
}

#[tokio::test]
async fn test_create_rejects_id_longer_than_ifname() {
    let h = Harness::new();
    let err = h
        .server
        .create_vrf(create_request("tenant-blue-vrf1", None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    assert!(h.links.calls().is_empty());

    h.server
        .create_vrf(create_request("tenant-blue-vrf", None))
        .await
        .unwrap();
    assert!(h.links.has_link("tenant-blue-vrf"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_realize_once() {
    let h = Harness::new();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let server = h.server.clone();
            tokio::spawn(async move { server.create_vrf(create_request("blue", Some(100))).await })
        })
        .collect();

    let mut rmacs = HashSet::new();
    for task in tasks {
        let vrf = task.await.unwrap().unwrap();
        assert_eq!(vrf.name, "vrfs/blue");
        rmacs.insert(vrf.status.rmac);
    }

    assert_eq!(rmacs.len(), 1);
    let adds = h
        .links
        .calls()
        .into_iter()
        .filter(|c| c == "link_add blue")
        .count();
    assert_eq!(adds, 1);
    assert_eq!(h.frr.applied().len(), 1);
}

#[tokio::test]
async fn test_create_rejects_bad_id() {
    let h = Harness::new();
    let err = h.server.create_vrf(create_request("Blue_1", None)).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    assert!(h.links.calls().is_empty());
}

#[tokio::test]
async fn test_frr_failure_leaves_no_store_entry() {
    let h = Harness::new();
    h.frr.set_failing(true);

    let err = h.server.create_vrf(create_request("blue", Some(10))).await.unwrap_err();
    assert_eq!(err.code(), Code::Internal);

    // kernel state from the first step is not rolled back
    assert!(h.links.has_link("blue"));
    let err = h
        .server
        .get_vrf(GetRequest {
            name: "vrfs/blue".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn test_link_failure_aborts_before_frr() {
    let h = Harness::new();
    h.links.fail_on("link_add");

    assert!(h.server.create_vrf(create_request("blue", Some(10))).await.is_err());
    assert!(h.frr.applied().is_empty());
}

#[tokio::test]
async fn test_delete_allow_missing() {
    let h = Harness::new();

    h.server
        .delete_vrf(delete_request("vrfs/nope", true))
        .await
        .unwrap();
    let err = h
        .server
        .delete_vrf(delete_request("vrfs/nope", false))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn test_delete_tears_down_everything() {
    let h = Harness::new();
    h.server.create_vrf(create_request("blue", Some(100))).await.unwrap();

    h.server
        .delete_vrf(delete_request("vrfs/blue", false))
        .await
        .unwrap();

    assert!(h.links.link_names().is_empty());
    assert_eq!(h.frr.removed().len(), 1);
    let page = h.server.list_vrfs(ListRequest::default()).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_delete_failure_keeps_store_entry() {
    let h = Harness::new();
    h.server.create_vrf(create_request("blue", None)).await.unwrap();
    h.links.fail_on("link_del");

    assert!(h
        .server
        .delete_vrf(delete_request("vrfs/blue", false))
        .await
        .is_err());

    h.links.clear_failure();
    let vrf = h
        .server
        .get_vrf(GetRequest {
            name: "vrfs/blue".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(vrf.name, "vrfs/blue");
}

fn request_with_loopback(id: &str, loopback: &str) -> CreateVrfRequest {
    let mut req = create_request(id, Some(12));
    req.vrf.spec.loopback_ip_prefix = Some(loopback.parse().unwrap());
    req
}

#[tokio::test]
async fn test_update_keeps_identity_and_rmac() {
    let h = Harness::new();
    let created = h
        .server
        .create_vrf(request_with_loopback("blue", "10.0.0.1/32"))
        .await
        .unwrap();

    let mut vrf = created.clone();
    vrf.status = Default::default();
    let updated = h.server.update_vrf(UpdateVrfRequest { vrf }).await.unwrap();

    assert_eq!(updated, created);
    assert!(h.links.calls().contains(&"link_modify blue".to_string()));
}

#[tokio::test]
async fn test_update_rejects_address_change() {
    let h = Harness::new();
    let created = h
        .server
        .create_vrf(request_with_loopback("blue", "10.0.0.1/32"))
        .await
        .unwrap();
    let calls_before = h.links.calls().len();

    let mut vrf = created.clone();
    vrf.spec.loopback_ip_prefix = Some("10.9.9.9/32".parse().unwrap());
    let err = h.server.update_vrf(UpdateVrfRequest { vrf }).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    assert!(err.to_string().contains("loopback_ip_prefix"));

    let mut vrf = created.clone();
    vrf.spec.vtep_ip_prefix = Some("192.0.2.1/32".parse().unwrap());
    let err = h.server.update_vrf(UpdateVrfRequest { vrf }).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);

    // nothing reached the kernel and the stored record is untouched
    assert_eq!(h.links.calls().len(), calls_before);
    let stored = h
        .server
        .get_vrf(GetRequest {
            name: "vrfs/blue".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn test_update_requires_live_link() {
    let h = Harness::new();
    let created = h.server.create_vrf(create_request("blue", None)).await.unwrap();
    h.links.remove_out_of_band("blue");

    let err = h
        .server
        .update_vrf(UpdateVrfRequest { vrf: created })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn test_update_missing_vrf() {
    let h = Harness::new();
    let vrf = Vrf {
        name: "vrfs/nope".to_string(),
        ..Default::default()
    };
    let err = h.server.update_vrf(UpdateVrfRequest { vrf }).await.unwrap_err();
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn test_update_rejects_vni_change() {
    let h = Harness::new();
    let mut vrf = h.server.create_vrf(create_request("blue", Some(10))).await.unwrap();
    vrf.spec.vni = Some(Vni::new(20).unwrap());

    let err = h.server.update_vrf(UpdateVrfRequest { vrf }).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_get_requires_live_link() {
    let h = Harness::new();
    h.server.create_vrf(create_request("blue", None)).await.unwrap();
    let req = GetRequest {
        name: "vrfs/blue".to_string(),
    };

    assert!(h.server.get_vrf(req.clone()).await.is_ok());
    h.links.remove_out_of_band("blue");
    assert_eq!(
        h.server.get_vrf(req).await.unwrap_err().code(),
        Code::NotFound
    );
}

#[tokio::test]
async fn test_get_rejects_malformed_name() {
    let h = Harness::new();
    let err = h
        .server
        .get_vrf(GetRequest {
            name: "bridges/blue".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}
