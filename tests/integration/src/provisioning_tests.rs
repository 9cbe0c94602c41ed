//! End-to-end provisioning cycle
//!
//! Drives the workflow against a mocked SoftLayer API and a temporary boot
//! server: prepare -> apply -> completion notification, then checks the DHCP
//! configuration is back to having no hosts while the subnets stay.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use pxe_core::{
    ApplyOptions, CompletionHandler, Manifest, PrepareOptions, Provisioner, Selection,
    ServiceControl,
};
use pxe_dhcpconf::{BlockType, ConfigDocument};
use pxe_softlayer::{Credentials, SoftLayerClient};
use pxe_test_utils::TestWorkspace;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOOT_IP: &str = "10.0.0.2";

#[derive(Default)]
struct RecordingService {
    restarts: Mutex<Vec<String>>,
}

#[async_trait]
impl ServiceControl for RecordingService {
    async fn restart(&self, unit: &str) -> pxe_core::Result<()> {
        self.restarts.lock().unwrap().push(unit.to_string());
        Ok(())
    }
}

fn subnet_json(id: u64, prefix: &str, kind: &str) -> serde_json::Value {
    json!({
        "id": id,
        "networkIdentifier": format!("{prefix}.0"),
        "netmask": "255.255.255.192",
        "broadcastAddress": format!("{prefix}.63"),
        "gateway": format!("{prefix}.1"),
        "addressSpace": "PRIVATE",
        "subnetType": kind
    })
}

/// Mock every API call of a prepare/apply cycle for host `web1`.
async fn mock_api(server: &MockServer, reboots: u64) {
    Mock::given(method("GET"))
        .and(path("/SoftLayer_Account/getHardware.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "hostname": "web1",
            "domain": "lab.example.com",
            "operatingSystem": {"passwords": [
                {"username": "admin", "password": "nope"},
                {"username": "root", "password": "r00t"}
            ]},
            "tagReferences": [{"tag": {"name": "kvmhost"}}, {"tag": {"name": "rack-3"}}],
            "networkComponents": [
                {"name": "mgmt", "port": 0, "macAddress": "00:00:00:00:00:99"},
                {"name": "eth", "port": 0, "macAddress": "0c:c4:7a:00:00:01"}
            ]
        }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/SoftLayer_Account/getNetworkVlans.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1234,
            "name": "provisioning",
            "vlanNumber": 901,
            "subnets": [
                subnet_json(200, "10.1.0", "SECONDARY_ON_VLAN"),
                subnet_json(201, "10.9.0", "ADDITIONAL_PRIMARY")
            ]
        }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/SoftLayer_Network_Subnet/getSubnetForIpAddress/{BOOT_IP}.json"
        )))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(subnet_json(100, "10.0.0", "ADDITIONAL_PRIMARY")),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/SoftLayer_Network_Subnet/200/getIpAddresses.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "ipAddress": "10.1.0.10", "isReserved": true, "note": "web1"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/SoftLayer_Hardware_Server/1/rebootSoft.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(reboots)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_provisioning_cycle() {
    let server = MockServer::start().await;
    mock_api(&server, 1).await;
    let ws = TestWorkspace::new();

    let manifest = Manifest::load(&ws.manifest_path()).unwrap();
    let client = SoftLayerClient::with_endpoint(
        Credentials {
            username: "tester".into(),
            api_key: "key".into(),
        },
        server.uri(),
    )
    .unwrap();
    let provisioner = Provisioner::new(manifest, Arc::new(client), BOOT_IP);

    // prepare
    let report = provisioner
        .prepare(&Selection::hostnames("web1"), PrepareOptions::default())
        .await
        .unwrap();
    assert!(report.saved);
    assert_eq!(report.hosts[0].ip, "10.1.0.10");
    ws.assert_file_contains("dhcpd.conf", "hardware ethernet 0c:c4:7a:00:00:01;");
    ws.assert_file_contains("www/autoyast/0A01000A", "<hostname>web1</hostname>");
    assert!(!ws.dhcp_conf().contains("10.9.0.0"));

    // apply
    let service = Arc::new(RecordingService::default());
    let applied = provisioner
        .apply(ApplyOptions::default(), service.as_ref())
        .await
        .unwrap();
    assert!(applied.triggered);
    assert_eq!(applied.devices[0].password.as_deref(), Some("r00t"));

    // completion
    let handler = CompletionHandler::from_manifest(provisioner.manifest(), service.clone());
    assert_eq!(handler.installation_completed("web1").await.unwrap(), 0);
    assert_eq!(
        *service.restarts.lock().unwrap(),
        vec!["isc-dhcp-server".to_string(); 2]
    );

    insta::assert_snapshot!(ws.dhcp_conf(), @r###"
    ddns-update-style none;
    authoritative;
    shared-network provisioning {
      subnet 10.0.0.0 netmask 255.255.255.192 {
        option routers 10.0.0.1;
        option broadcast-address 10.0.0.63;
        option subnet-mask 255.255.255.192;
        next-server 10.0.0.2;
      }
      subnet 10.1.0.0 netmask 255.255.255.192 {
        option routers 10.1.0.1;
        option broadcast-address 10.1.0.63;
        option subnet-mask 255.255.255.192;
        next-server 10.0.0.2;
      }
    }
    group {
      next-server 10.0.0.2;
    }
    "###);

    let doc = ConfigDocument::from_file(ws.dhcp_conf_path()).unwrap();
    assert!(doc.group().unwrap().children(BlockType::Host).is_none());
}

#[tokio::test]
async fn test_prepare_after_completion_restores_host() {
    let server = MockServer::start().await;
    mock_api(&server, 0).await;
    let ws = TestWorkspace::new();
    let manifest = Manifest::load(&ws.manifest_path()).unwrap();
    let client = SoftLayerClient::with_endpoint(
        Credentials {
            username: "tester".into(),
            api_key: "key".into(),
        },
        server.uri(),
    )
    .unwrap();
    let provisioner = Provisioner::new(manifest, Arc::new(client), BOOT_IP);
    let selection = Selection::hostnames("web1");

    provisioner.prepare(&selection, PrepareOptions::default()).await.unwrap();
    let prepared = ws.dhcp_conf();

    let handler =
        CompletionHandler::from_manifest(provisioner.manifest(), Arc::new(RecordingService::default()));
    handler.installation_completed("web1").await.unwrap();

    // only the host section comes back; the subnets were never removed
    let again = provisioner.prepare(&selection, PrepareOptions::default()).await.unwrap();
    assert_eq!(again.changes.len(), 1);
    assert_eq!(ws.dhcp_conf(), prepared);
}
