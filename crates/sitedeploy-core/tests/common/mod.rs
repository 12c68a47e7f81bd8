// Shared wiremock fixtures for workflow tests.
#![allow(clippy::unwrap_used, dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitedeploy_api::types::Organization;
use sitedeploy_api::{DashboardClient, RetryPolicy};
use sitedeploy_core::{Pacing, Session};

pub const ORG: &str = "100";

/// A mock dashboard and a session bound to organization `100` with no pacing.
pub async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let client = DashboardClient::from_reqwest(
        &server.uri(),
        reqwest::Client::new(),
        RetryPolicy::immediate(3),
    )
    .unwrap();
    let org = Organization {
        id: ORG.into(),
        name: "RISA".into(),
    };
    (server, Session::from_parts(client, org, Pacing::none()))
}

pub fn api(suffix: &str) -> String {
    format!("/api/v1/{suffix}")
}

// ── Listings ────────────────────────────────────────────────────────

pub async fn mount_networks(server: &MockServer, networks: Value) {
    Mock::given(method("GET"))
        .and(path(api(&format!("organizations/{ORG}/networks"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(networks))
        .mount(server)
        .await;
}

pub async fn mount_templates(server: &MockServer, templates: Value) {
    Mock::given(method("GET"))
        .and(path(api(&format!("organizations/{ORG}/configTemplates"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(templates))
        .mount(server)
        .await;
}

// ── Inventory ───────────────────────────────────────────────────────

/// Organization claims are always accepted.
pub async fn mount_org_claim(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(api(&format!("organizations/{ORG}/inventory/claim"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

pub async fn mount_inventory(server: &MockServer, serial: &str, model: &str, network_id: Option<&str>) {
    Mock::given(method("GET"))
        .and(path(api(&format!(
            "organizations/{ORG}/inventory/devices/{serial}"
        ))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "serial": serial,
            "model": model,
            "networkId": network_id,
        })))
        .mount(server)
        .await;
}

/// Any serial without its own inventory mock is unknown to the dashboard.
pub async fn mount_inventory_fallback_404(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/organizations/100/inventory/devices/.+$"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"errors": ["Device not found"]})),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

// ── Devices ─────────────────────────────────────────────────────────

pub async fn mount_network_claim(server: &MockServer, network_id: &str) {
    Mock::given(method("POST"))
        .and(path(api(&format!("networks/{network_id}/devices/claim"))))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// The device record as seen after it landed on `network_id`.
pub async fn mount_device(server: &MockServer, serial: &str, model: &str, network_id: &str) {
    let body = json!({ "serial": serial, "model": model, "networkId": network_id });
    Mock::given(method("GET"))
        .and(path(api(&format!("devices/{serial}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path(api(&format!("devices/{serial}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── VLANs ───────────────────────────────────────────────────────────

pub async fn mount_vlans(server: &MockServer, network_id: &str, vlans: Value) {
    Mock::given(method("GET"))
        .and(path(api(&format!("networks/{network_id}/appliance/vlans"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(vlans))
        .mount(server)
        .await;
}

/// Every VLAN PUT succeeds and echoes a minimal VLAN.
pub async fn mount_vlan_updates(server: &MockServer, network_id: &str) {
    Mock::given(method("PUT"))
        .and(path_regex(format!(
            r"^/api/v1/networks/{network_id}/appliance/vlans/\d+$"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "ok"})))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Template-default VLANs of a BTQ network before remapping.
pub fn btq_template_vlans() -> Value {
    let vlan = |id: u16, name: &str, handling: &str| {
        let mut vlan = json!({
            "id": id.to_string(),
            "name": name,
            "subnet": format!("192.168.{}.0/24", id % 256),
            "applianceIp": format!("192.168.{}.1", id % 256),
            "dhcpHandling": handling,
        });
        if handling.starts_with("Relay") {
            vlan["dhcpRelayServerIps"] = json!(["10.200.0.10", "10.200.0.11"]);
        }
        vlan
    };
    json!([
        vlan(10, "10-Voice", "Relay DHCP to another server"),
        vlan(20, "20-POS-HUB", "Run a DHCP server"),
        vlan(30, "30-CC_Terms", "Run a DHCP server"),
        vlan(50, "50-PCs-Printers", "Relay DHCP to another server"),
        vlan(60, "60-NonIT", "Do not respond to DHCP requests"),
        vlan(100, "100-Reserved", "Run a DHCP server"),
        vlan(400, "Management", "Relay DHCP to another server"),
    ])
}

/// Requests the server received for `verb` on `suffix`.
pub async fn requests_to(server: &MockServer, verb: &str, suffix: &str) -> Vec<Value> {
    let wanted = api(suffix);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == wanted)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}
