// Template migration against a mock dashboard.
#![allow(clippy::unwrap_used)]

mod common;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitedeploy_core::{AssumeYes, CoreError, MigrationRequest, RecordingReporter, migrate};

use common::{api, mount_networks, mount_templates, mount_vlan_updates, mount_vlans, requests_to, setup};

fn request(network: &str, template: &str) -> MigrationRequest {
    MigrationRequest {
        network: network.into(),
        template: template.into(),
    }
}

fn site_vlans() -> Value {
    json!([
        {
            "id": 2, "name": "Guest",
            "subnet": "172.16.0.0/22", "applianceIp": "172.16.0.1",
            "dhcpHandling": "Run a DHCP server",
            "dhcpLeaseTime": "1 hour",
            "dnsNameservers": "google_dns",
        },
        {
            "id": 10, "name": "10-Voice",
            "subnet": "10.10.20.64/27", "applianceIp": "10.10.20.65",
            "dhcpHandling": "Relay DHCP to another server",
            "dhcpRelayServerIps": ["10.200.0.10"],
            "mandatoryDhcp": { "enabled": true },
        },
        {
            "id": 20, "name": "20-POS-HUB",
            "subnet": "10.10.20.96/27", "applianceIp": "10.10.20.97",
            "dhcpHandling": "Run a DHCP server",
            "dhcpLeaseTime": "1 day",
            "dhcpBootOptionsEnabled": false,
            "fixedIpAssignments": { "00:11:22:33:44:55": { "ip": "10.10.20.100", "name": "hub" } },
            "reservedIpRanges": [{ "start": "10.10.20.98", "end": "10.10.20.99", "comment": "" }],
            "dnsNameservers": "upstream_dns",
        },
        {
            "id": 60, "name": "60-NonIT",
            "subnet": "10.10.20.224/27", "applianceIp": "10.10.20.225",
            "dhcpHandling": "Do not respond to DHCP requests",
        },
    ])
}

/// Network `GB_MTB` bound to `L_1`, templates `L_1` and `L_2`.
async fn mount_site(server: &MockServer) {
    mount_networks(
        server,
        json!([{ "id": "N_5", "name": "GB_MTB", "configTemplateId": "L_1", "isBoundToConfigTemplate": true }]),
    )
    .await;
    mount_templates(
        server,
        json!([
            { "id": "L_1", "name": "EMEA - BTQ Template" },
            { "id": "L_2", "name": "EMEA - Large BTQ Template" },
        ]),
    )
    .await;
    mount_vlans(server, "N_5", site_vlans()).await;
    mount_vlan_updates(server, "N_5").await;
}

async fn mount_unbind(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(api("networks/N_5/unbind")))
        .and(body_json(json!({ "retainConfigs": true })))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "errors": ["not bound"] })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_bind(server: &MockServer, template_id: &str) {
    Mock::given(method("POST"))
        .and(path(api("networks/N_5/bind")))
        .and(body_json(json!({ "configTemplateId": template_id, "autoBind": false })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_same_template_round_trip_preserves_addressing() {
    let (server, session) = setup().await;
    mount_site(&server).await;
    mount_unbind(&server, 200).await;
    mount_bind(&server, "L_1").await;

    let report = migrate(
        &session,
        request("GB_MTB", "EMEA - BTQ Template"),
        &AssumeYes,
        &RecordingReporter::new(),
    )
    .await
    .unwrap();

    assert!(report.is_complete());
    assert!(report.unbound);
    assert_eq!(report.previous_template_id.as_deref(), Some("L_1"));
    assert_eq!(report.snapshot.len(), 4);

    let captured = site_vlans();
    for vlan in captured.as_array().unwrap() {
        let id = vlan["id"].as_u64().unwrap();
        let sent = requests_to(&server, "PUT", &format!("networks/N_5/appliance/vlans/{id}")).await;
        assert_eq!(sent.len(), 1, "VLAN {id} replayed once");
        let sent = &sent[0];

        assert_eq!(sent["dhcpHandling"], vlan["dhcpHandling"], "VLAN {id}");
        if id == 2 {
            // Same-subnet VLAN: addressing comes from the template.
            assert_eq!(sent.get("subnet"), None);
            assert_eq!(sent.get("applianceIp"), None);
        } else {
            assert_eq!(sent["subnet"], vlan["subnet"], "VLAN {id}");
            assert_eq!(sent["applianceIp"], vlan["applianceIp"], "VLAN {id}");
        }
    }

    let voice = requests_to(&server, "PUT", "networks/N_5/appliance/vlans/10").await;
    assert_eq!(voice[0]["dhcpRelayServerIps"], json!(["10.200.0.10"]));
    assert_eq!(voice[0]["mandatoryDhcp"], json!({ "enabled": true }));

    let pos = requests_to(&server, "PUT", "networks/N_5/appliance/vlans/20").await;
    assert_eq!(pos[0]["dhcpLeaseTime"], "1 day");
    assert_eq!(pos[0]["reservedIpRanges"][0]["start"], "10.10.20.98");
    assert_eq!(pos[0]["fixedIpAssignments"]["00:11:22:33:44:55"]["ip"], "10.10.20.100");
}

#[tokio::test]
async fn test_single_substring_candidate_is_confirmed() {
    let (server, session) = setup().await;
    mount_site(&server).await;
    mount_unbind(&server, 200).await;
    mount_bind(&server, "L_2").await;

    let report = migrate(
        &session,
        request("GB_MTB", "Large"),
        &AssumeYes,
        &RecordingReporter::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.template, "EMEA - Large BTQ Template");
}

#[tokio::test]
async fn test_ambiguous_template_changes_nothing() {
    let (server, session) = setup().await;
    mount_site(&server).await;

    Mock::given(method("POST"))
        .and(path(api("networks/N_5/unbind")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = migrate(
        &session,
        request("GB_MTB", "BTQ"),
        &AssumeYes,
        &RecordingReporter::new(),
    )
    .await
    .unwrap_err();

    match err {
        CoreError::AmbiguousMatch { candidates, .. } => assert_eq!(
            candidates,
            vec!["EMEA - BTQ Template", "EMEA - Large BTQ Template"]
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unknown_network() {
    let (server, session) = setup().await;
    mount_site(&server).await;

    let err = migrate(
        &session,
        request("FR_CAR", "EMEA - BTQ Template"),
        &AssumeYes,
        &RecordingReporter::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::NetworkNotFound { .. }));
}

#[tokio::test]
async fn test_unbind_failure_only_warns() {
    let (server, session) = setup().await;
    mount_site(&server).await;
    mount_unbind(&server, 400).await;
    mount_bind(&server, "L_1").await;

    let reporter = RecordingReporter::new();
    let report = migrate(
        &session,
        request("GB_MTB", "EMEA - BTQ Template"),
        &AssumeYes,
        &reporter,
    )
    .await
    .unwrap();

    assert!(!report.unbound);
    assert!(report.is_complete());
    assert!(
        reporter
            .warnings()
            .iter()
            .any(|w| w.contains("possibly not bound"))
    );
}

#[tokio::test]
async fn test_capture_failure_aborts_before_unbind() {
    let (server, session) = setup().await;
    mount_networks(&server, json!([{ "id": "N_5", "name": "GB_MTB" }])).await;
    mount_templates(&server, json!([{ "id": "L_1", "name": "EMEA - BTQ Template" }])).await;

    Mock::given(method("GET"))
        .and(path(api("networks/N_5/appliance/vlans")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "errors": ["VLANs are not enabled"] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api("networks/N_5/unbind")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = migrate(
        &session,
        request("GB_MTB", "EMEA - BTQ Template"),
        &AssumeYes,
        &RecordingReporter::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::Api { status: Some(400), .. }));
}

#[tokio::test]
async fn test_replay_continues_past_failures() {
    let (server, session) = setup().await;
    mount_networks(&server, json!([{ "id": "N_5", "name": "GB_MTB" }])).await;
    mount_templates(&server, json!([{ "id": "L_1", "name": "EMEA - BTQ Template" }])).await;
    mount_vlans(
        &server,
        "N_5",
        json!([
            { "id": 10, "name": "Voice", "subnet": "10.0.0.64/27", "applianceIp": "10.0.0.65",
              "dhcpHandling": "Relay DHCP to another server", "dhcpRelayServerIps": ["10.9.9.9"] },
            { "id": 30, "name": "Odd", "subnet": "10.0.0.128/27", "applianceIp": "10.0.0.129",
              "dhcpHandling": "Something new" },
            { "id": 60, "name": "NonIT", "subnet": "10.0.0.224/27", "applianceIp": "10.0.0.225",
              "dhcpHandling": "Do not respond to DHCP requests" },
        ]),
    )
    .await;
    mount_vlan_updates(&server, "N_5").await;
    Mock::given(method("PUT"))
        .and(path(api("networks/N_5/appliance/vlans/10")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "errors": ["bad relay"] })))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_unbind(&server, 200).await;
    mount_bind(&server, "L_1").await;

    let report = migrate(
        &session,
        request("GB_MTB", "EMEA - BTQ Template"),
        &AssumeYes,
        &RecordingReporter::new(),
    )
    .await
    .unwrap();

    assert!(!report.is_complete());
    let statuses: Vec<(u16, &str)> = report
        .vlans
        .iter()
        .map(|v| (v.id, v.status.label()))
        .collect();
    assert_eq!(statuses, vec![(10, "failed"), (30, "failed"), (60, "ok")]);
    // Unknown handling is never sent.
    assert!(requests_to(&server, "PUT", "networks/N_5/appliance/vlans/30").await.is_empty());
}
