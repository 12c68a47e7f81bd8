// Wire types for the dashboard REST API (v1).
//
// Field names follow the API's camelCase JSON. Response types are lenient
// (`#[serde(default)]` on optional data) because the dashboard omits keys
// that do not apply to a given product type.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Organizations ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub config_template_id: Option<String>,
    #[serde(default)]
    pub is_bound_to_config_template: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCreate {
    pub name: String,
    pub product_types: Vec<String>,
    pub tags: Vec<String>,
    pub time_zone: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ── Configuration templates ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindRequest {
    pub config_template_id: String,
    pub auto_bind: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbindRequest {
    pub retain_configs: bool,
}

// ── Inventory ────────────────────────────────────────────────────────

/// Body for `POST organizations/{org}/inventory/claim`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryClaim {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub serials: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<LicenseClaim>,
}

impl InventoryClaim {
    pub fn serials(serials: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            serials: serials.into_iter().map(Into::into).collect(),
            licenses: Vec::new(),
        }
    }

    pub fn license(key: impl Into<String>) -> Self {
        Self {
            serials: Vec::new(),
            licenses: vec![LicenseClaim {
                key: key.into(),
                mode: "addDevices".into(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseClaim {
    pub key: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDevice {
    pub serial: String,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub claimed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceClaim {
    pub serials: Vec<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub serial: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_map_marker: Option<bool>,
}

// ── Appliance VLANs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatoryDhcp {
    pub enabled: bool,
}

/// A VLAN as returned by `GET networks/{id}/appliance/vlans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceVlan {
    #[serde(deserialize_with = "vlan_id")]
    pub id: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default)]
    pub appliance_ip: Option<String>,
    #[serde(default)]
    pub dhcp_handling: Option<String>,
    #[serde(default)]
    pub dhcp_relay_server_ips: Option<Vec<String>>,
    #[serde(default)]
    pub dhcp_lease_time: Option<String>,
    #[serde(default)]
    pub dhcp_boot_options_enabled: Option<bool>,
    #[serde(default)]
    pub dhcp_options: Option<Vec<Value>>,
    #[serde(default)]
    pub fixed_ip_assignments: Option<Value>,
    #[serde(default)]
    pub reserved_ip_ranges: Option<Vec<Value>>,
    #[serde(default)]
    pub dns_nameservers: Option<String>,
    #[serde(default)]
    pub mandatory_dhcp: Option<MandatoryDhcp>,
}

/// Partial VLAN update; absent fields are left untouched by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appliance_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_handling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_relay_server_ips: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_lease_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_boot_options_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_options: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_assignments: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_ip_ranges: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_nameservers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory_dhcp: Option<MandatoryDhcp>,
}

/// VLAN ids come back as numbers from most shards and as strings from some.
fn vlan_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u16),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ── Error envelope ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}
