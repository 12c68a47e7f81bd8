// ── VLAN snapshots ──
//
// Captured before a network is unbound (unbinding may reset VLANs to the
// template defaults) and replayed after it is rebound.

use serde::Serialize;
use serde_json::Value;
use sitedeploy_api::types::{ApplianceVlan, MandatoryDhcp, VlanUpdate};

use crate::model::DhcpHandling;

/// VLANs whose addressing always comes from the template, not the site.
pub const SAME_SUBNET_VLANS: [u16; 6] = [2, 3, 5, 6, 9, 800];

/// Full addressing and DHCP state of one VLAN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VlanSnapshot {
    pub id: u16,
    pub name: String,
    pub subnet: Option<String>,
    pub appliance_ip: Option<String>,
    /// Raw dashboard value, kept verbatim so unknown modes can be reported.
    pub dhcp_handling: Option<String>,
    pub dhcp_relay_server_ips: Option<Vec<String>>,
    pub dhcp_lease_time: Option<String>,
    pub dhcp_boot_options_enabled: Option<bool>,
    pub dhcp_options: Option<Vec<Value>>,
    pub fixed_ip_assignments: Option<Value>,
    pub reserved_ip_ranges: Option<Vec<Value>>,
    pub dns_nameservers: Option<String>,
    pub mandatory_dhcp: Option<MandatoryDhcp>,
}

impl From<&ApplianceVlan> for VlanSnapshot {
    fn from(vlan: &ApplianceVlan) -> Self {
        Self {
            id: vlan.id,
            name: vlan.name.clone(),
            subnet: vlan.subnet.clone(),
            appliance_ip: vlan.appliance_ip.clone(),
            dhcp_handling: vlan.dhcp_handling.clone(),
            dhcp_relay_server_ips: vlan.dhcp_relay_server_ips.clone(),
            dhcp_lease_time: vlan.dhcp_lease_time.clone(),
            dhcp_boot_options_enabled: vlan.dhcp_boot_options_enabled,
            dhcp_options: vlan.dhcp_options.clone(),
            fixed_ip_assignments: vlan.fixed_ip_assignments.clone(),
            reserved_ip_ranges: vlan.reserved_ip_ranges.clone(),
            dns_nameservers: vlan.dns_nameservers.clone(),
            mandatory_dhcp: vlan.mandatory_dhcp,
        }
    }
}

impl VlanSnapshot {
    pub fn handling(&self) -> Option<DhcpHandling> {
        DhcpHandling::from_api(self.dhcp_handling.as_deref())
    }

    pub fn shares_template_subnet(&self) -> bool {
        SAME_SUBNET_VLANS.contains(&self.id)
    }

    /// Update restoring this snapshot, or `None` for an unrecognized DHCP mode.
    pub fn replay_update(&self) -> Option<VlanUpdate> {
        let handling = self.handling()?;

        let mut update = VlanUpdate {
            subnet: self.subnet.clone(),
            appliance_ip: self.appliance_ip.clone(),
            dhcp_handling: Some(handling.to_string()),
            mandatory_dhcp: self.mandatory_dhcp,
            ..VlanUpdate::default()
        };

        match handling {
            DhcpHandling::Disabled => {}
            DhcpHandling::Relay => {
                update.dhcp_relay_server_ips = self.dhcp_relay_server_ips.clone();
            }
            DhcpHandling::Server => {
                if self.shares_template_subnet() {
                    update.subnet = None;
                    update.appliance_ip = None;
                }
                update.dhcp_lease_time = self.dhcp_lease_time.clone();
                update.dhcp_boot_options_enabled = self.dhcp_boot_options_enabled;
                update.fixed_ip_assignments = self.fixed_ip_assignments.clone();
                update.reserved_ip_ranges = self.reserved_ip_ranges.clone();
                update.dns_nameservers = self.dns_nameservers.clone();
                update.dhcp_options = self.dhcp_options.clone();
            }
        }

        Some(update)
    }
}

/// Snapshot every VLAN of a network, in dashboard order.
pub fn capture(vlans: &[ApplianceVlan]) -> Vec<VlanSnapshot> {
    vlans.iter().map(VlanSnapshot::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vlan(value: Value) -> VlanSnapshot {
        let vlan: ApplianceVlan = serde_json::from_value(value).expect("vlan");
        VlanSnapshot::from(&vlan)
    }

    #[test]
    fn disabled_vlan_restores_addressing_only() {
        let snap = vlan(json!({
            "id": 60, "name": "NonIT",
            "subnet": "10.0.0.224/27", "applianceIp": "10.0.0.225",
            "dhcpHandling": "Do not respond to DHCP requests",
            "dnsNameservers": "upstream_dns",
        }));
        let update = snap.replay_update().expect("known handling");
        assert_eq!(update.subnet.as_deref(), Some("10.0.0.224/27"));
        assert_eq!(update.appliance_ip.as_deref(), Some("10.0.0.225"));
        assert_eq!(update.dns_nameservers, None);
    }

    #[test]
    fn relay_vlan_restores_relay_servers() {
        let snap = vlan(json!({
            "id": 10, "name": "Voice",
            "subnet": "10.0.0.64/27", "applianceIp": "10.0.0.65",
            "dhcpHandling": "Relay DHCP to another server",
            "dhcpRelayServerIps": ["10.9.9.9"],
            "mandatoryDhcp": {"enabled": true},
        }));
        let update = snap.replay_update().expect("known handling");
        assert_eq!(update.dhcp_relay_server_ips, Some(vec!["10.9.9.9".to_owned()]));
        assert_eq!(update.mandatory_dhcp, Some(MandatoryDhcp { enabled: true }));
    }

    #[test]
    fn server_vlan_in_same_subnet_set_omits_addressing() {
        let snap = vlan(json!({
            "id": 800, "name": "Guest",
            "subnet": "192.168.80.0/24", "applianceIp": "192.168.80.1",
            "dhcpHandling": "Run a DHCP server",
            "dhcpLeaseTime": "1 day",
            "dnsNameservers": "google_dns",
        }));
        let update = snap.replay_update().expect("known handling");
        assert_eq!(update.subnet, None);
        assert_eq!(update.appliance_ip, None);
        assert_eq!(update.dhcp_lease_time.as_deref(), Some("1 day"));
        assert_eq!(update.dns_nameservers.as_deref(), Some("google_dns"));
    }

    #[test]
    fn server_vlan_outside_set_keeps_addressing() {
        let snap = vlan(json!({
            "id": 50, "name": "PCs",
            "subnet": "10.0.0.0/26", "applianceIp": "10.0.0.1",
            "dhcpHandling": "Run a DHCP server",
            "fixedIpAssignments": {"00:11:22:33:44:55": {"ip": "10.0.0.5", "name": "printer"}},
        }));
        let update = snap.replay_update().expect("known handling");
        assert_eq!(update.subnet.as_deref(), Some("10.0.0.0/26"));
        assert!(update.fixed_ip_assignments.is_some());
    }

    #[test]
    fn unknown_handling_is_not_replayed() {
        let snap = vlan(json!({"id": 7, "name": "Odd", "dhcpHandling": "Something new"}));
        assert!(snap.replay_update().is_none());
    }
}
