// ── DHCP handling modes ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// How an appliance VLAN answers DHCP, using the dashboard's literal strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum DhcpHandling {
    #[serde(rename = "Run a DHCP server")]
    #[strum(serialize = "Run a DHCP server")]
    Server,
    #[serde(rename = "Relay DHCP to another server")]
    #[strum(serialize = "Relay DHCP to another server")]
    Relay,
    #[serde(rename = "Do not respond to DHCP requests")]
    #[strum(serialize = "Do not respond to DHCP requests")]
    Disabled,
}

impl DhcpHandling {
    /// Parse an optional dashboard value; unknown strings yield `None`.
    pub fn from_api(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashboard_strings() {
        assert_eq!(
            DhcpHandling::from_api(Some("Relay DHCP to another server")),
            Some(DhcpHandling::Relay)
        );
        assert_eq!(
            DhcpHandling::from_api(Some("Run a DHCP server")),
            Some(DhcpHandling::Server)
        );
        assert_eq!(DhcpHandling::from_api(Some("relay")), None);
        assert_eq!(DhcpHandling::from_api(None), None);
        assert_eq!(
            DhcpHandling::Disabled.as_ref(),
            "Do not respond to DHCP requests"
        );
    }
}
