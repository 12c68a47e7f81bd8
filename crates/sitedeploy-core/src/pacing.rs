// ── Pacing ──
//
// Fixed pauses around dashboard operations that complete asynchronously on
// the vendor side. Unrelated to rate-limit backoff, which lives in the API
// client.

use std::time::Duration;

/// Delays inserted between dependent dashboard calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    /// Before claiming serials into the organization.
    pub org_claim: Duration,
    /// Before each inventory lookup following a claim.
    pub inventory_lookup: Duration,
    /// Between consecutive VLAN updates.
    pub vlan_update: Duration,
    /// Between unbinding and rebinding a network.
    pub unbind_settle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            org_claim: Duration::from_millis(500),
            inventory_lookup: Duration::from_millis(200),
            vlan_update: Duration::from_millis(500),
            unbind_settle: Duration::from_millis(2500),
        }
    }
}

impl Pacing {
    /// No pauses at all. Used by tests.
    pub fn none() -> Self {
        Self {
            org_claim: Duration::ZERO,
            inventory_lookup: Duration::ZERO,
            vlan_update: Duration::ZERO,
            unbind_settle: Duration::ZERO,
        }
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
