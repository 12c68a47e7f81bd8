// ── Device claim & classification ──
//
// Two-phase claim: every serial goes into the organization inventory first
// (license keys are accepted there), then only classifiable hardware is
// claimed into the site network.

use serde::Serialize;
use sitedeploy_api::{DashboardClient, Error as ApiError};
use sitedeploy_api::types::InventoryClaim;
use tracing::debug;

use crate::error::CoreError;
use crate::model::DeviceRole;
use crate::pacing::{Pacing, pause};
use crate::report::{ItemStatus, Reporter};

/// Split operator input on whitespace and commas, dropping duplicates.
pub fn normalize_serials<S: AsRef<str>>(inputs: &[S]) -> Vec<String> {
    let mut serials: Vec<String> = Vec::new();
    for token in inputs
        .iter()
        .flat_map(|s| s.as_ref().split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        if !serials.iter().any(|s| s.eq_ignore_ascii_case(token)) {
            serials.push(token.to_owned());
        }
    }
    serials
}

/// A serial found in inventory with a placeable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimedDevice {
    pub serial: String,
    pub model: String,
    pub role: DeviceRole,
}

/// A serial found in inventory whose model has no site role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnplacedDevice {
    pub serial: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimResult {
    /// Devices to claim into the network, in input order.
    pub devices: Vec<ClaimedDevice>,
    /// In the organization inventory but never claimed into the network.
    pub unplaced: Vec<UnplacedDevice>,
}

impl ClaimResult {
    pub fn roles(&self) -> impl Iterator<Item = DeviceRole> + '_ {
        self.devices.iter().map(|d| d.role)
    }

    pub fn has_role(&self, role: DeviceRole) -> bool {
        self.roles().any(|r| r == role)
    }

    pub fn serials(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.serial.clone()).collect()
    }
}

/// Outcome of claiming one license key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseOutcome {
    pub key: String,
    pub status: ItemStatus,
}

/// Claim license keys into the organization. Failures are reported, not fatal.
pub async fn claim_licenses(
    client: &DashboardClient,
    org_id: &str,
    keys: &[String],
    reporter: &dyn Reporter,
) -> Vec<LicenseOutcome> {
    let mut outcomes = Vec::with_capacity(keys.len());
    for key in keys {
        let status = match client
            .claim_into_organization(org_id, &InventoryClaim::license(key.as_str()))
            .await
        {
            Ok(()) => {
                reporter.say(&format!("License {key} claimed"));
                ItemStatus::Done
            }
            Err(e) => {
                reporter.warn(&format!("Unable to claim license {key}: {e}"));
                ItemStatus::Failed(e.to_string())
            }
        };
        outcomes.push(LicenseOutcome {
            key: key.clone(),
            status,
        });
    }
    outcomes
}

/// Claim serials into the organization, then look up and classify each.
///
/// Every serial that cannot be found in inventory afterwards is collected
/// and the whole run fails with [`CoreError::InvalidSerials`].
pub async fn claim_and_classify(
    client: &DashboardClient,
    org_id: &str,
    serials: &[String],
    pacing: &Pacing,
    reporter: &dyn Reporter,
) -> Result<ClaimResult, CoreError> {
    pause(pacing.org_claim).await;
    for serial in serials {
        // Already-claimed devices and license keys are rejected with an API
        // error; the inventory lookup below decides what is usable.
        match client
            .claim_into_organization(org_id, &InventoryClaim::serials([serial.as_str()]))
            .await
        {
            Ok(()) => {}
            Err(e @ ApiError::Api { .. }) => {
                debug!(%serial, error = %e, "organization claim not accepted");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut result = ClaimResult::default();
    let mut invalid = Vec::new();

    for serial in serials {
        pause(pacing.inventory_lookup).await;
        let Some(device) = client.get_inventory_device(org_id, serial).await? else {
            invalid.push(serial.clone());
            continue;
        };

        match DeviceRole::classify(&device.model) {
            Some(role) => {
                reporter.say(&format!("Device {serial} is {} ({role})", device.model));
                result.devices.push(ClaimedDevice {
                    serial: serial.clone(),
                    model: device.model,
                    role,
                });
            }
            None => {
                reporter.warn(&format!(
                    "Device {serial} ({}) has no site role, leaving it in inventory",
                    device.model
                ));
                result.unplaced.push(UnplacedDevice {
                    serial: serial.clone(),
                    model: device.model,
                });
            }
        }
    }

    if !invalid.is_empty() {
        return Err(CoreError::InvalidSerials { serials: invalid });
    }
    Ok(result)
}
