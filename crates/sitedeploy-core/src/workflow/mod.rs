// ── Workflows ──
//
// Each entry point is a linear pipeline over one `Session`. Fatal
// preconditions return `Err`; per-item failures land in the returned
// report, which the caller inspects with `is_complete()`.

pub mod add_devices;
pub mod deploy;
pub mod migrate;

use sitedeploy_api::DashboardClient;
use sitedeploy_api::types::DeviceUpdate;
use tracing::debug;

use crate::claim::ClaimedDevice;
use crate::model::DeviceRole;
use crate::naming::{SequenceCounters, hostname};
use crate::report::{DeviceOutcome, ItemStatus, Reporter};

/// What every device gets written besides its hostname.
pub(crate) struct Placement<'a, F>
where
    F: Fn(DeviceRole) -> Vec<String>,
{
    pub prefix: &'a str,
    pub address: Option<&'a str>,
    pub tags_for: F,
}

/// Name, tag and place each claimed device.
///
/// A device is only numbered once the dashboard shows it on the network;
/// one failing device does not stop the rest.
pub(crate) async fn name_devices<F>(
    client: &DashboardClient,
    network_id: &str,
    devices: &[ClaimedDevice],
    counters: &mut SequenceCounters,
    placement: &Placement<'_, F>,
    reporter: &dyn Reporter,
) -> Vec<DeviceOutcome>
where
    F: Fn(DeviceRole) -> Vec<String>,
{
    let mut outcomes = Vec::with_capacity(devices.len());

    for device in devices {
        let mut outcome = DeviceOutcome {
            serial: device.serial.clone(),
            model: device.model.clone(),
            role: Some(device.role),
            hostname: None,
            status: ItemStatus::Done,
        };

        match client.get_device(&device.serial).await {
            Ok(Some(d)) if d.network_id.as_deref() == Some(network_id) => {}
            Ok(Some(_) | None) => {
                reporter.warn(&format!(
                    "Device {} is not on the network after claiming",
                    device.serial
                ));
                outcome.status = ItemStatus::Failed("not on network after claim".into());
                outcomes.push(outcome);
                continue;
            }
            Err(e) => {
                reporter.warn(&format!("Unable to read device {}: {e}", device.serial));
                outcome.status = ItemStatus::Failed(e.to_string());
                outcomes.push(outcome);
                continue;
            }
        }

        let name = hostname(placement.prefix, device.role, counters.next(device.role));
        let update = DeviceUpdate {
            name: Some(name.clone()),
            tags: Some((placement.tags_for)(device.role)),
            address: placement.address.map(str::to_owned),
            move_map_marker: placement.address.map(|_| true),
        };
        debug!(serial = %device.serial, ?update, "updating device");

        outcome.status = match client.update_device(&device.serial, &update).await {
            Ok(_) => {
                reporter.say(&format!("Setting hostname {name} for device {}", device.model));
                ItemStatus::Done
            }
            Err(e) => {
                reporter.warn(&format!("Unable to name device {}: {e}", device.serial));
                ItemStatus::Failed(e.to_string())
            }
        };
        outcome.hostname = Some(name);
        outcomes.push(outcome);
    }

    outcomes
}
