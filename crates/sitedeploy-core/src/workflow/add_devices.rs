// ── Add devices to an existing site ──
//
// Naming continues where the site left off: counters, tags, address and
// hostname prefix are all read back from the devices already there.

use std::collections::BTreeMap;

use serde::Serialize;
use sitedeploy_api::types::Device;
use tracing::{debug, info};

use crate::claim::{ClaimResult, claim_and_classify};
use crate::error::CoreError;
use crate::model::{DeviceRole, SiteName, SiteType};
use crate::naming::{SequenceCounters, hostname_prefix};
use crate::pacing::pause;
use crate::report::{DeviceOutcome, Reporter};
use crate::session::Session;
use crate::workflow::{Placement, name_devices};

pub struct AddDevicesRequest {
    /// Existing network, matched exactly.
    pub network_name: String,
    pub serials: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddDevicesReport {
    pub network: String,
    pub network_id: String,
    pub hostname_prefix: String,
    pub address: Option<String>,
    pub claim: ClaimResult,
    pub devices: Vec<DeviceOutcome>,
}

impl AddDevicesReport {
    pub fn is_complete(&self) -> bool {
        self.devices.iter().all(|d| !d.status.is_failed())
    }
}

/// What the devices already on a network say about how to name new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SiteProfile {
    pub counters: SequenceCounters,
    pub address: Option<String>,
    pub tags_by_role: BTreeMap<DeviceRole, Vec<String>>,
    pub fallback_tags: Vec<String>,
    pub prefix: Option<String>,
}

impl SiteProfile {
    pub(crate) fn from_devices(devices: &[Device]) -> Self {
        let mut profile = Self {
            counters: SequenceCounters::seeded(
                devices.iter().filter_map(|d| DeviceRole::classify(&d.model)),
            ),
            ..Self::default()
        };

        for device in devices {
            if profile.address.is_none() {
                profile.address = device.address.clone().filter(|a| !a.trim().is_empty());
            }
            if profile.prefix.is_none() {
                profile.prefix = device
                    .name
                    .as_deref()
                    .and_then(hostname_prefix)
                    .map(str::to_owned);
            }
            if profile.fallback_tags.is_empty() {
                profile.fallback_tags.clone_from(&device.tags);
            }
            if let Some(role) = DeviceRole::classify(&device.model) {
                profile
                    .tags_by_role
                    .entry(role)
                    .or_insert_with(|| device.tags.clone());
            }
        }
        profile
    }

    pub(crate) fn tags_for(&self, role: DeviceRole) -> Vec<String> {
        self.tags_by_role
            .get(&role)
            .unwrap_or(&self.fallback_tags)
            .clone()
    }
}

pub async fn add_devices(
    session: &Session,
    request: AddDevicesRequest,
    reporter: &dyn Reporter,
) -> Result<AddDevicesReport, CoreError> {
    let client = session.client();
    let org_id = session.organization().id.as_str();
    let resolver = session.resolver();

    if request.serials.is_empty() {
        return Err(CoreError::validation("no serials given"));
    }

    let network = resolver.require_network(&request.network_name).await?;
    let existing = client.list_network_devices(&network.id).await?;
    let mut profile = SiteProfile::from_devices(&existing);
    info!(
        network = %network.name,
        devices = existing.len(),
        "existing site devices read"
    );

    let prefix = match profile.prefix.take() {
        Some(prefix) => prefix,
        None => {
            let site = SiteName::parse(&network.name)?;
            let site_type = match network.config_template_id.as_deref() {
                Some(id) => resolver
                    .template_by_id(id)
                    .await?
                    .map(|t| SiteType::from_template_name(&t.name)),
                None => None,
            };
            let site_type = site_type.unwrap_or_else(|| {
                reporter.warn("Network is not bound to a known template, naming devices as boutique");
                SiteType::Boutique
            });
            site.hostname_prefix(site_type)
        }
    };
    debug!(%prefix, "hostname prefix");

    // No device may already belong to a network, this one included.
    let mut in_use = Vec::new();
    for serial in &request.serials {
        pause(session.pacing().inventory_lookup).await;
        if let Some(device) = client.get_inventory_device(org_id, serial).await? {
            if device.network_id.is_some() {
                in_use.push(serial.clone());
            }
        }
    }
    if !in_use.is_empty() {
        return Err(CoreError::DevicesInUse { serials: in_use });
    }

    let claim = claim_and_classify(
        client,
        org_id,
        &request.serials,
        session.pacing(),
        reporter,
    )
    .await?;
    if claim.devices.is_empty() {
        return Err(CoreError::validation(
            "none of the serials is a device that can be placed on a network",
        ));
    }

    client
        .claim_into_network(&network.id, &claim.serials())
        .await?;
    reporter.say(&format!(
        "{} device(s) claimed into {}",
        claim.devices.len(),
        network.name
    ));

    let placement = Placement {
        prefix: &prefix,
        address: profile.address.as_deref(),
        tags_for: |role| profile.tags_for(role),
    };
    let mut counters = profile.counters.clone();
    let devices = name_devices(
        client,
        &network.id,
        &claim.devices,
        &mut counters,
        &placement,
        reporter,
    )
    .await;

    Ok(AddDevicesReport {
        network: network.name,
        network_id: network.id,
        hostname_prefix: prefix,
        address: profile.address.clone(),
        claim,
        devices,
    })
}
