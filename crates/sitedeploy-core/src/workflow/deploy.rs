// ── Site deployment ──
//
// claim → classify → create network → claim into network → bind →
// remap VLANs → name devices → time zone.

use chrono::Utc;
use serde::Serialize;
use sitedeploy_api::GeocodeClient;
use sitedeploy_api::types::{BindRequest, NetworkCreate, NetworkUpdate};
use tracing::{info, warn};

use crate::claim::{ClaimResult, LicenseOutcome, claim_and_classify, claim_licenses};
use crate::error::CoreError;
use crate::model::{BaseSubnet, DeviceRole, SiteName, SiteType, TemplateFamily, product_types};
use crate::naming::SequenceCounters;
use crate::remap::{self, RemapReport, RemapStatus};
use crate::report::{DeviceOutcome, Reporter};
use crate::session::Session;
use crate::workflow::{Placement, name_devices};

pub const DEFAULT_TIME_ZONE: &str = "Europe/Helsinki";

/// Inputs of a site deployment.
pub struct DeployRequest {
    pub network_name: String,
    pub template_name: String,
    pub base_subnet: String,
    pub serials: Vec<String>,
    pub licenses: Vec<String>,
    pub tags: Vec<String>,
    pub address: Option<String>,
    /// Reuse a network that already carries this name instead of failing.
    pub ignore_existing: bool,
    /// Tag access points with `Guest_<MAISON>`.
    pub guest_wifi: bool,
    /// Time zone given to a newly created network.
    pub time_zone: String,
    /// Geocoder used to set the time zone from `address`.
    pub geocoder: Option<GeocodeClient>,
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindOutcome {
    pub template_id: String,
    pub auto_bind_requested: bool,
    pub auto_bind_used: bool,
    /// The network was already bound to this template.
    pub already_bound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeZoneOutcome {
    NotRequested,
    Set { time_zone: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    pub network: String,
    pub network_id: String,
    pub created: bool,
    pub template: String,
    pub base_subnet: BaseSubnet,
    pub product_types: Vec<String>,
    pub licenses: Vec<LicenseOutcome>,
    pub claim: ClaimResult,
    pub bind: BindOutcome,
    pub remap: RemapReport,
    pub devices: Vec<DeviceOutcome>,
    pub time_zone: TimeZoneOutcome,
}

impl DeployReport {
    /// Whether every step finished cleanly. Skipped steps count as clean.
    pub fn is_complete(&self) -> bool {
        self.remap.status != RemapStatus::RemappedWithWarnings
            && self.devices.iter().all(|d| !d.status.is_failed())
            && self.licenses.iter().all(|l| !l.status.is_failed())
            && !matches!(self.time_zone, TimeZoneOutcome::Failed { .. })
    }
}

// ── Workflow ─────────────────────────────────────────────────────────

pub async fn deploy(
    session: &Session,
    request: DeployRequest,
    reporter: &dyn Reporter,
) -> Result<DeployReport, CoreError> {
    let client = session.client();
    let org_id = session.organization().id.as_str();
    let pacing = session.pacing();
    let resolver = session.resolver();

    // Everything that can be checked locally is checked before any call.
    let site = SiteName::parse(&request.network_name)?;
    let family = TemplateFamily::detect(&request.template_name);
    let site_type = SiteType::from_template_name(&request.template_name);
    let base: BaseSubnet = request.base_subnet.parse()?;
    let planned = remap::plan(family, base)?;
    if request.serials.is_empty() {
        return Err(CoreError::validation("no serials given"));
    }
    reporter.say(&format!("Template is \"{}\"", request.template_name));

    let existing = resolver.find_network(&request.network_name).await?;
    if existing.is_some() && !request.ignore_existing {
        return Err(CoreError::NetworkExists {
            name: request.network_name,
        });
    }
    let template = resolver.require_template(&request.template_name).await?;
    info!(template = %template.name, %family, "template resolved");

    let licenses = claim_licenses(client, org_id, &request.licenses, reporter).await;
    let claim = claim_and_classify(client, org_id, &request.serials, pacing, reporter).await?;
    if claim.devices.is_empty() {
        return Err(CoreError::validation(
            "none of the serials is a device that can be placed on a network",
        ));
    }
    let product_types = product_types(claim.roles());

    // ── Network ──
    let (network, created) = match existing {
        Some(network) => {
            reporter.warn(&format!(
                "Network {} already exists, reusing it",
                network.name
            ));
            (network, false)
        }
        None => {
            let network = client
                .create_network(
                    org_id,
                    &NetworkCreate {
                        name: request.network_name.clone(),
                        product_types: product_types.clone(),
                        tags: request.tags.clone(),
                        time_zone: request.time_zone.clone(),
                    },
                )
                .await?;
            reporter.say(&format!(
                "Network {} created ({})",
                network.name,
                product_types.join(" ")
            ));
            (network, true)
        }
    };

    client
        .claim_into_network(&network.id, &claim.serials())
        .await?;
    reporter.say(&format!(
        "{} device(s) claimed into {}",
        claim.devices.len(),
        network.name
    ));

    // ── Bind ──
    let bind = if network.config_template_id.as_deref() == Some(template.id.as_str()) {
        reporter.say("Network already bound to this template");
        BindOutcome {
            template_id: template.id.clone(),
            auto_bind_requested: false,
            auto_bind_used: false,
            already_bound: true,
        }
    } else {
        bind_with_fallback(
            session,
            &network.id,
            &network.name,
            &template.id,
            claim.has_role(DeviceRole::Switch),
            reporter,
        )
        .await?
    };

    // ── VLANs ──
    let remap = if family == TemplateFamily::Btq && !claim.has_role(DeviceRole::Appliance) {
        reporter.say("Guest WiFi only site, no VLANs to update");
        RemapReport::skipped(family)
    } else {
        remap::apply(client, &network.id, family, &planned, pacing, reporter).await
    };

    // ── Devices ──
    let guest_tags = {
        let mut tags = request.tags.clone();
        if request.guest_wifi {
            tags.push(site.guest_tag());
        }
        tags
    };
    let prefix = site.hostname_prefix(site_type);
    let placement = Placement {
        prefix: &prefix,
        address: request.address.as_deref(),
        tags_for: |role| {
            if role == DeviceRole::Wireless {
                guest_tags.clone()
            } else {
                request.tags.clone()
            }
        },
    };
    let mut counters = SequenceCounters::new();
    let devices = name_devices(
        client,
        &network.id,
        &claim.devices,
        &mut counters,
        &placement,
        reporter,
    )
    .await;

    // ── Time zone ──
    let time_zone = match (&request.geocoder, request.address.as_deref()) {
        (Some(geocoder), Some(address)) => {
            update_time_zone(session, &network.id, geocoder, address, reporter).await
        }
        _ => TimeZoneOutcome::NotRequested,
    };

    Ok(DeployReport {
        network: network.name,
        network_id: network.id,
        created,
        template: template.name,
        base_subnet: base,
        product_types,
        licenses,
        claim,
        bind,
        remap,
        devices,
        time_zone,
    })
}

/// Bind, retrying once without switch auto-bind if the first attempt fails.
async fn bind_with_fallback(
    session: &Session,
    network_id: &str,
    network_name: &str,
    template_id: &str,
    auto_bind: bool,
    reporter: &dyn Reporter,
) -> Result<BindOutcome, CoreError> {
    let client = session.client();
    let request = |auto_bind| BindRequest {
        config_template_id: template_id.to_owned(),
        auto_bind,
    };

    let first = client.bind_network(network_id, &request(auto_bind)).await;
    let auto_bind_used = match first {
        Ok(()) => auto_bind,
        Err(e) if auto_bind => {
            warn!(error = %e, "bind with auto-bind failed, retrying without");
            reporter.warn("Bind with switch auto-bind failed, retrying without auto-bind");
            client
                .bind_network(network_id, &request(false))
                .await
                .map_err(|e| CoreError::BindFailed {
                    network: network_name.to_owned(),
                    message: e.to_string(),
                })?;
            false
        }
        Err(e) => {
            return Err(CoreError::BindFailed {
                network: network_name.to_owned(),
                message: e.to_string(),
            });
        }
    };

    reporter.say(&format!(
        "Network bound to template{}",
        if auto_bind_used { " with switch auto-bind" } else { "" }
    ));
    Ok(BindOutcome {
        template_id: template_id.to_owned(),
        auto_bind_requested: auto_bind,
        auto_bind_used,
        already_bound: false,
    })
}

async fn update_time_zone(
    session: &Session,
    network_id: &str,
    geocoder: &GeocodeClient,
    address: &str,
    reporter: &dyn Reporter,
) -> TimeZoneOutcome {
    let result = async {
        let tz = geocoder
            .time_zone_for_address(address, Utc::now().timestamp())
            .await?;
        session
            .client()
            .update_network(
                network_id,
                &NetworkUpdate {
                    time_zone: Some(tz.clone()),
                    ..NetworkUpdate::default()
                },
            )
            .await?;
        Ok::<_, sitedeploy_api::Error>(tz)
    }
    .await;

    match result {
        Ok(time_zone) => {
            reporter.say(&format!("Network time zone set to {time_zone}"));
            TimeZoneOutcome::Set { time_zone }
        }
        Err(e) => {
            warn!(error = %e, "time zone lookup failed");
            reporter.warn("Unable to set time zone using geocoding");
            TimeZoneOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
