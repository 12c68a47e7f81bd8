// ── Template migration ──
//
// capture VLANs → unbind → settle → bind → replay VLANs.

use serde::Serialize;
use sitedeploy_api::types::BindRequest;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::pacing::pause;
use crate::prompt::Prompter;
use crate::report::{ItemStatus, Reporter, VlanOutcome};
use crate::resolver::{NameMatch, match_name};
use crate::session::Session;
use crate::snapshot::{self, VlanSnapshot};

pub struct MigrationRequest {
    /// Network name; exact match first, else substring candidates.
    pub network: String,
    /// Destination template name; same matching rule.
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationReport {
    pub network: String,
    pub network_id: String,
    pub previous_template_id: Option<String>,
    pub template: String,
    pub template_id: String,
    /// `false` when the unbind call was rejected (usually: not bound).
    pub unbound: bool,
    pub snapshot: Vec<VlanSnapshot>,
    pub vlans: Vec<VlanOutcome>,
}

impl MigrationReport {
    pub fn is_complete(&self) -> bool {
        self.vlans.iter().all(|v| !v.status.is_failed())
    }
}

pub async fn migrate(
    session: &Session,
    request: MigrationRequest,
    prompter: &dyn Prompter,
    reporter: &dyn Reporter,
) -> Result<MigrationReport, CoreError> {
    let client = session.client();
    let resolver = session.resolver();

    let network = pick(
        "Network",
        match_name(resolver.networks().await?, &request.network, |n| n.name.as_str()),
        &request.network,
        |n| n.name.as_str(),
        prompter,
    )?
    .ok_or_else(|| CoreError::NetworkNotFound {
        name: request.network.clone(),
    })?;

    let template = pick(
        "Template",
        match_name(resolver.templates().await?, &request.template, |t| {
            t.name.as_str()
        }),
        &request.template,
        |t| t.name.as_str(),
        prompter,
    )?
    .ok_or_else(|| CoreError::TemplateNotFound {
        name: request.template.clone(),
    })?;

    if !prompter.confirm(&format!(
        "Migrate network {} to template {}?",
        network.name, template.name
    ))? {
        return Err(CoreError::Cancelled);
    }
    info!(network = %network.name, template = %template.name, "migrating");

    // Must happen while still bound: unbinding may reset VLANs to defaults.
    let snapshot = snapshot::capture(&client.list_appliance_vlans(&network.id).await?);
    reporter.say(&format!(
        "Captured {} VLAN(s) of {}",
        snapshot.len(),
        network.name
    ));

    let unbound = match client.unbind_network(&network.id, true).await {
        Ok(()) => {
            reporter.say(&format!("Network {} unbound", network.name));
            true
        }
        Err(e) => {
            warn!(error = %e, "unbind rejected");
            reporter.warn(&format!("Unable to unbind, network possibly not bound ({e})"));
            false
        }
    };

    pause(session.pacing().unbind_settle).await;

    client
        .bind_network(
            &network.id,
            &BindRequest {
                config_template_id: template.id.clone(),
                auto_bind: false,
            },
        )
        .await
        .map_err(|e| CoreError::BindFailed {
            network: network.name.clone(),
            message: e.to_string(),
        })?;
    reporter.say(&format!("Network bound to {}", template.name));

    let vlans = replay(session, &network.id, &snapshot, reporter).await;

    Ok(MigrationReport {
        network: network.name,
        network_id: network.id,
        previous_template_id: network.config_template_id,
        template: template.name,
        template_id: template.id,
        unbound,
        snapshot,
        vlans,
    })
}

/// Restore every captured VLAN, one independent PUT each.
async fn replay(
    session: &Session,
    network_id: &str,
    snapshot: &[VlanSnapshot],
    reporter: &dyn Reporter,
) -> Vec<VlanOutcome> {
    let mut outcomes = Vec::with_capacity(snapshot.len());

    for vlan in snapshot {
        let mut outcome = VlanOutcome {
            id: vlan.id,
            name: vlan.name.clone(),
            subnet: vlan.subnet.clone(),
            appliance_ip: vlan.appliance_ip.clone(),
            status: ItemStatus::Done,
        };

        let Some(update) = vlan.replay_update() else {
            let handling = vlan.dhcp_handling.as_deref().unwrap_or("<none>");
            reporter.warn(&format!(
                "VLAN {} has unknown DHCP handling {handling:?}, not restored",
                vlan.id
            ));
            outcome.status = ItemStatus::Failed(format!("unknown DHCP handling {handling:?}"));
            outcomes.push(outcome);
            continue;
        };

        pause(session.pacing().vlan_update).await;
        debug!(vlan = vlan.id, ?update, "replaying VLAN");
        outcome.status = match session
            .client()
            .update_appliance_vlan(network_id, vlan.id, &update)
            .await
        {
            Ok(_) => {
                reporter.say(&format!("VLAN {} {} restored", vlan.id, vlan.name));
                ItemStatus::Done
            }
            Err(e) => {
                reporter.warn(&format!("Unable to restore VLAN {}: {e}", vlan.id));
                ItemStatus::Failed(e.to_string())
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// Settle a name match, asking the operator when it is not exact.
///
/// `Ok(None)` means nothing matched at all.
fn pick<T>(
    kind: &'static str,
    matched: NameMatch<T>,
    query: &str,
    name: impl Fn(&T) -> &str,
    prompter: &dyn Prompter,
) -> Result<Option<T>, CoreError> {
    let mut candidates = match matched {
        NameMatch::Exact(hit) => return Ok(Some(hit)),
        NameMatch::Partial(candidates) => candidates,
    };

    match candidates.len() {
        0 => Ok(None),
        1 => {
            let only = candidates.remove(0);
            if prompter.confirm(&format!(
                "{kind} {query:?} not found, use {:?}?",
                name(&only)
            ))? {
                Ok(Some(only))
            } else {
                Err(CoreError::Cancelled)
            }
        }
        _ => {
            let names: Vec<String> = candidates.iter().map(|c| name(c).to_owned()).collect();
            match prompter.select(&format!("{kind} {query:?} matches several"), &names)? {
                Some(index) if index < candidates.len() => Ok(Some(candidates.swap_remove(index))),
                _ => Err(CoreError::AmbiguousMatch {
                    kind,
                    query: query.to_owned(),
                    candidates: names,
                }),
            }
        }
    }
}
