// ── VLAN subnet remapping ──
//
// After binding, a network inherits the template's placeholder VLAN
// addressing. Each template family has a declarative table of VLAN slots;
// one generic pass turns the table plus the site's base subnet into
// per-VLAN updates.

use std::net::Ipv4Addr;

use serde::Serialize;
use sitedeploy_api::DashboardClient;
use sitedeploy_api::types::{ApplianceVlan, VlanUpdate};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::AddressRange::{Primary, Secondary};
use crate::model::{AddressRange, BaseSubnet, DhcpHandling, TemplateFamily};
use crate::pacing::{Pacing, pause};
use crate::report::{ItemStatus, Reporter, VlanOutcome};

// ── Tables ───────────────────────────────────────────────────────────

/// One VLAN of a template family and where its subnet sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanSlot {
    pub id: u16,
    pub name: &'static str,
    pub range: AddressRange,
    /// Fourth octet of the network address within `range`.
    pub offset: u8,
    pub prefix_len: u8,
    /// Present only on some templates of the family; absence is not a failure.
    pub optional: bool,
    /// Whether an existing DHCP relay list is carried over.
    pub keeps_relay: bool,
}

const fn slot(id: u16, name: &'static str, range: AddressRange, offset: u8, prefix_len: u8) -> VlanSlot {
    VlanSlot {
        id,
        name,
        range,
        offset,
        prefix_len,
        optional: false,
        keeps_relay: true,
    }
}

const fn optional(mut s: VlanSlot) -> VlanSlot {
    s.optional = true;
    s
}

/// Management VLANs never relay DHCP.
const fn management(id: u16, range: AddressRange, offset: u8, prefix_len: u8) -> VlanSlot {
    VlanSlot {
        id,
        name: "Management",
        range,
        offset,
        prefix_len,
        optional: false,
        keeps_relay: false,
    }
}

const BTQ: &[VlanSlot] = &[
    slot(10, "10-Voice", Primary, 64, 27),
    slot(20, "20-POS-HUB", Primary, 96, 27),
    slot(30, "30-CC_Terms", Primary, 128, 27),
    slot(50, "50-PCs-Printers", Primary, 0, 26),
    optional(slot(55, "55-Printers", Primary, 208, 28)),
    slot(60, "60-NonIT", Primary, 224, 27),
    optional(slot(80, "80-Reserved", Primary, 208, 28)),
    slot(100, "100-Reserved", Primary, 160, 27),
    management(400, Primary, 192, 28),
];

const LARGE_BTQ: &[VlanSlot] = &[
    slot(10, "10-Voice", Primary, 0, 26),
    slot(20, "20-POS-HUB", Primary, 64, 26),
    slot(30, "30-CC_Terms", Primary, 128, 26),
    slot(50, "50-PCs-Printers", Secondary, 0, 25),
    slot(60, "60-NonIT", Secondary, 128, 27),
    slot(100, "100-CCTV", Secondary, 192, 26),
    management(400, Primary, 192, 26),
];

const SIMPLE_OFFICE: &[VlanSlot] = &[
    slot(100, "100-PCs-Printers", Primary, 0, 24),
    slot(300, "300-Voice-VideoConf", Secondary, 0, 26),
    slot(600, "600-Non-IT-CCTV", Secondary, 128, 27),
    management(999, Secondary, 192, 27),
];

const ZTNA_OFFICE: &[VlanSlot] = &[
    slot(200, "200-Printers", Primary, 64, 27),
    slot(300, "300-Voice-VideoConf", Secondary, 0, 26),
    slot(600, "600-Non-IT-CCTV", Secondary, 128, 27),
    management(999, Secondary, 192, 27),
];

const ZTNA_MANUFACTURE: &[VlanSlot] = &[
    slot(200, "200-Printers", Primary, 0, 26),
    slot(731, "731-Non-IT", Primary, 64, 26),
    slot(732, "732-CCTV", Primary, 128, 26),
    slot(711, "711-TustedManuf", Primary, 192, 27),
    slot(811, "811-UntrustedManuf", Primary, 224, 27),
    slot(300, "300-Voice-VideoConf", Secondary, 0, 26),
    slot(152, "152-RCCWH", Secondary, 128, 26),
    management(999, Secondary, 192, 26),
];

const MANUFACTURE_RIC: &[VlanSlot] = &[
    slot(300, "300-Voice-VideoConf", Primary, 0, 26),
    slot(731, "731-Non-IT", Primary, 64, 26),
    slot(732, "732-CCTV", Primary, 128, 26),
    slot(711, "711-TustedManuf", Primary, 192, 27),
    slot(811, "811-UntrustedManuf", Primary, 224, 27),
    slot(100, "100-PCs-Printers", Secondary, 0, 25),
    slot(152, "152-RCCWH", Secondary, 128, 26),
    management(999, Secondary, 192, 26),
];

const VCA_FRANCE_MANUFACTURE: &[VlanSlot] = &[
    slot(152, "152-RCCWH", Primary, 0, 26),
    slot(731, "731-Non-IT", Primary, 64, 26),
    slot(910, "910-Cybervision", Primary, 128, 27),
    slot(300, "300-Voice-VideoConf", Primary, 160, 27),
    slot(200, "200-Printers", Primary, 192, 26),
    slot(711, "711-TustedManuf", Secondary, 0, 26),
    slot(811, "811-UntrustedManuf", Secondary, 64, 26),
    management(999, Secondary, 128, 25),
];

const VCA_FRANCE_OFFICE: &[VlanSlot] = &[
    slot(200, "200-Printers", Primary, 0, 26),
    slot(300, "300-Voice-VideoConf", Primary, 64, 26),
    management(999, Primary, 128, 25),
    slot(600, "600-CCTV", Secondary, 0, 26),
];

impl TemplateFamily {
    /// VLAN slots rewritten for networks bound to a template of this family.
    pub fn vlan_slots(self) -> &'static [VlanSlot] {
        match self {
            Self::Btq => BTQ,
            Self::LargeBtq => LARGE_BTQ,
            Self::SimpleOffice => SIMPLE_OFFICE,
            Self::ZtnaOffice => ZTNA_OFFICE,
            Self::ZtnaManufacture => ZTNA_MANUFACTURE,
            Self::ManufactureRic => MANUFACTURE_RIC,
            Self::VcaFranceOffice => VCA_FRANCE_OFFICE,
            Self::VcaFranceManufacture => VCA_FRANCE_MANUFACTURE,
        }
    }

    pub fn uses_secondary_range(self) -> bool {
        self.vlan_slots().iter().any(|s| s.range == Secondary)
    }
}

// ── Planning ─────────────────────────────────────────────────────────

/// Concrete addressing for one VLAN slot on one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedVlan {
    pub id: u16,
    pub name: &'static str,
    pub subnet: String,
    pub appliance_ip: String,
    pub optional: bool,
    #[serde(skip)]
    pub keeps_relay: bool,
}

impl PlannedVlan {
    /// Update body for this slot, given the VLAN as currently configured.
    ///
    /// The current relay server list survives only when the VLAN relays
    /// DHCP and the slot is allowed to keep it.
    pub fn update_for(&self, current: &ApplianceVlan) -> VlanUpdate {
        let relaying =
            DhcpHandling::from_api(current.dhcp_handling.as_deref()) == Some(DhcpHandling::Relay);

        VlanUpdate {
            name: Some(self.name.to_owned()),
            subnet: Some(self.subnet.clone()),
            appliance_ip: Some(self.appliance_ip.clone()),
            dhcp_relay_server_ips: if relaying && self.keeps_relay {
                current.dhcp_relay_server_ips.clone()
            } else {
                None
            },
            ..VlanUpdate::default()
        }
    }
}

/// Compute every slot address for `family` from `base`.
///
/// Fails before anything is sent when a slot does not fit: the secondary
/// range overflows, or an offset is not aligned to its prefix.
pub fn plan(family: TemplateFamily, base: BaseSubnet) -> Result<Vec<PlannedVlan>, CoreError> {
    family
        .vlan_slots()
        .iter()
        .map(|slot| plan_slot(slot, base))
        .collect()
}

fn plan_slot(slot: &VlanSlot, base: BaseSubnet) -> Result<PlannedVlan, CoreError> {
    let start = base.range_start(slot.range).ok_or_else(|| {
        CoreError::validation(format!(
            "base subnet {base} leaves no room for the secondary range used by VLAN {}",
            slot.id
        ))
    })?;

    if !(24..=30).contains(&slot.prefix_len) {
        return Err(CoreError::Internal(format!(
            "VLAN {} has unsupported prefix length /{}",
            slot.id, slot.prefix_len
        )));
    }
    let block = 1_u16 << (32 - slot.prefix_len);
    if u16::from(slot.offset) % block != 0 {
        return Err(CoreError::Internal(format!(
            "VLAN {} offset {} is not aligned to /{}",
            slot.id, slot.offset, slot.prefix_len
        )));
    }

    let [a, b, c, _] = start.octets();
    let network = Ipv4Addr::new(a, b, c, slot.offset);
    let gateway = Ipv4Addr::new(a, b, c, slot.offset + 1);

    Ok(PlannedVlan {
        id: slot.id,
        name: slot.name,
        subnet: format!("{network}/{}", slot.prefix_len),
        appliance_ip: gateway.to_string(),
        optional: slot.optional,
        keeps_relay: slot.keeps_relay,
    })
}

// ── Execution ────────────────────────────────────────────────────────

/// Final state of a network's VLAN addressing after the remap pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemapStatus {
    /// Every required VLAN was updated.
    Verified,
    /// At least one required VLAN is missing or failed; check the dashboard.
    RemappedWithWarnings,
    /// Nothing to remap (guest-WiFi-only boutique).
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemapReport {
    pub family: TemplateFamily,
    pub status: RemapStatus,
    pub vlans: Vec<VlanOutcome>,
}

impl RemapReport {
    pub fn skipped(family: TemplateFamily) -> Self {
        Self {
            family,
            status: RemapStatus::Skipped,
            vlans: Vec::new(),
        }
    }
}

/// Apply a plan to a bound network, one independent PUT per VLAN.
///
/// A failing VLAN never stops the others. Only a failure to read the
/// current VLAN list leaves every slot unattempted.
pub async fn apply(
    client: &DashboardClient,
    network_id: &str,
    family: TemplateFamily,
    planned: &[PlannedVlan],
    pacing: &Pacing,
    reporter: &dyn Reporter,
) -> RemapReport {
    reporter.say(&format!("Updating VLAN subnets ({family} template)"));

    let current = match client.list_appliance_vlans(network_id).await {
        Ok(vlans) => vlans,
        Err(e) => {
            warn!(error = %e, "unable to read appliance VLANs");
            reporter.warn(&format!("Unable to read VLANs of the bound network: {e}"));
            let vlans = planned
                .iter()
                .map(|p| outcome(p, ItemStatus::Failed(format!("VLAN list unavailable: {e}"))))
                .collect();
            return RemapReport {
                family,
                status: RemapStatus::RemappedWithWarnings,
                vlans,
            };
        }
    };

    let mut vlans = Vec::with_capacity(planned.len());
    let mut all_required_ok = true;

    for plan in planned {
        let Some(existing) = current.iter().find(|v| v.id == plan.id) else {
            if plan.optional {
                debug!(vlan = plan.id, "optional VLAN not on template");
                vlans.push(outcome(plan, ItemStatus::Skipped("not on template".into())));
            } else {
                all_required_ok = false;
                reporter.warn(&format!("VLAN {} is missing from the bound template", plan.id));
                vlans.push(outcome(plan, ItemStatus::Failed("missing from template".into())));
            }
            continue;
        };

        pause(pacing.vlan_update).await;
        let status = match client
            .update_appliance_vlan(network_id, plan.id, &plan.update_for(existing))
            .await
        {
            Ok(_) => {
                reporter.say(&format!(
                    "VLAN {} {} -> {} (gateway {})",
                    plan.id, plan.name, plan.subnet, plan.appliance_ip
                ));
                ItemStatus::Done
            }
            Err(e) => {
                all_required_ok &= plan.optional;
                reporter.warn(&format!("Unable to update VLAN {}: {e}", plan.id));
                ItemStatus::Failed(e.to_string())
            }
        };
        vlans.push(outcome(plan, status));
    }

    let status = if all_required_ok {
        RemapStatus::Verified
    } else {
        reporter.warn("Subnet update incomplete, please check VLANs on the dashboard");
        RemapStatus::RemappedWithWarnings
    };

    RemapReport {
        family,
        status,
        vlans,
    }
}

fn outcome(plan: &PlannedVlan, status: ItemStatus) -> VlanOutcome {
    VlanOutcome {
        id: plan.id,
        name: plan.name.to_owned(),
        subnet: Some(plan.subnet.clone()),
        appliance_ip: Some(plan.appliance_ip.clone()),
        status,
    }
}
