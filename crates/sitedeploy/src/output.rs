//! Operator output: the `@ ` transcript, prompts, and final summaries.
//!
//! Progress lines go to stdout with the `@ ` prefix so they can be grepped
//! out of a run log. Summaries render as `tabled` tables in text mode or as
//! the serialized report in JSON mode.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use sitedeploy_core::{
    AddDevicesReport, CoreError, DeployReport, DeviceOutcome, ItemStatus, MigrationReport,
    Prompter, RemapStatus, Reporter, TimeZoneOutcome, VlanOutcome,
};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Color only when stdout is a terminal and `NO_COLOR` is unset.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn paint_status(status: &ItemStatus, color: bool) -> String {
    let label = status.label();
    if !color {
        return label.to_owned();
    }
    match status {
        ItemStatus::Done => label.green().to_string(),
        ItemStatus::Skipped(_) => label.yellow().to_string(),
        ItemStatus::Failed(_) => label.red().bold().to_string(),
    }
}

// ── Transcript ───────────────────────────────────────────────────────

/// Prints workflow progress as `@ ` lines on stdout.
///
/// While a spinner is active on stderr, lines are written through
/// `ProgressBar::suspend` so the two never interleave mid-line.
pub struct ConsoleReporter {
    quiet: bool,
    color: bool,
    spinner: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self {
            quiet,
            color,
            spinner: None,
        }
    }

    /// Show a spinner on stderr until [`finish`](Self::finish). Hidden when
    /// quiet or when stderr is not a terminal.
    pub fn with_spinner(mut self, message: impl Into<String>) -> Self {
        if self.quiet || !io::stderr().is_terminal() {
            return self;
        }
        let spinner = ProgressBar::new_spinner().with_message(message.into());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} {elapsed}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
        self
    }

    pub fn finish(&self) {
        if let Some(ref spinner) = self.spinner {
            spinner.finish_and_clear();
        }
    }

    /// Fatal line. Printed even in quiet mode.
    pub fn error(&self, line: &str) {
        let text = format!("@ ERROR: {line}");
        if self.color {
            self.emit(&text.red().to_string());
        } else {
            self.emit(&text);
        }
    }

    fn emit(&self, line: &str) {
        let write = || {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{line}");
        };
        match self.spinner {
            Some(ref spinner) => spinner.suspend(write),
            None => write(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn say(&self, line: &str) {
        if !self.quiet {
            self.emit(&format!("@ {line}"));
        }
    }

    fn warn(&self, line: &str) {
        let text = format!("@ WARNING: {line}");
        if self.color {
            self.emit(&text.yellow().to_string());
        } else {
            self.emit(&text);
        }
    }
}

// ── Prompts ──────────────────────────────────────────────────────────

/// Interactive answers through `dialoguer`.
///
/// With `--yes` every confirmation is accepted. Without a terminal and
/// without `--yes` confirmations are declined. Selection never guesses.
pub struct ConsolePrompter {
    assume_yes: bool,
    interactive: bool,
}

impl ConsolePrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            interactive: io::stdin().is_terminal() && io::stderr().is_terminal(),
        }
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&self, prompt: &str) -> Result<bool, CoreError> {
        if self.assume_yes {
            return Ok(true);
        }
        if !self.interactive {
            return Ok(false);
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| CoreError::Internal(format!("prompt failed: {e}")))
    }

    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>, CoreError> {
        if self.assume_yes || !self.interactive {
            return Ok(None);
        }
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(|e| CoreError::Internal(format!("prompt failed: {e}")))
    }
}

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl DeviceRow {
    fn from_outcome(d: &DeviceOutcome, color: bool) -> Self {
        Self {
            serial: d.serial.clone(),
            model: d.model.clone(),
            role: d.role.map(|r| r.to_string()).unwrap_or_default(),
            hostname: d.hostname.clone().unwrap_or_default(),
            status: paint_status(&d.status, color),
            detail: d.status.detail().unwrap_or_default().to_owned(),
        }
    }
}

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "VLAN")]
    id: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Subnet")]
    subnet: String,
    #[tabled(rename = "Appliance IP")]
    appliance_ip: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl VlanRow {
    fn from_outcome(v: &VlanOutcome, color: bool) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            subnet: v.subnet.clone().unwrap_or_default(),
            appliance_ip: v.appliance_ip.clone().unwrap_or_default(),
            status: paint_status(&v.status, color),
            detail: v.status.detail().unwrap_or_default().to_owned(),
        }
    }
}

fn device_table(devices: &[DeviceOutcome], color: bool) -> String {
    let rows: Vec<DeviceRow> = devices
        .iter()
        .map(|d| DeviceRow::from_outcome(d, color))
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn vlan_table(vlans: &[VlanOutcome], color: bool) -> String {
    let rows: Vec<VlanRow> = vlans.iter().map(|v| VlanRow::from_outcome(v, color)).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Summaries ────────────────────────────────────────────────────────

pub fn deploy_summary(report: &DeployReport, color: bool) -> String {
    let mut out = vec![
        format!(
            "Network   {} ({}){}",
            report.network,
            report.network_id,
            if report.created { "" } else { " [existing]" }
        ),
        format!("Template  {}", report.template),
        format!("Subnet    {}", report.base_subnet),
        format!("Products  {}", report.product_types.join(", ")),
        format!(
            "Remap     {}",
            match report.remap.status {
                RemapStatus::Verified => "verified",
                RemapStatus::RemappedWithWarnings => "remapped with warnings",
                RemapStatus::Skipped => "skipped",
            }
        ),
        format!(
            "Time zone {}",
            match report.time_zone {
                TimeZoneOutcome::NotRequested => "not requested".to_owned(),
                TimeZoneOutcome::Set { ref time_zone } => time_zone.clone(),
                TimeZoneOutcome::Failed { ref reason } => format!("failed ({reason})"),
            }
        ),
    ];
    if !report.licenses.is_empty() {
        let failed = report.licenses.iter().filter(|l| l.status.is_failed()).count();
        out.push(format!(
            "Licenses  {} claimed, {failed} failed",
            report.licenses.len() - failed
        ));
    }
    if !report.devices.is_empty() {
        out.push(device_table(&report.devices, color));
    }
    if !report.remap.vlans.is_empty() {
        out.push(vlan_table(&report.remap.vlans, color));
    }
    out.join("\n")
}

pub fn migration_summary(report: &MigrationReport, color: bool) -> String {
    let mut out = vec![
        format!("Network   {} ({})", report.network, report.network_id),
        format!(
            "Template  {} -> {}",
            report.previous_template_id.as_deref().unwrap_or("(none)"),
            report.template
        ),
        format!("Captured  {} VLANs", report.snapshot.len()),
    ];
    if !report.vlans.is_empty() {
        out.push(vlan_table(&report.vlans, color));
    }
    out.join("\n")
}

pub fn add_devices_summary(report: &AddDevicesReport, color: bool) -> String {
    let mut out = vec![
        format!("Network   {} ({})", report.network, report.network_id),
        format!("Prefix    {}", report.hostname_prefix),
    ];
    if let Some(ref address) = report.address {
        out.push(format!("Address   {address}"));
    }
    if !report.devices.is_empty() {
        out.push(device_table(&report.devices, color));
    }
    out.join("\n")
}

/// Render a report in the chosen format and print it to stdout.
pub fn print_report<T: Serialize>(
    format: OutputFormat,
    report: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<(), CliError> {
    let rendered = match format {
        OutputFormat::Text => text(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
