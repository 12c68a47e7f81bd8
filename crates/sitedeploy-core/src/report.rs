// ── Operator reporting ──
//
// Workflows narrate progress through a `Reporter`, separate from `tracing`.
// The CLI prints these lines with the `@ ` operator prefix on stdout; debug
// logging goes to stderr and never carries the prefix.

use std::sync::Mutex;

use serde::Serialize;

/// Sink for operator-facing progress lines.
pub trait Reporter: Send + Sync {
    /// A normal progress line.
    fn say(&self, line: &str);

    /// A non-fatal problem the operator should look at.
    fn warn(&self, line: &str);
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn say(&self, _line: &str) {}
    fn warn(&self, _line: &str) {}
}

/// Keeps every line in memory, warnings prefixed with `WARNING: `.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| l.strip_prefix("WARNING: ").map(str::to_owned))
            .collect()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl Reporter for RecordingReporter {
    fn say(&self, line: &str) {
        self.push(line.to_owned());
    }

    fn warn(&self, line: &str) {
        self.push(format!("WARNING: {line}"));
    }
}

// ── Per-item outcomes ────────────────────────────────────────────────

/// Result of one independent step in a partial-failure-tolerant pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ItemStatus {
    /// The dashboard accepted the change.
    Done,
    /// Nothing to do for this item.
    Skipped(String),
    /// The change was attempted and rejected.
    Failed(String),
}

impl ItemStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Done => "ok",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Done => None,
            Self::Skipped(d) | Self::Failed(d) => Some(d),
        }
    }
}

/// Outcome of naming and placing one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceOutcome {
    pub serial: String,
    pub model: String,
    pub role: Option<crate::model::DeviceRole>,
    pub hostname: Option<String>,
    pub status: ItemStatus,
}

/// Outcome of updating one appliance VLAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VlanOutcome {
    pub id: u16,
    pub name: String,
    pub subnet: Option<String>,
    pub appliance_ip: Option<String>,
    pub status: ItemStatus,
}
