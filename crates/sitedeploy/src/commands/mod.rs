//! Command dispatch: bridges CLI args -> core workflows -> output formatting.

pub mod add_devices;
pub mod config_cmd;
pub mod deploy;
pub mod migrate;

use clap::ValueEnum;
use tracing::debug;

use sitedeploy_core::{Session, normalize_serials};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output::{self, ConsoleReporter};

/// Per-run state shared by the workflow handlers.
pub struct RunContext<'a> {
    pub global: &'a GlobalOpts,
    pub config: Config,
    pub format: OutputFormat,
    pub color: bool,
}

impl<'a> RunContext<'a> {
    pub fn new(global: &'a GlobalOpts) -> Self {
        let config = config::load_config_or_default();
        let format = global.output.unwrap_or_else(|| {
            OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Text)
        });
        Self {
            global,
            config,
            format,
            color: output::should_color(),
        }
    }

    /// Progress sink for this run. JSON output keeps stdout machine-readable,
    /// so progress lines are suppressed there.
    pub fn reporter(&self) -> ConsoleReporter {
        let quiet = self.global.quiet || self.format == OutputFormat::Json;
        ConsoleReporter::new(quiet, self.color)
    }

    /// Resolve credentials and the organization, then open a session.
    pub async fn open_session(&self, network_name: &str) -> Result<Session, CliError> {
        let session_config = config::session_config(self.global, &self.config, network_name)?;
        debug!(
            organization = %session_config.organization,
            region = ?session_config.region,
            "opening dashboard session"
        );
        Ok(Session::open(session_config).await?)
    }
}

/// Serials from repeated or comma/space separated arguments.
pub fn serials_from_args(raw: &[String]) -> Result<Vec<String>, CliError> {
    let serials = normalize_serials(raw);
    if serials.is_empty() {
        return Err(CliError::Validation {
            field: "--serial".into(),
            reason: "at least one device serial is required".into(),
        });
    }
    Ok(serials)
}

/// Dispatch a dashboard-bound command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = RunContext::new(global);
    let result = match cmd {
        Command::Deploy(args) => deploy::handle(&ctx, args).await,
        Command::Migrate(args) => migrate::handle(&ctx, args).await,
        Command::AddDevices(args) => add_devices::handle(&ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    result.map_err(|e| e.for_profile(&config::active_profile_name(global, &ctx.config)))
}
