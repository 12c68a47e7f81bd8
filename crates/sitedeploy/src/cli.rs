//! Clap derive structures for the `sitedeploy` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. This
//! file is also compiled by `build.rs` for man page generation, so it only
//! depends on `clap` and `clap_complete`.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitedeploy -- provision retail sites on the Meraki dashboard
#[derive(Debug, Parser)]
#[command(
    name = "sitedeploy",
    version,
    about = "Provision retail sites on the Meraki dashboard",
    long_about = "Provision retail sites on the Meraki dashboard.\n\n\
        Creates site networks, claims and names devices, binds configuration\n\
        templates and derives per-site VLAN addressing from a base /24.\n\n\
        Progress lines are prefixed with '@ ' on stdout; diagnostics go to stderr.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "SITEDEPLOY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard API key (overrides profile)
    #[arg(
        long,
        short = 'k',
        env = "SITEDEPLOY_API_KEY",
        global = true,
        hide_env_values = true
    )]
    pub api_key: Option<String>,

    /// Organization name (overrides profile)
    #[arg(long, short = 'o', env = "SITEDEPLOY_ORG", global = true)]
    pub org: Option<String>,

    /// Dashboard region (auto picks China for CN_ networks)
    #[arg(long, global = true)]
    pub region: Option<RegionArg>,

    /// Output format for the final summary
    #[arg(long, env = "SITEDEPLOY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress lines (errors and the summary are still printed)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SITEDEPLOY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Attempts per request before giving up on rate limits
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Dashboard base URL (testing against a local mock)
    #[arg(long, env = "SITEDEPLOY_BASE_URL", global = true, hide = true)]
    pub base_url: Option<String>,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegionArg {
    /// Pick by network name (CN_ prefix means China)
    Auto,
    /// api.meraki.com
    Worldwide,
    /// api.meraki.cn
    China,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Progress lines and a summary table (default)
    Text,
    /// Pretty-printed JSON report
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new site network and provision its devices
    Deploy(DeployArgs),

    /// Rebind a site to another template, preserving VLAN settings
    Migrate(MigrateArgs),

    /// Claim and name additional devices into an existing site
    #[command(alias = "add")]
    AddDevices(AddDevicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEPLOY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Device serials (space or comma separated)
    #[arg(long = "serial", short = 's', num_args = 1.., required = true)]
    pub serials: Vec<String>,

    /// Site network name, e.g. GB_MTB
    #[arg(long = "network", short = 'n')]
    pub network: String,

    /// Exact configuration template name
    #[arg(long = "template", short = 'c')]
    pub template: String,

    /// Site base subnet, e.g. 10.10.20.0/24
    #[arg(long = "subnet", short = 'w')]
    pub subnet: String,

    /// Tags applied to every device
    #[arg(long = "tag", short = 't', num_args = 1..)]
    pub tags: Vec<String>,

    /// Street address for every device
    #[arg(long, short = 'a')]
    pub address: Option<String>,

    /// Google API key for time zone lookup (overrides profile)
    #[arg(
        long = "google-key",
        short = 'g',
        env = "SITEDEPLOY_GOOGLE_KEY",
        hide_env_values = true
    )]
    pub google_key: Option<String>,

    /// Do not abort when the network name already exists
    #[arg(long, short = 'm')]
    pub ignore_existing: bool,

    /// Also remap the guest-only VLANs
    #[arg(long, short = 'x')]
    pub guest_wifi: bool,

    /// License keys to claim alongside the devices
    #[arg(long = "license", num_args = 1..)]
    pub licenses: Vec<String>,

    /// Time zone when geocoding is unavailable (overrides profile)
    #[arg(long)]
    pub time_zone: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MIGRATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Site network name
    #[arg(long = "network", short = 'n')]
    pub network: String,

    /// Target template name (exact, or a unique fragment)
    #[arg(long = "template", short = 't')]
    pub template: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ADD DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AddDevicesArgs {
    /// Device serials (space or comma separated)
    #[arg(long = "serial", short = 's', num_args = 1.., required = true)]
    pub serials: Vec<String>,

    /// Existing site network name
    #[arg(long = "network", short = 'n')]
    pub network: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the dashboard API key in the system keyring (uses --profile)
    SetKey {
        /// Store the Google geocoding key instead
        #[arg(long)]
        google: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
