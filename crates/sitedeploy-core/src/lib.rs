// sitedeploy-core: Site provisioning workflows between sitedeploy-api and the CLI.

pub mod claim;
pub mod error;
pub mod model;
pub mod naming;
pub mod pacing;
pub mod prompt;
pub mod remap;
pub mod report;
pub mod resolver;
pub mod session;
pub mod snapshot;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use pacing::Pacing;
pub use prompt::{AssumeYes, Prompter};
pub use report::{
    DeviceOutcome, ItemStatus, RecordingReporter, Reporter, SilentReporter, VlanOutcome,
};
pub use session::{Session, SessionConfig};
pub use sitedeploy_api::{GeocodeClient, Region, RetryPolicy, TlsMode, TransportConfig};

pub use claim::{ClaimResult, ClaimedDevice, LicenseOutcome, UnplacedDevice, normalize_serials};
pub use remap::{PlannedVlan, RemapReport, RemapStatus};
pub use snapshot::VlanSnapshot;
pub use workflow::add_devices::{AddDevicesReport, AddDevicesRequest, add_devices};
pub use workflow::deploy::{
    BindOutcome, DEFAULT_TIME_ZONE, DeployReport, DeployRequest, TimeZoneOutcome, deploy,
};
pub use workflow::migrate::{MigrationReport, MigrationRequest, migrate};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AddressRange, BaseSubnet, DeviceRole, DhcpHandling, SiteName, SiteType, TemplateFamily,
    region_for_network,
};
