//! Configuration for the sitedeploy CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `sitedeploy_core::SessionConfig`. The CLI layers its own
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitedeploy_core::{
    DEFAULT_TIME_ZONE, Pacing, Region, RetryPolicy, SessionConfig, TlsMode, TransportConfig,
    region_for_network,
};

/// Keyring service every secret is stored under.
pub const KEYRING_SERVICE: &str = "sitedeploy";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no organization configured for profile '{profile}'")]
    NoOrganization { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named dashboard profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Sorted profile names, for listings and error help.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Time zone given to newly created networks.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            time_zone: default_time_zone(),
        }
    }
}

fn default_output() -> String {
    "text".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    5
}
fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.into()
}

/// Which dashboard host a profile talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionSetting {
    /// China for `CN...` networks, worldwide otherwise.
    #[default]
    Auto,
    Worldwide,
    China,
}

impl RegionSetting {
    pub fn resolve(self, network_name: Option<&str>) -> Region {
        match self {
            Self::Auto => network_name.map_or(Region::Worldwide, region_for_network),
            Self::Worldwide => Region::Worldwide,
            Self::China => Region::China,
        }
    }
}

/// A named dashboard profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Organization name on the worldwide dashboard.
    pub organization: Option<String>,

    /// Organization name on the China dashboard, if it differs.
    pub organization_cn: Option<String>,

    #[serde(default)]
    pub region: RegionSetting,

    /// Dashboard API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Geocoding API key used to set network time zones.
    pub google_api_key: Option<String>,

    /// Replaces the regional dashboard host.
    pub base_url: Option<String>,

    /// Path to an extra CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override rate-limit attempts.
    pub max_retries: Option<u32>,
}

impl Profile {
    /// Organization name for the region a run targets.
    pub fn organization_for(&self, region: Region) -> Option<&str> {
        match region {
            Region::China => self
                .organization_cn
                .as_deref()
                .or(self.organization.as_deref()),
            Region::Worldwide => self.organization.as_deref(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "sitedeploy", "sitedeploy").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitedeploy");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if present), then `SITEDEPLOY_*` env vars.
///
/// Nested keys use a double underscore: `SITEDEPLOY_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SITEDEPLOY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str, secret: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{secret}"))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Resolve the dashboard API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name, "api-key") {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Geocoding key from the keyring or the profile. Absent is not an error.
pub fn resolve_google_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    keyring_entry(profile_name, "google-key")
        .ok()
        .and_then(|entry| entry.get_password().ok())
        .or_else(|| profile.google_api_key.clone())
        .map(SecretString::from)
}

/// Store a secret (`api-key` or `google-key`) for a profile in the system keyring.
pub fn store_secret(profile_name: &str, secret: &str, value: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, secret)?
        .set_password(value)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation to core ─────────────────────────────────────────────

/// Connection tuning from a profile, falling back to the global defaults.
pub fn transport_for(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = profile
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);
    TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        retry: RetryPolicy {
            max_attempts: profile.max_retries.unwrap_or(defaults.max_retries).max(1),
            ..RetryPolicy::default()
        },
    }
}

/// Build a `SessionConfig` from a profile, with no CLI flag overrides.
///
/// `network_name` picks the region when the profile's region is `auto`.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    network_name: Option<&str>,
) -> Result<SessionConfig, ConfigError> {
    let region = profile.region.resolve(network_name);
    let organization = profile
        .organization_for(region)
        .ok_or_else(|| ConfigError::NoOrganization {
            profile: profile_name.into(),
        })?
        .to_owned();

    Ok(SessionConfig {
        api_key: resolve_api_key(profile, profile_name)?,
        organization,
        region,
        base_url: profile.base_url.clone(),
        transport: transport_for(profile, defaults),
        pacing: Pacing::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.time_zone, "Europe/Helsinki");
        assert_eq!(cfg.defaults.max_retries, 5);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profiles_load_from_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            r#"
default_profile = "emea"

[defaults]
timeout = 45

[profiles.emea]
organization = "RISA"
organization_cn = "RISA CN"
api_key = "plain-key"

[profiles.lab]
organization = "Lab"
region = "worldwide"
base_url = "http://127.0.0.1:9000"
max_retries = 2
"#,
        );

        let cfg = load_config_from(&path).expect("load");
        assert_eq!(cfg.default_profile.as_deref(), Some("emea"));
        assert_eq!(cfg.defaults.timeout, 45);
        assert_eq!(cfg.defaults.output, "text");
        assert_eq!(cfg.profile_names(), vec!["emea", "lab"]);

        let lab = &cfg.profiles["lab"];
        assert_eq!(lab.region, RegionSetting::Worldwide);
        assert_eq!(lab.base_url.as_deref(), Some("http://127.0.0.1:9000"));

        let emea = &cfg.profiles["emea"];
        assert_eq!(emea.region, RegionSetting::Auto);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                organization: Some("RISA".into()),
                region: RegionSetting::China,
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.profiles, cfg.profiles);
    }

    #[test]
    fn auto_region_follows_network_name() {
        assert_eq!(RegionSetting::Auto.resolve(Some("CNSH_CAR")), Region::China);
        assert_eq!(RegionSetting::Auto.resolve(Some("GB_MTB")), Region::Worldwide);
        assert_eq!(RegionSetting::Auto.resolve(None), Region::Worldwide);
        assert_eq!(RegionSetting::China.resolve(Some("GB_MTB")), Region::China);
    }

    #[test]
    fn china_organization_falls_back_to_worldwide_name() {
        let profile = Profile {
            organization: Some("RISA".into()),
            ..Profile::default()
        };
        assert_eq!(profile.organization_for(Region::China), Some("RISA"));

        let profile = Profile {
            organization: Some("RISA".into()),
            organization_cn: Some("RISA CN".into()),
            ..Profile::default()
        };
        assert_eq!(profile.organization_for(Region::China), Some("RISA CN"));
        assert_eq!(profile.organization_for(Region::Worldwide), Some("RISA"));
    }

    #[test]
    fn api_key_env_wins_over_plaintext() {
        // Cargo sets this for every test process.
        let profile = Profile {
            api_key_env: Some("CARGO_PKG_NAME".into()),
            api_key: Some("from-file".into()),
            ..Profile::default()
        };
        let key = resolve_api_key(&profile, "env-test-profile").expect("key");
        assert_eq!(key.expose_secret(), "sitedeploy-config");
    }

    #[test]
    fn session_config_uses_profile_tuning() {
        let profile = Profile {
            organization: Some("RISA".into()),
            api_key: Some("plain".into()),
            timeout: Some(5),
            max_retries: Some(0),
            ..Profile::default()
        };
        let cfg = profile_to_session_config(
            &profile,
            "tuning-test-profile",
            &Defaults::default(),
            Some("CNBJ_CAR"),
        )
        .expect("session config");
        assert_eq!(cfg.organization, "RISA");
        assert_eq!(cfg.region, Region::China);
        assert_eq!(cfg.transport.timeout, Duration::from_secs(5));
        assert_eq!(cfg.transport.retry.max_attempts, 1);
    }

    #[test]
    fn missing_organization_is_reported() {
        let profile = Profile {
            api_key: Some("plain".into()),
            ..Profile::default()
        };
        let err = profile_to_session_config(&profile, "p", &Defaults::default(), None)
            .expect_err("no org");
        assert!(matches!(err, ConfigError::NoOrganization { .. }));
    }
}
