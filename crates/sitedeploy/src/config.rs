//! CLI configuration: a thin layer over `sitedeploy_config`.
//!
//! Adds the `GlobalOpts` flag overrides (--api-key, --org, --region, ...)
//! on top of the profile chain.

use std::time::Duration;

use secrecy::SecretString;

use sitedeploy_config::RegionSetting;
use sitedeploy_core::{Pacing, SessionConfig};

use crate::cli::{GlobalOpts, RegionArg};
use crate::error::CliError;

pub use sitedeploy_config::{
    Config, Profile, config_path, load_config_or_default, resolve_google_key, save_config,
    store_secret, transport_for,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The profile a run uses. An explicitly requested profile must exist;
/// the implicit `default` may be absent when flags carry everything.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_none() => Ok((name, Profile::default())),
        None => {
            let mut available = config.profile_names();
            if available.is_empty() {
                available.push("(none)".into());
            }
            Err(CliError::ProfileNotFound {
                name,
                available: available.join(", "),
            })
        }
    }
}

impl From<RegionArg> for RegionSetting {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::Auto => Self::Auto,
            RegionArg::Worldwide => Self::Worldwide,
            RegionArg::China => Self::China,
        }
    }
}

/// Build the session configuration for a run against `network_name`.
///
/// CLI flags take priority over profile values.
pub fn session_config(
    global: &GlobalOpts,
    config: &Config,
    network_name: &str,
) -> Result<SessionConfig, CliError> {
    let (name, profile) = active_profile(global, config)?;

    let region = global
        .region
        .map_or(profile.region, RegionSetting::from)
        .resolve(Some(network_name));

    let organization = match global.org {
        Some(ref org) => org.clone(),
        None => profile
            .organization_for(region)
            .ok_or_else(|| CliError::NoOrganization {
                profile: name.clone(),
            })?
            .to_owned(),
    };

    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => sitedeploy_config::resolve_api_key(&profile, &name)?,
    };

    let mut transport = transport_for(&profile, &config.defaults);
    if let Some(secs) = global.timeout {
        transport.timeout = Duration::from_secs(secs);
    }
    if let Some(attempts) = global.max_retries {
        transport.retry.max_attempts = attempts.max(1);
    }

    Ok(SessionConfig {
        api_key,
        organization,
        region,
        base_url: global.base_url.clone().or(profile.base_url),
        transport,
        pacing: Pacing::default(),
    })
}
