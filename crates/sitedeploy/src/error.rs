//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use sitedeploy_config::ConfigError;
use sitedeploy_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the dashboard at {url}")]
    #[diagnostic(
        code(sitedeploy::connection_failed),
        help(
            "Check network access to the dashboard API.\n\
             {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Dashboard request timed out")]
    #[diagnostic(
        code(sitedeploy::timeout),
        help("Increase the timeout with --timeout or retry later.")
    )]
    Timeout,

    #[error("Dashboard kept rate limiting after {attempts} attempts")]
    #[diagnostic(
        code(sitedeploy::rate_limited),
        help("Wait a minute and retry, or raise --max-retries.")
    )]
    RateLimited { attempts: u32 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(sitedeploy::auth_failed),
        help(
            "Verify the dashboard API key.\n\
             Run: sitedeploy config set-key --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(sitedeploy::no_credentials),
        help(
            "Configure credentials with: sitedeploy config init\n\
             Or pass --api-key / set SITEDEPLOY_API_KEY."
        )
    )]
    NoCredentials { profile: String },

    #[error("No organization configured for profile '{profile}'")]
    #[diagnostic(
        code(sitedeploy::no_organization),
        help("Pass --org, set SITEDEPLOY_ORG, or add `organization` to the profile.")
    )]
    NoOrganization { profile: String },

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sitedeploy::not_found),
        help("Names are matched exactly; check spelling and case on the dashboard.")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("{resource_type} '{query}' is ambiguous")]
    #[diagnostic(
        code(sitedeploy::ambiguous),
        help(
            "Candidates: {candidates}\n\
             Pass the full name, or run interactively to pick one."
        )
    )]
    Ambiguous {
        resource_type: String,
        query: String,
        candidates: String,
    },

    // ── Preconditions ────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(
        code(sitedeploy::conflict),
        help("Use --ignore-existing (-m) to provision the existing network anyway.")
    )]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    #[error("Serials not found in inventory: {serials}")]
    #[diagnostic(
        code(sitedeploy::invalid_serials),
        help("Check for typos or license keys passed as serials. Nothing was changed.")
    )]
    InvalidSerials { serials: String },

    #[error("Devices already attached to a network: {serials}")]
    #[diagnostic(
        code(sitedeploy::devices_in_use),
        help("Remove them from their current network first. Nothing was changed.")
    )]
    DevicesInUse { serials: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sitedeploy::validation))]
    Validation { field: String, reason: String },

    #[error("Cancelled by operator")]
    #[diagnostic(
        code(sitedeploy::cancelled),
        help("Nothing was changed. Pass --yes (-y) to confirm from scripts.")
    )]
    Cancelled,

    // ── Outcomes ─────────────────────────────────────────────────────
    #[error("{workflow} finished with failures")]
    #[diagnostic(
        code(sitedeploy::incomplete),
        help("Review the warnings above and finish the failed items on the dashboard.")
    )]
    Incomplete { workflow: String },

    #[error("Unable to bind network {network} to its template: {message}")]
    #[diagnostic(
        code(sitedeploy::bind_failed),
        help("The network and device claims remain; bind it on the dashboard or rerun with -m.")
    )]
    BindFailed { network: String, message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(sitedeploy::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sitedeploy::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sitedeploy config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(sitedeploy::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(sitedeploy::keyring),
        help("Store the key in the profile with `api_key_env` or `api_key` instead.")
    )]
    Keyring(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(sitedeploy::json))]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(sitedeploy::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Name the profile whose credentials were rejected.
    #[must_use]
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.to_owned(),
                message,
            },
            other => other,
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NoOrganization { .. }
            | Self::NotFound { .. }
            | Self::Ambiguous { .. }
            | Self::Conflict { .. }
            | Self::InvalidSerials { .. }
            | Self::DevicesInUse { .. }
            | Self::Validation { .. }
            | Self::Cancelled
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            // The profile is filled in by the caller, which knows which one ran.
            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                profile: "default".into(),
                message,
            },
            CoreError::Timeout => Self::Timeout,
            CoreError::RateLimitExceeded { attempts } => Self::RateLimited { attempts },

            CoreError::OrganizationNotFound { name } => Self::NotFound {
                resource_type: "Organization".into(),
                identifier: name,
            },
            CoreError::NetworkNotFound { name } => Self::NotFound {
                resource_type: "Network".into(),
                identifier: name,
            },
            CoreError::TemplateNotFound { name } => Self::NotFound {
                resource_type: "Configuration template".into(),
                identifier: name,
            },
            CoreError::AmbiguousMatch {
                kind,
                query,
                candidates,
            } => Self::Ambiguous {
                resource_type: kind.into(),
                query,
                candidates: candidates.join(", "),
            },

            CoreError::NetworkExists { name } => Self::Conflict {
                resource_type: "Network".into(),
                identifier: name,
            },
            CoreError::InvalidSerials { serials } => Self::InvalidSerials {
                serials: serials.join(", "),
            },
            CoreError::DevicesInUse { serials } => Self::DevicesInUse {
                serials: serials.join(", "),
            },
            CoreError::InvalidSiteName { name, reason } => Self::Validation {
                field: format!("network name {name:?}"),
                reason,
            },
            CoreError::UnknownMaison { code } => Self::Validation {
                field: "network name".into(),
                reason: format!("unknown maison code {code:?}"),
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Cancelled => Self::Cancelled,

            CoreError::BindFailed { network, message } => Self::BindFailed { network, message },
            CoreError::Api { message, status } => Self::Api { message, status },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::NoOrganization { profile } => Self::NoOrganization { profile },
            ConfigError::Keyring(message) => Self::Keyring(message),
            ConfigError::Figment(err) => Self::Config(err),
            ConfigError::Io(err) => Self::Io(err),
            ConfigError::Serialization(err) => Self::Internal(format!("failed to write config: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failures_are_usage_errors() {
        let cases = [
            CoreError::NetworkExists { name: "GB_MTB".into() },
            CoreError::InvalidSerials {
                serials: vec!["Q2AA-0001".into()],
            },
            CoreError::TemplateNotFound { name: "X".into() },
            CoreError::Cancelled,
            CoreError::UnknownMaison { code: "XYZ".into() },
        ];
        for err in cases {
            assert_eq!(CliError::from(err).exit_code(), exit_code::USAGE);
        }
    }

    #[test]
    fn auth_failure_names_the_active_profile() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "Invalid API key".into(),
        })
        .for_profile("emea");
        match err {
            CliError::AuthFailed { profile, .. } => assert_eq!(profile, "emea"),
            other => panic!("unexpected: {other}"),
        }
        assert!(matches!(
            CliError::Timeout.for_profile("emea"),
            CliError::Timeout
        ));
    }

    #[test]
    fn transport_failures_keep_distinct_codes() {
        assert_eq!(CliError::from(CoreError::Timeout).exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::from(CoreError::AuthenticationFailed {
                message: "Invalid API key".into()
            })
            .exit_code(),
            exit_code::AUTH
        );
        assert_eq!(
            CliError::from(CoreError::ConnectionFailed {
                url: "https://api.meraki.com".into(),
                reason: "refused".into()
            })
            .exit_code(),
            exit_code::CONNECTION
        );
    }

    #[test]
    fn missing_credentials_exit_with_auth_code() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "default".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn incomplete_runs_are_general_failures() {
        let err = CliError::Incomplete {
            workflow: "Deployment".into(),
        };
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn ambiguous_match_lists_candidates() {
        let err = CliError::from(CoreError::AmbiguousMatch {
            kind: "Template",
            query: "BTQ".into(),
            candidates: vec!["EMEA - BTQ Template".into(), "EMEA - Large BTQ Template".into()],
        });
        match err {
            CliError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, "EMEA - BTQ Template, EMEA - Large BTQ Template");
            }
            other => panic!("unexpected: {other}"),
        }
    }
}
