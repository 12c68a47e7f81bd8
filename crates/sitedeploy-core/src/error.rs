// ── Core error types ──
//
// Fatal outcomes of a provisioning run. Partial failures (one VLAN, one
// device) are not errors: workflows record them in their reports and keep
// going. The `From<sitedeploy_api::Error>` impl translates transport-layer
// errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the dashboard at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Dashboard request timed out")]
    Timeout,

    #[error("Rate limit persisted after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Organization not found: {name}")]
    OrganizationNotFound { name: String },

    #[error("Network not found: {name}")]
    NetworkNotFound { name: String },

    #[error("Configuration template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("{kind} name {query:?} matches several entries: {}", candidates.join(", "))]
    AmbiguousMatch {
        kind: &'static str,
        query: String,
        candidates: Vec<String>,
    },

    // ── Precondition errors ──────────────────────────────────────────
    #[error("Network already exists: {name}")]
    NetworkExists { name: String },

    #[error("Serials not found in inventory (license key or typo?): {}", serials.join(", "))]
    InvalidSerials { serials: Vec<String> },

    #[error("Devices already attached to a network: {}", serials.join(", "))]
    DevicesInUse { serials: Vec<String> },

    #[error("Invalid site network name {name:?}: {reason}")]
    InvalidSiteName { name: String, reason: String },

    #[error("Unknown maison code {code:?}")]
    UnknownMaison { code: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Cancelled by operator")]
    Cancelled,

    // ── Mutation errors ──────────────────────────────────────────────
    #[error("Unable to bind network {network} to template: {message}")]
    BindFailed { network: String, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sitedeploy_api::Error> for CoreError {
    fn from(err: sitedeploy_api::Error) -> Self {
        use sitedeploy_api::Error as ApiError;

        match err {
            ApiError::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::validation(format!("Invalid URL: {e}")),
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::RateLimitExceeded { attempts } => CoreError::RateLimitExceeded { attempts },
            ApiError::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::Geocode { status, message } => CoreError::Api {
                message: format!("{status}: {message}"),
                status: None,
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
