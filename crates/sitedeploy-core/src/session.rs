// ── Runtime session configuration ──
//
// These types describe *how* to reach the dashboard. They carry the
// credential and connection tuning but never touch disk: the CLI builds a
// `SessionConfig` and hands it in.

use secrecy::SecretString;
use sitedeploy_api::types::Organization;
use sitedeploy_api::{DashboardClient, Region, TransportConfig};
use tracing::info;

use crate::error::CoreError;
use crate::pacing::Pacing;
use crate::resolver::{Resolver, resolve_organization};

/// Everything needed to open a session against one organization.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub api_key: SecretString,
    /// Organization name, matched exactly.
    pub organization: String,
    pub region: Region,
    /// Replaces the regional host (tests, proxies).
    pub base_url: Option<String>,
    pub transport: TransportConfig,
    pub pacing: Pacing,
}

/// An authenticated client bound to a resolved organization.
pub struct Session {
    client: DashboardClient,
    organization: Organization,
    pacing: Pacing,
}

impl Session {
    /// Build the client and resolve the organization by name.
    pub async fn open(config: SessionConfig) -> Result<Self, CoreError> {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or_else(|| config.region.base_url());
        let client = DashboardClient::from_api_key(base_url, &config.api_key, &config.transport)?;

        let organization = resolve_organization(&client, &config.organization).await?;
        info!(org = %organization.name, id = %organization.id, "organization resolved");

        Ok(Self {
            client,
            organization,
            pacing: config.pacing,
        })
    }

    /// Assemble a session from parts already resolved. Used by tests.
    pub fn from_parts(client: DashboardClient, organization: Organization, pacing: Pacing) -> Self {
        Self {
            client,
            organization,
            pacing,
        }
    }

    pub fn client(&self) -> &DashboardClient {
        &self.client
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.client, &self.organization.id)
    }
}
