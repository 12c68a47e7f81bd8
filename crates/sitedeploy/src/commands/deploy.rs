//! `deploy` handler.

use secrecy::SecretString;
use tracing::{info, warn};

use sitedeploy_core::{DeployRequest, GeocodeClient, TransportConfig, deploy};

use crate::cli::DeployArgs;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{RunContext, serials_from_args};

pub async fn handle(ctx: &RunContext<'_>, args: DeployArgs) -> Result<(), CliError> {
    let serials = serials_from_args(&args.serials)?;
    let session = ctx.open_session(&args.network).await?;

    let (profile_name, profile) = config::active_profile(ctx.global, &ctx.config)?;
    let google_key = args
        .google_key
        .map(SecretString::from)
        .or_else(|| config::resolve_google_key(&profile, &profile_name));
    let transport = config::transport_for(&profile, &ctx.config.defaults);
    let geocoder = google_key.and_then(|key| geocoder(key, &transport));

    let request = DeployRequest {
        network_name: args.network,
        template_name: args.template,
        base_subnet: args.subnet,
        serials,
        licenses: args.licenses,
        tags: args.tags,
        address: args.address,
        ignore_existing: args.ignore_existing,
        guest_wifi: args.guest_wifi,
        time_zone: args
            .time_zone
            .unwrap_or_else(|| ctx.config.defaults.time_zone.clone()),
        geocoder,
    };

    let reporter = ctx
        .reporter()
        .with_spinner(format!("Deploying {}", request.network_name));
    let result = deploy(&session, request, &reporter).await;
    reporter.finish();
    let report = result?;

    output::print_report(ctx.format, &report, |r| output::deploy_summary(r, ctx.color))?;

    if report.is_complete() {
        info!(network = %report.network, "deployment complete");
        Ok(())
    } else {
        Err(CliError::Incomplete {
            workflow: "Deployment".into(),
        })
    }
}

/// A geocoder that fails to build only costs the time zone lookup.
fn geocoder(key: SecretString, transport: &TransportConfig) -> Option<GeocodeClient> {
    match GeocodeClient::new(key, transport) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "geocoding disabled");
            None
        }
    }
}
