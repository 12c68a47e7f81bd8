//! `add-devices` handler.

use sitedeploy_core::{AddDevicesRequest, add_devices};

use crate::cli::AddDevicesArgs;
use crate::error::CliError;
use crate::output;

use super::{RunContext, serials_from_args};

pub async fn handle(ctx: &RunContext<'_>, args: AddDevicesArgs) -> Result<(), CliError> {
    let serials = serials_from_args(&args.serials)?;
    let session = ctx.open_session(&args.network).await?;

    let request = AddDevicesRequest {
        network_name: args.network,
        serials,
    };

    let reporter = ctx
        .reporter()
        .with_spinner(format!("Adding devices to {}", request.network_name));
    let result = add_devices(&session, request, &reporter).await;
    reporter.finish();
    let report = result?;

    output::print_report(ctx.format, &report, |r| output::add_devices_summary(r, ctx.color))?;

    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            workflow: "Adding devices".into(),
        })
    }
}
