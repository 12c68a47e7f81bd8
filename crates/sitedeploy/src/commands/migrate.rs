//! `migrate` handler.

use tracing::info;

use sitedeploy_core::{MigrationRequest, migrate};

use crate::cli::MigrateArgs;
use crate::error::CliError;
use crate::output::{self, ConsolePrompter};

use super::RunContext;

pub async fn handle(ctx: &RunContext<'_>, args: MigrateArgs) -> Result<(), CliError> {
    let session = ctx.open_session(&args.network).await?;
    let prompter = ConsolePrompter::new(ctx.global.yes);

    let request = MigrationRequest {
        network: args.network,
        template: args.template,
    };

    // Prompts draw on stderr, so no spinner here.
    let reporter = ctx.reporter();
    let report = migrate(&session, request, &prompter, &reporter).await?;

    output::print_report(ctx.format, &report, |r| output::migration_summary(r, ctx.color))?;

    if report.is_complete() {
        info!(network = %report.network, template = %report.template, "migration complete");
        Ok(())
    } else {
        Err(CliError::Incomplete {
            workflow: "Migration".into(),
        })
    }
}
