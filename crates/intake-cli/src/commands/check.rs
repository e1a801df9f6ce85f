use anyhow::anyhow;
use intake_core::{SelectedFile, validate};

use crate::cli::CheckArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_check;

/// Validate a local file against the configured policy without uploading it.
pub(crate) async fn handle_check(ctx: &AppContext, args: CheckArgs) -> CliResult<()> {
    let file = SelectedFile::from_path(&args.path, args.content_type.as_deref())
        .await
        .map_err(|err| CliError::failure(anyhow!("cannot read {}: {err}", args.path.display())))?;

    let policy = ctx.config.policy.to_policy();
    let verdict = validate(&file.candidate, &policy);
    render_check(&file.candidate, verdict.as_ref().err(), ctx.output)?;
    verdict.map_err(|rejection| CliError::validation(rejection.reason))
}
