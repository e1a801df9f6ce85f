use anyhow::anyhow;

use crate::client::{AppContext, CliError, CliResult, classify_http_error};
use crate::output::{render_health, render_listing};

pub(crate) async fn handle_health(ctx: &AppContext) -> CliResult<()> {
    let health = ctx
        .endpoint_client()
        .health()
        .await
        .map_err(classify_http_error)?;
    render_health(&health, ctx.output)?;
    if health.is_healthy() {
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "endpoint reported status '{}'",
            health.status
        )))
    }
}

pub(crate) async fn handle_files(ctx: &AppContext) -> CliResult<()> {
    let listing = ctx
        .endpoint_client()
        .list_files()
        .await
        .map_err(classify_http_error)?;
    render_listing(&listing, ctx.output)
}
