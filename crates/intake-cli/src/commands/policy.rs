use crate::client::{AppContext, CliResult};
use crate::output::render_policy;

pub(crate) fn handle_policy(ctx: &AppContext) -> CliResult<()> {
    render_policy(&ctx.config, ctx.output)
}
