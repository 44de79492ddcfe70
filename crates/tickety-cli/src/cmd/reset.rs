//! `tk reset`: replace every ticket with a fresh example set.

use clap::Args;

use crate::cmd::{Context, confirm};
use crate::output::render_success;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

pub fn run_reset(args: &ResetArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    let previous = store.len();

    if !args.force && !confirm(&format!("Replace {previous} ticket(s) with the example set?"))? {
        anyhow::bail!("reset cancelled");
    }

    store.reset_seed();
    ctx.warn_if_degraded(&store);

    let ids: Vec<&str> = store.tickets().iter().map(|t| t.id.as_str()).collect();
    render_success(
        ctx.output,
        &format!("Reset to {} example tickets", ids.len()),
        serde_json::json!({ "removed": previous, "ids": ids }),
    )
}
