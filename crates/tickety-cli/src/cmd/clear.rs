//! `tk clear`: remove every ticket.

use clap::Args;

use crate::cmd::{Context, confirm};
use crate::output::render_success;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

pub fn run_clear(args: &ClearArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    let removed = store.len();

    if !args.force && !confirm(&format!("Delete all {removed} ticket(s)?"))? {
        anyhow::bail!("clear cancelled");
    }

    store.clear_all();
    ctx.warn_if_degraded(&store);

    render_success(
        ctx.output,
        &format!("Removed {removed} ticket(s)"),
        serde_json::json!({ "removed": removed }),
    )
}
