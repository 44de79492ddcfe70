//! `tk delete`: remove a ticket from the collection.

use clap::Args;

use crate::cmd::show::{LookupError, find_ticket};
use crate::cmd::{Context, confirm};
use crate::output::{render_error, render_success};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Ticket ID to delete (a unique prefix is enough).
    pub id: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    let ticket = find_ticket(ctx, &store, &args.id)?;

    if !args.force && !confirm(&format!("Delete {} '{}'?", ticket.id, ticket.title))? {
        anyhow::bail!("deletion of '{}' cancelled", ticket.id);
    }

    if !store.remove(&ticket.id) {
        let err = LookupError::NotFound(ticket.id);
        render_error(ctx.output, &err.to_cli_error())?;
        return Err(err.into());
    }
    ctx.warn_if_degraded(&store);

    render_success(
        ctx.output,
        &format!("Deleted ticket {}: {}", ticket.id, ticket.title),
        serde_json::json!({ "id": ticket.id }),
    )
}
