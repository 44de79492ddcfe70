//! `tk create`: create a new ticket.

use clap::Args;
use tickety_core::{NewTicket, Priority, Status};

use crate::cmd::Context;
use crate::output::{render_error, render_success};
use crate::validate;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title of the new ticket (at least 3 characters).
    #[arg(short, long)]
    pub title: String,

    /// Description text.
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Initial status: open, in-progress or done.
    #[arg(short, long, default_value = "open")]
    pub status: Status,

    /// Priority: low, medium or high.
    #[arg(short, long, default_value = "medium")]
    pub priority: Priority,
}

pub fn run_create(args: &CreateArgs, ctx: &Context) -> anyhow::Result<()> {
    let title = match validate::validate_title(&args.title) {
        Ok(title) => title,
        Err(e) => {
            render_error(ctx.output, &e.to_cli_error())?;
            anyhow::bail!("{}", e.reason);
        }
    };

    let mut store = ctx.open_store();
    let ticket = store.create(
        NewTicket::titled(title)
            .description(args.description.as_str())
            .status(args.status)
            .priority(args.priority),
    );
    ctx.warn_if_degraded(&store);

    if ctx.output.is_json() {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
        return Ok(());
    }
    render_success(
        ctx.output,
        &format!("Created ticket {}: {}", ticket.id, ticket.title),
        serde_json::Value::Null,
    )
}
