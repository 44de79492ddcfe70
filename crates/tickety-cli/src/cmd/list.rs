//! `tk list`: tickets list page.
//!
//! Shows a count badge for every status filter, then the tickets the active
//! filter lets through, most recent first.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use tickety_core::{ListView, StatusCounts, StatusFilter, Ticket};

use crate::cmd::Context;
use crate::output::{OutputMode, pretty_rule, render_mode, write_rows};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show tickets with this status: all, open, in-progress or done.
    #[arg(short, long, default_value = "all")]
    pub status: StatusFilter,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    filter: String,
    counts: StatusCounts,
    tickets: Vec<Ticket>,
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    let (view, subscription) = ListView::attach(&mut store, args.status);
    store.unsubscribe(subscription);
    ctx.warn_if_degraded(&store);

    let out = {
        let view = view.borrow();
        ListOutput {
            filter: view.filter().to_string(),
            counts: view.counts(),
            tickets: view.visible().to_vec(),
        }
    };
    tracing::debug!(
        filter = %out.filter,
        visible = out.tickets.len(),
        total = out.counts.all,
        "listing tickets"
    );

    render_mode(
        ctx.output,
        &out,
        render_list_text,
        |out, w| render_list_human(args.status, out, w),
    )
}

fn badges(active: StatusFilter, counts: StatusCounts) -> String {
    StatusFilter::ALL
        .iter()
        .map(|&filter| {
            let badge = format!("{} {}", filter.label(), counts.get(filter));
            if filter == active {
                format!("[{badge}]")
            } else {
                badge
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn render_list_human(
    active: StatusFilter,
    out: &ListOutput,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(w, "{}", badges(active, out.counts))?;
    pretty_rule(w)?;
    if out.tickets.is_empty() {
        writeln!(w, "No tickets. Create one.")?;
        return Ok(());
    }
    write_rows(&out.tickets, OutputMode::Pretty, w)
}

fn render_list_text(out: &ListOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "all={} open={} in_progress={} done={}",
        out.counts.all, out.counts.open, out.counts.in_progress, out.counts.done
    )?;
    write_rows(&out.tickets, OutputMode::Text, w)
}
