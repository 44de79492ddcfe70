//! `tk show`: ticket detail page.
//!
//! Also home to ticket id resolution shared by every command that takes an
//! id: an exact match wins, otherwise the input must be a unique prefix.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Local, Utc};
use clap::Args;
use tickety_core::error::ErrorCode;
use tickety_core::{Ticket, TicketStore};

use crate::cmd::Context;
use crate::output::{
    CliError, Renderable, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Ticket ID (a unique prefix is enough).
    pub id: String,
}

/// Why an id argument did not pick out exactly one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound(String),
    Ambiguous { input: String, matches: Vec<String> },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(input) => write!(f, "ticket '{input}' not found"),
            Self::Ambiguous { input, matches } => write!(
                f,
                "ticket id '{input}' is ambiguous ({} matches: {})",
                matches.len(),
                matches.join(", ")
            ),
        }
    }
}

impl std::error::Error for LookupError {}

impl LookupError {
    pub fn to_cli_error(&self) -> CliError {
        let code = match self {
            Self::NotFound(_) => ErrorCode::TicketNotFound,
            Self::Ambiguous { .. } => ErrorCode::AmbiguousId,
        };
        CliError::from_code(code, self.to_string())
    }
}

/// Resolve `input` against `tickets`: exact id first, then unique prefix.
pub fn resolve_ticket_id(tickets: &[Ticket], input: &str) -> Result<String, LookupError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LookupError::NotFound(input.to_string()));
    }

    if let Some(ticket) = tickets.iter().find(|t| t.id == input) {
        return Ok(ticket.id.clone());
    }

    let mut matches: Vec<String> = tickets
        .iter()
        .filter(|t| t.id.starts_with(input))
        .map(|t| t.id.clone())
        .collect();

    match matches.len() {
        0 => Err(LookupError::NotFound(input.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(LookupError::Ambiguous {
            input: input.to_string(),
            matches,
        }),
    }
}

/// Look up the ticket `input` names, reporting a failure in the active mode.
pub fn find_ticket(ctx: &Context, store: &TicketStore, input: &str) -> anyhow::Result<Ticket> {
    let found = resolve_ticket_id(store.tickets(), input)
        .and_then(|id| store.get_by_id(&id).ok_or(LookupError::NotFound(id)));
    match found {
        Ok(ticket) => Ok(ticket),
        Err(err) => {
            ctx.warn_if_degraded(store);
            render_error(ctx.output, &err.to_cli_error())?;
            Err(err.into())
        }
    }
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_store();
    let ticket = find_ticket(ctx, &store, &args.id)?;
    ctx.warn_if_degraded(&store);

    render_mode(ctx.output, &ticket, render_show_text, render_show_human)
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn render_show_human(ticket: &Ticket, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Ticket {}", ticket.id))?;
    writeln!(w, "{}", ticket.title)?;
    pretty_rule(w)?;
    pretty_kv(w, "status", ticket.status.label())?;
    pretty_kv(w, "priority", &ticket.priority.to_string())?;
    pretty_kv(w, "created", &local_time(ticket.created_at))?;
    pretty_kv(w, "updated", &local_time(ticket.updated_at))?;

    if !ticket.description.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Description")?;
        for line in ticket.description.lines() {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

fn render_show_text(ticket: &Ticket, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id:          {}", ticket.id)?;
    writeln!(w, "title:       {}", ticket.title)?;
    writeln!(w, "status:      {}", ticket.status)?;
    writeln!(w, "priority:    {}", ticket.priority)?;
    writeln!(w, "created_at:  {}", ticket.created_at.to_rfc3339())?;
    writeln!(w, "updated_at:  {}", ticket.updated_at.to_rfc3339())?;
    if !ticket.description.is_empty() {
        writeln!(w)?;
        for line in ticket.description.lines() {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

impl Renderable for Ticket {
    fn render_human(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let short_id: String = self.id.chars().take(8).collect();
        let title: String = if self.title.chars().count() > 48 {
            let cut: String = self.title.chars().take(47).collect();
            format!("{cut}…")
        } else {
            self.title.clone()
        };
        writeln!(
            w,
            "{short_id:<8}  {:<11}  {:<6}  {title}",
            self.status.label(),
            self.priority
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.id, self.status, self.priority, self.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "status", "priority", "title"]
    }
}
