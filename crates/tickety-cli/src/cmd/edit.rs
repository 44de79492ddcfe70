//! `tk edit`: change fields on an existing ticket.
//!
//! Only the flags given are changed; the ticket keeps its id, creation time
//! and position in the list.

use clap::Args;
use tickety_core::{Priority, Status, TicketPatch};

use crate::cmd::Context;
use crate::cmd::show::{LookupError, find_ticket};
use crate::output::{CliError, render_error, render_success};
use crate::validate;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Ticket ID (a unique prefix is enough).
    pub id: String,

    /// New title (at least 3 characters).
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description. Pass an empty string to clear it.
    #[arg(short, long)]
    pub description: Option<String>,

    /// New status: open, in-progress or done.
    #[arg(short, long)]
    pub status: Option<Status>,

    /// New priority: low, medium or high.
    #[arg(short, long)]
    pub priority: Option<Priority>,
}

impl EditArgs {
    fn to_patch(&self) -> Result<TicketPatch, validate::ValidationError> {
        let title = self
            .title
            .as_deref()
            .map(validate::validate_title)
            .transpose()?;
        Ok(TicketPatch {
            title,
            description: self.description.as_ref().map(|d| d.trim().to_string()),
            status: self.status,
            priority: self.priority,
        })
    }
}

pub fn run_edit(args: &EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let patch = match args.to_patch() {
        Ok(patch) => patch,
        Err(e) => {
            render_error(ctx.output, &e.to_cli_error())?;
            anyhow::bail!("{}", e.reason);
        }
    };
    if patch.is_empty() {
        render_error(
            ctx.output,
            &CliError {
                suggestion: Some(
                    "pass at least one of --title, --description, --status or --priority"
                        .to_string(),
                ),
                ..CliError::new("nothing to change")
            },
        )?;
        anyhow::bail!("nothing to change");
    }

    let mut store = ctx.open_store();
    let current = find_ticket(ctx, &store, &args.id)?;
    let Some(updated) = store.update(&current.id, patch) else {
        let err = LookupError::NotFound(current.id);
        render_error(ctx.output, &err.to_cli_error())?;
        return Err(err.into());
    };
    ctx.warn_if_degraded(&store);

    if ctx.output.is_json() {
        println!("{}", serde_json::to_string_pretty(&updated)?);
        return Ok(());
    }
    render_success(
        ctx.output,
        &format!("Updated ticket {}: {}", updated.id, updated.title),
        serde_json::Value::Null,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: EditArgs,
    }

    #[test]
    fn edit_args_only_id_is_required() {
        let w = Wrapper::parse_from(["test", "abc"]);
        assert_eq!(w.args.id, "abc");
        assert!(w.args.to_patch().unwrap().is_empty());
    }

    #[test]
    fn edit_patch_validates_and_trims_title() {
        let w = Wrapper::parse_from(["test", "abc", "--title", "  Renamed  ", "-s", "done"]);
        let patch = w.args.to_patch().unwrap();
        assert_eq!(patch.title.as_deref(), Some("Renamed"));
        assert_eq!(patch.status, Some(Status::Done));
        assert!(patch.priority.is_none());

        let w = Wrapper::parse_from(["test", "abc", "--title", "no"]);
        assert!(w.args.to_patch().is_err());
    }

    #[test]
    fn edit_empty_description_clears() {
        let w = Wrapper::parse_from(["test", "abc", "--description", ""]);
        let patch = w.args.to_patch().unwrap();
        assert_eq!(patch.description.as_deref(), Some(""));
        assert!(!patch.is_empty());
    }
}
