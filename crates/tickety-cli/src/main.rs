#![forbid(unsafe_code)]

mod cmd;
mod output;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tickety_core::config;
use tickety_core::error::ErrorCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "tk",
    author,
    version,
    about = "tickety: a small local ticket tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Directory holding ticket data (overrides `TICKETY_DATA_DIR` and config).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List tickets",
        long_about = "List tickets, most recent first, with a count for every status.",
        after_help = "EXAMPLES:\n    # List every ticket\n    tk list\n\n    # Only tickets in progress\n    tk list --status in_progress\n\n    # Emit machine-readable output\n    tk list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one ticket",
        long_about = "Show full details for a single ticket by ID.",
        after_help = "EXAMPLES:\n    # Show a ticket\n    tk show 3f9a1c2b7d4e019a5b6c7d8e\n\n    # Use a short prefix when unique\n    tk show 3f9a\n\n    # Emit machine-readable output\n    tk show 3f9a --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Create a ticket",
        long_about = "Create a new ticket and put it at the top of the list.",
        after_help = "EXAMPLES:\n    # Create a ticket with defaults (open, medium)\n    tk create --title \"Fix login bug\"\n\n    # Set every field\n    tk create -t \"Fix login bug\" -d \"Session drops on refresh\" -s in_progress -p high\n\n    # Emit machine-readable output\n    tk create --title \"Fix login bug\" --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Edit a ticket",
        long_about = "Change the title, description, status or priority of a ticket.",
        after_help = "EXAMPLES:\n    # Mark a ticket done\n    tk edit 3f9a --status done\n\n    # Rename and reprioritize\n    tk edit 3f9a --title \"Fix SSO login\" --priority high"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Delete a ticket",
        long_about = "Remove a ticket from the collection.",
        after_help = "EXAMPLES:\n    # Delete a ticket\n    tk delete 3f9a\n\n    # Skip the confirmation prompt\n    tk delete 3f9a --force"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Reset to the example tickets",
        long_about = "Replace every ticket with a freshly generated example set.",
        after_help = "EXAMPLES:\n    # Start over with example tickets\n    tk reset --force"
    )]
    Reset(cmd::reset::ResetArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Remove all tickets",
        long_about = "Remove every ticket, leaving an empty collection.",
        after_help = "EXAMPLES:\n    # Remove everything without prompting\n    tk clear --force"
    )]
    Clear(cmd::clear::ClearArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completions",
        long_about = "Print a shell completion script for tk to stdout.",
        after_help = "EXAMPLES:\n    # Bash\n    tk completions bash > ~/.local/share/bash-completion/completions/tk\n\n    # Zsh\n    tk completions zsh > ~/.zfunc/_tk"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TICKETY_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tickety=debug,info"
        } else {
            "tickety=info,warn"
        })
    });

    let format = env::var("TICKETY_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn config_error(output: OutputMode, err: anyhow::Error) -> anyhow::Result<()> {
    render_error(
        output,
        &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
    )?;
    Err(err)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let user = match config::load_user_config() {
        Ok(user) => user,
        Err(err) => {
            let output = output::resolve_output_mode(cli.format, cli.json, None);
            return config_error(output, err);
        }
    };
    let output = output::resolve_output_mode(cli.format, cli.json, user.output.as_deref());
    let effective = match config::resolve_config(cli.data_dir.as_deref(), user) {
        Ok(effective) => effective,
        Err(err) => return config_error(output, err),
    };
    debug!(
        data_dir = %effective.data_dir.display(),
        key = %effective.storage_key,
        ?output,
        "resolved configuration"
    );

    let ctx = cmd::Context::new(output, &effective);
    match &cli.command {
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::Create(args) => cmd::create::run_create(args, &ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, &ctx),
        Commands::Reset(args) => cmd::reset::run_reset(args, &ctx),
        Commands::Clear(args) => cmd::clear::run_clear(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
