pub mod clear;
pub mod completions;
pub mod create;
pub mod delete;
pub mod edit;
pub mod list;
pub mod reset;
pub mod show;

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use tickety_core::config::EffectiveConfig;
use tickety_core::ident::SystemClock;
use tickety_core::{FileSlot, TicketRepository, TicketStore};

use crate::output::OutputMode;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    data_dir: PathBuf,
    storage_key: String,
}

impl Context {
    pub fn new(output: OutputMode, config: &EffectiveConfig) -> Self {
        Self {
            output,
            data_dir: config.data_dir.clone(),
            storage_key: config.storage_key.clone(),
        }
    }

    /// Open the ticket store over the configured data directory.
    pub fn open_store(&self) -> TicketStore {
        let slot = FileSlot::new(self.data_dir.clone());
        let repository = TicketRepository::with_key(slot, self.storage_key.clone());
        TicketStore::open(repository, SystemClock)
    }

    /// Tell the user on stderr when the last save did not reach disk.
    ///
    /// Called once at the end of every command that opened the store.
    pub fn warn_if_degraded(&self, store: &TicketStore) {
        if store.persistence_degraded() {
            eprintln!(
                "warning: could not save tickets to {}; changes from this command were not kept",
                self.data_dir.display()
            );
        }
    }
}

/// Ask before a destructive change. Non-interactive sessions proceed.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
