//! tickety-core library.
//!
//! The ticket model, the reactive [`TicketStore`](store::TicketStore), the
//! persistence adapter it writes through, and the derived views the list page
//! renders from.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums in the library, `anyhow::Result` where callers only report.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod ident;
pub mod model;
pub mod seed;
pub mod storage;
pub mod store;
pub mod views;

pub use model::{NewTicket, Priority, Status, Ticket, TicketPatch};
pub use storage::{FileSlot, KeyValueSlot, MemorySlot, TicketRepository};
pub use store::{Snapshot, Subscription, TicketStore};
pub use views::{ListView, StatusCounts, StatusFilter, counts, filter_by_status};
