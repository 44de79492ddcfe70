//! Derived views over store snapshots: per-status counts, status filtering,
//! and the list-page model that recomputes both on every publish.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::model::ticket::normalize;
use crate::model::{ParseEnumError, Status, Ticket};
use crate::store::{Snapshot, Subscription, TicketStore};

/// Ticket totals per status. `open + in_progress + done == all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub open: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    /// Count for a single filter.
    #[must_use]
    pub const fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Only(Status::Open) => self.open,
            StatusFilter::Only(Status::InProgress) => self.in_progress,
            StatusFilter::Only(Status::Done) => self.done,
        }
    }
}

/// Count tickets per status.
#[must_use]
pub fn counts(tickets: &[Ticket]) -> StatusCounts {
    tickets.iter().fold(
        StatusCounts {
            all: tickets.len(),
            ..StatusCounts::default()
        },
        |mut acc, ticket| {
            match ticket.status {
                Status::Open => acc.open += 1,
                Status::InProgress => acc.in_progress += 1,
                Status::Done => acc.done += 1,
            }
            acc
        },
    )
}

/// Which tickets the list view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// Every filter, in the order the list page shows its badges.
    pub const ALL: [Self; 4] = [
        Self::All,
        Self::Only(Status::Open),
        Self::Only(Status::InProgress),
        Self::Only(Status::Done),
    ];

    #[must_use]
    pub fn matches(self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => ticket.status == status,
        }
    }

    /// Human label for the filter badge.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }
}

impl From<Status> for StatusFilter {
    fn from(status: Status) -> Self {
        Self::Only(status)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if normalize(s) == "all" {
            return Ok(Self::All);
        }
        s.parse::<Status>().map(Self::Only).map_err(|_| ParseEnumError {
            expected: "status filter",
            got: s.to_string(),
        })
    }
}

/// Tickets matching `filter`, in their original relative order.
#[must_use]
pub fn filter_by_status(tickets: &[Ticket], filter: StatusFilter) -> Vec<&Ticket> {
    tickets.iter().filter(|t| filter.matches(t)).collect()
}

/// Model behind the tickets list page.
///
/// Holds the last published snapshot together with the active filter, and
/// recomputes counts and visible tickets whenever either changes.
#[derive(Debug, Clone)]
pub struct ListView {
    filter: StatusFilter,
    snapshot: Snapshot,
    counts: StatusCounts,
    visible: Vec<Ticket>,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(StatusFilter::All)
    }
}

impl ListView {
    #[must_use]
    pub fn new(filter: StatusFilter) -> Self {
        Self {
            filter,
            snapshot: Arc::from(Vec::new()),
            counts: StatusCounts::default(),
            visible: Vec::new(),
        }
    }

    /// Subscribe a new list view to `store`. The view is populated immediately.
    pub fn attach(
        store: &mut TicketStore,
        filter: StatusFilter,
    ) -> (Rc<RefCell<Self>>, Subscription) {
        let view = Rc::new(RefCell::new(Self::new(filter)));
        let observer = Rc::clone(&view);
        let subscription = store.subscribe(move |snapshot| observer.borrow_mut().apply(snapshot));
        (view, subscription)
    }

    /// Recompute from a newly published snapshot.
    pub fn apply(&mut self, snapshot: &Snapshot) {
        self.snapshot = Arc::clone(snapshot);
        self.recompute();
    }

    /// Change the active filter, recomputing from the last snapshot.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.recompute();
    }

    #[must_use]
    pub const fn filter(&self) -> StatusFilter {
        self.filter
    }

    #[must_use]
    pub const fn counts(&self) -> StatusCounts {
        self.counts
    }

    #[must_use]
    pub fn visible(&self) -> &[Ticket] {
        &self.visible
    }

    fn recompute(&mut self) {
        self.counts = counts(&self.snapshot);
        self.visible = filter_by_status(&self.snapshot, self.filter)
            .into_iter()
            .cloned()
            .collect();
    }
}
