//! The example ticket set used on first run and by `reset_seed`.

use chrono::{DateTime, Utc};

use crate::ident::unique_ticket_id;
use crate::model::{Priority, Status, Ticket};

/// Number of tickets in the seed set.
pub const SEED_COUNT: usize = 3;

const SEED: [(&str, &str, Status, Priority); SEED_COUNT] = [
    (
        "Wire up the ticket store",
        "Observer list, CRUD operations and local persistence",
        Status::InProgress,
        Priority::High,
    ),
    (
        "Build the tickets list view",
        "Status filters, count badges and a delete action",
        Status::Open,
        Priority::Medium,
    ),
    (
        "Create ticket form",
        "Title, description, status and priority with validation",
        Status::Open,
        Priority::High,
    ),
];

/// Generate the seed tickets, all stamped with `now` and given fresh ids.
#[must_use]
pub fn seed_tickets(now: DateTime<Utc>) -> Vec<Ticket> {
    let mut tickets: Vec<Ticket> = Vec::with_capacity(SEED_COUNT);
    for (title, description, status, priority) in SEED {
        let id = unique_ticket_id(now, |candidate| tickets.iter().any(|t| t.id == candidate));
        tickets.push(Ticket {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status,
            priority,
            created_at: now,
            updated_at: now,
        });
    }
    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_has_three_distinct_tickets() {
        let now = Utc::now();
        let tickets = seed_tickets(now);
        assert_eq!(tickets.len(), SEED_COUNT);

        let ids: HashSet<_> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), SEED_COUNT);

        let titles: HashSet<_> = tickets.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles.len(), SEED_COUNT);

        let combos: HashSet<_> = tickets.iter().map(|t| (t.status, t.priority)).collect();
        assert_eq!(combos.len(), SEED_COUNT);
    }

    #[test]
    fn seed_timestamps_are_the_generation_instant() {
        let now = Utc::now();
        for ticket in seed_tickets(now) {
            assert_eq!(ticket.created_at, now);
            assert_eq!(ticket.updated_at, now);
        }
    }

    #[test]
    fn each_call_generates_new_ids() {
        let now = Utc::now();
        let first: HashSet<_> = seed_tickets(now).into_iter().map(|t| t.id).collect();
        let second: HashSet<_> = seed_tickets(now).into_iter().map(|t| t.id).collect();
        assert!(first.is_disjoint(&second));
    }
}
