//! The ticket store: single owner of the ticket collection.
//!
//! Every mutation builds a new immutable [`Snapshot`], persists it through the
//! [`TicketRepository`], then hands it to every registered observer in
//! registration order, synchronously, before the mutating call returns.
//! Operations that change nothing (unknown id) skip both steps.
//!
//! Mutations take `&mut self`, so an observer cannot call back into the store
//! while it is being notified.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::ident::{Clock, unique_ticket_id};
use crate::model::{NewTicket, Ticket, TicketPatch};
use crate::seed::seed_tickets;
use crate::storage::TicketRepository;

/// The full collection at one point in time, newest ticket first.
pub type Snapshot = Arc<[Ticket]>;

type Observer = Box<dyn FnMut(&Snapshot)>;

/// Handle returned by [`TicketStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

pub struct TicketStore {
    tickets: Snapshot,
    repository: TicketRepository,
    clock: Box<dyn Clock>,
    observers: Vec<(Subscription, Observer)>,
    next_subscription: u64,
    persistence_degraded: bool,
}

impl std::fmt::Debug for TicketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketStore")
            .field("tickets", &self.tickets.len())
            .field("repository", &self.repository)
            .field("observers", &self.observers.len())
            .field("persistence_degraded", &self.persistence_degraded)
            .finish_non_exhaustive()
    }
}

impl TicketStore {
    /// Open the store over `repository`.
    ///
    /// Loads the persisted collection. When there is no usable prior state the
    /// seed set is generated and persisted right away, so seeded ids survive
    /// into the next session.
    pub fn open(repository: TicketRepository, clock: impl Clock + 'static) -> Self {
        let loaded = repository.load();
        let seeded = loaded.is_none();
        let tickets = loaded.unwrap_or_else(|| seed_tickets(clock.now()));

        let mut store = Self {
            tickets: tickets.into(),
            repository,
            clock: Box::new(clock),
            observers: Vec::new(),
            next_subscription: 0,
            persistence_degraded: false,
        };

        if seeded {
            tracing::info!(
                key = store.repository.key(),
                count = store.tickets.len(),
                "no prior ticket state; starting from seed set"
            );
            store.persist();
        }
        store
    }

    /// Current collection. Cheap: shares the immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.tickets)
    }

    /// Borrow the current collection without cloning the handle.
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Look a ticket up by exact id.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<Ticket> {
        self.tickets.iter().find(|t| t.id == id).cloned()
    }

    /// True when the most recent persistence attempt failed.
    ///
    /// The in-memory collection is still authoritative; a later reload may
    /// lose changes made while this is set.
    #[must_use]
    pub const fn persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    /// Register an observer.
    ///
    /// The observer is called immediately with the current snapshot and then
    /// once after every mutation that changes the collection.
    pub fn subscribe(&mut self, observer: impl FnMut(&Snapshot) + 'static) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;

        let mut observer: Observer = Box::new(observer);
        observer(&self.tickets);
        self.observers.push((subscription, observer));

        tracing::debug!(
            subscription = subscription.0,
            observers = self.observers.len(),
            "observer subscribed"
        );
        subscription
    }

    /// Stop notifying the observer behind `subscription`.
    ///
    /// Returns `false` when it was already unsubscribed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(s, _)| *s != subscription);
        self.observers.len() != before
    }

    /// Create a ticket from trimmed `input` and put it first in the collection.
    pub fn create(&mut self, input: NewTicket) -> Ticket {
        let NewTicket {
            title,
            description,
            status,
            priority,
        } = input;
        let now = self.clock.now();
        let id = unique_ticket_id(now, |candidate| {
            self.tickets.iter().any(|t| t.id == candidate)
        });

        let ticket = Ticket {
            id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            status,
            priority,
            created_at: now,
            updated_at: now,
        };

        let mut next = Vec::with_capacity(self.tickets.len() + 1);
        next.push(ticket.clone());
        next.extend(self.tickets.iter().cloned());

        tracing::debug!(ticket_id = %ticket.id, "ticket created");
        self.commit(next);
        ticket
    }

    /// Merge `patch` over the ticket with `id`, keeping its position.
    ///
    /// Returns `None`, and changes nothing, when no such ticket exists.
    pub fn update(&mut self, id: &str, patch: TicketPatch) -> Option<Ticket> {
        let index = self.tickets.iter().position(|t| t.id == id)?;
        let current = &self.tickets[index];
        let updated = patch.apply_to(current, self.stamp_after(current.updated_at));

        let mut next = self.tickets.to_vec();
        next[index] = updated.clone();

        tracing::debug!(ticket_id = %id, "ticket updated");
        self.commit(next);
        Some(updated)
    }

    /// Remove the ticket with `id`. Returns whether a ticket was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.tickets.iter().any(|t| t.id == id) {
            return false;
        }

        let next: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();

        tracing::debug!(ticket_id = %id, "ticket removed");
        self.commit(next);
        true
    }

    /// Replace the whole collection with a freshly generated seed set.
    pub fn reset_seed(&mut self) {
        let seed = seed_tickets(self.clock.now());
        tracing::info!(count = seed.len(), "ticket collection reset to seed set");
        self.commit(seed);
    }

    /// Drop every ticket.
    pub fn clear_all(&mut self) {
        tracing::info!(removed = self.tickets.len(), "ticket collection cleared");
        self.commit(Vec::new());
    }

    /// Now, but never earlier than `previous`, so `updated_at` cannot go
    /// backwards when the wall clock does.
    fn stamp_after(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        self.clock.now().max(previous)
    }

    fn commit(&mut self, next: Vec<Ticket>) {
        self.tickets = next.into();
        self.persist();
        self.notify();
    }

    fn persist(&mut self) {
        match self.repository.try_save(&self.tickets) {
            Ok(()) => {
                if self.persistence_degraded {
                    tracing::info!("ticket persistence recovered");
                }
                self.persistence_degraded = false;
            }
            Err(err) => {
                tracing::warn!(
                    key = self.repository.key(),
                    code = %err.code(),
                    error = %err,
                    "failed to persist tickets; continuing in memory"
                );
                self.persistence_degraded = true;
            }
        }
    }

    fn notify(&mut self) {
        let snapshot = Arc::clone(&self.tickets);
        for (_, observer) in &mut self.observers {
            observer(&snapshot);
        }
    }
}
