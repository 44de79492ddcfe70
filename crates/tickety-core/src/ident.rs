//! Ticket identifiers and the wall clock used to stamp tickets.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" for ticket timestamps.
///
/// The store never reads the system time directly so tests can drive time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests and simulations.
///
/// Returns the current instant and then advances by `step`, so successive
/// calls are strictly increasing unless the step is zero.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    current: Cell<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current: Cell::new(start),
            step,
        }
    }

    /// A clock frozen at `at`.
    #[must_use]
    pub const fn frozen(at: DateTime<Utc>) -> Self {
        Self::new(at, Duration::zero())
    }

    /// Move the clock to an explicit instant.
    pub fn set(&self, at: DateTime<Utc>) {
        self.current.set(at);
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.current.get();
        self.current.set(now + self.step);
        now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Generate an opaque ticket id: 48 random bits followed by the millisecond
/// timestamp, both lowercase hex.
#[must_use]
pub fn new_ticket_id(now: DateTime<Utc>) -> String {
    let random = rand::random::<u64>() & 0xffff_ffff_ffff;
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    format!("{random:012x}{millis:x}")
}

/// Generate an id that is not already taken according to `is_taken`.
pub fn unique_ticket_id(now: DateTime<Utc>, is_taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = new_ticket_id(now);
        if !is_taken(&id) {
            return id;
        }
        tracing::debug!(id = %id, "generated ticket id collided; regenerating");
    }
}
