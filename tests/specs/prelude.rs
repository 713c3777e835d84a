//! Shared helpers for presence specs

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use presence_store::{Clock, MemoryStore};
use std::time::Duration;
use tokio::time::Instant;

pub use presence::{Presence, PresenceConfig, PresenceError};
pub use presence_store::{CoordinationStore, FakeStore, StoreError};

/// Store clock driven by tokio's (pausable) clock
///
/// Lets the store's mtimes advance in step with `tokio::time::sleep` in
/// `start_paused` tests.
#[derive(Clone, Debug)]
pub struct TokioClock {
    base: DateTime<Utc>,
    start: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            start: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.start.elapsed()).unwrap();
        self.base + elapsed
    }
}

pub type Store = MemoryStore<TokioClock>;

/// Store whose mtimes follow tokio's clock
pub fn store() -> Store {
    MemoryStore::with_clock(TokioClock::new())
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Assert `elapsed` lies in `[low, high)` milliseconds
#[track_caller]
pub fn assert_between(elapsed: Duration, low: u64, high: u64) {
    assert!(
        elapsed >= ms(low) && elapsed < ms(high),
        "expected {}ms..{}ms, got {:?}",
        low,
        high,
        elapsed
    );
}
