// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-derived clock
//!
//! The local wall clock is never compared against a store-assigned mtime.
//! Instead "now" is the mtime the store gives a dedicated clock node when we
//! write it, which puts both sides of the comparison on the same clock.

use crate::node::ChangeNode;
use crate::{PresenceConfig, PresenceError};
use chrono::{DateTime, Utc};
use presence_store::CoordinationStore;

/// Source of authoritative "now" values, backed by the clock node
#[derive(Clone)]
pub struct ClockSource<S> {
    store: S,
    node: ChangeNode,
    write_attempts: u32,
}

impl<S: CoordinationStore> ClockSource<S> {
    pub fn new(store: S, config: &PresenceConfig) -> Self {
        Self {
            store,
            node: ChangeNode::new(config.clock_path.clone(), ""),
            write_attempts: config.write_attempts,
        }
    }

    pub fn path(&self) -> &str {
        self.node.path()
    }

    /// Write the clock node and return the mtime the store assigned to it
    pub async fn now(&self) -> Result<DateTime<Utc>, PresenceError> {
        self.node.change(&self.store, self.write_attempts).await
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
