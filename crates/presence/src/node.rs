// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writable node that bumps its store-assigned mtime on every change

use crate::PresenceError;
use chrono::{DateTime, Utc};
use presence_store::{Acl, CoordinationStore, StoreError, Version};

/// A node with fixed content, rewritten to trigger watches and read the
/// store's clock
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChangeNode {
    path: String,
    content: String,
}

impl ChangeNode {
    pub(crate) fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    /// Write the content (creating the node if needed) and return the new mtime.
    ///
    /// A missing node is created and the write retried; losing the create to
    /// a concurrent writer counts as success. Gives up after `attempts` rounds.
    pub(crate) async fn change<S: CoordinationStore>(
        &self,
        store: &S,
        attempts: u32,
    ) -> Result<DateTime<Utc>, PresenceError> {
        let attempts = attempts.max(1);
        for attempt in 1..=attempts {
            match store.set(&self.path, &self.content, Version::Any).await {
                Ok(stat) => return Ok(stat.mtime),
                Err(StoreError::NoNode(ref missing)) if missing == &self.path => {}
                Err(e) => return Err(e.into()),
            }

            match store
                .create(&self.path, &self.content, &[Acl::world_all()])
                .await
            {
                Ok(()) => tracing::debug!(path = %self.path, attempt, "created node"),
                Err(StoreError::NodeExists(_)) => {
                    tracing::debug!(path = %self.path, attempt, "node created concurrently")
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PresenceError::Contention {
            path: self.path.clone(),
            attempts,
        })
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
