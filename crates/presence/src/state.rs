// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness evaluation for presence nodes
//!
//! A presence node holds its pinger's heartbeat period as text. The pinger is
//! alive while the node's mtime is less than two periods behind the store's
//! current time.

use crate::clock::ClockSource;
use crate::{PresenceConfig, PresenceError};
use chrono::{DateTime, Utc};
use presence_store::{CoordinationStore, StoreError, Watch};
use std::time::Duration;

/// Encode a heartbeat period as node content (e.g. `"5s"`, `"250ms"`)
pub fn encode_period(period: Duration) -> String {
    humantime::format_duration(period).to_string()
}

/// Decode node content as a heartbeat period
pub fn decode_period(path: &str, content: &str) -> Result<Duration, PresenceError> {
    humantime::parse_duration(content.trim()).map_err(|e| PresenceError::MalformedNode {
        path: path.to_string(),
        content: content.to_string(),
        reason: e.to_string(),
    })
}

/// Latest known liveness of a remote pinger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LivenessState {
    pub path: String,
    pub alive: bool,
    /// Two heartbeat periods; zero when the node does not exist
    pub timeout: Duration,
}

impl LivenessState {
    /// Judge a node from its content and mtime against a store-derived `now`
    pub fn evaluate(
        path: &str,
        now: DateTime<Utc>,
        mtime: DateTime<Utc>,
        content: &str,
    ) -> Result<Self, PresenceError> {
        let period = decode_period(path, content)?;
        let timeout = period.saturating_mul(2);
        // An mtime ahead of `now` means no time has passed
        let delay = (now - mtime).to_std().unwrap_or(Duration::ZERO);
        Ok(Self {
            path: path.to_string(),
            alive: delay < timeout,
            timeout,
        })
    }

    /// State of a node that does not exist
    pub fn absent(path: &str) -> Self {
        Self {
            path: path.to_string(),
            alive: false,
            timeout: Duration::ZERO,
        }
    }
}

/// Computes liveness for presence nodes, optionally leaving a watch behind
#[derive(Clone)]
pub struct StateResolver<S> {
    store: S,
    clock: ClockSource<S>,
    resolve_attempts: u32,
}

impl<S: CoordinationStore> StateResolver<S> {
    pub fn new(store: S, config: &PresenceConfig) -> Self {
        Self {
            clock: ClockSource::new(store.clone(), config),
            store,
            resolve_attempts: config.resolve_attempts,
        }
    }

    /// Liveness of `path` given content and mtime already read from the store
    pub async fn resolve(
        &self,
        path: &str,
        mtime: DateTime<Utc>,
        content: &str,
    ) -> Result<LivenessState, PresenceError> {
        let now = self.clock.now().await?;
        let state = LivenessState::evaluate(path, now, mtime, content)?;
        tracing::debug!(
            path,
            alive = state.alive,
            timeout_ms = state.timeout.as_millis() as u64,
            "resolved"
        );
        Ok(state)
    }

    /// Resolve `path` and leave a watch that fires on its next change.
    ///
    /// If the node is missing the watch is an existence watch and the state is
    /// absent. A node that disappears and reappears between the two watch calls
    /// restarts resolution, up to the configured number of attempts.
    pub async fn resolve_with_watch(
        &self,
        path: &str,
    ) -> Result<(LivenessState, Watch), PresenceError> {
        let attempts = self.resolve_attempts.max(1);
        for attempt in 1..=attempts {
            match self.store.get_watch(path).await {
                Ok((content, stat, watch)) => {
                    let state = self.resolve(path, stat.mtime, &content).await?;
                    return Ok((state, watch));
                }
                Err(StoreError::NoNode(_)) => {}
                Err(e) => return Err(e.into()),
            }

            let (stat, watch) = self.store.exists_watch(path).await?;
            if stat.is_none() {
                tracing::debug!(path, "resolved absent node");
                return Ok((LivenessState::absent(path), watch));
            }
            tracing::debug!(path, attempt, "node reappeared during watch setup");
        }

        Err(PresenceError::Contention {
            path: path.to_string(),
            attempts,
        })
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
