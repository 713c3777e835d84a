// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for presence operations

use presence_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while pinging or observing a presence node
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("{path} is not a valid presence node ({content:?}): {reason}")]
    MalformedNode {
        path: String,
        content: String,
        reason: String,
    },
    #[error("gave up on {path} after {attempts} attempts under contention")]
    Contention { path: String, attempts: u32 },
    #[error("heartbeat period must be positive, got {0:?}")]
    InvalidPeriod(Duration),
    #[error("refreshing {path} failed: {reason}")]
    Refresh { path: String, reason: String },
    #[error("watch ended without reporting a transition")]
    WatchClosed,
}
