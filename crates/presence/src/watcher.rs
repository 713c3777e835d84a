// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness watch loops
//!
//! Each watch handle is backed by one task running one of two state machines:
//!
//! - **await death** (target currently alive): races a local timer of one
//!   liveness timeout against store events. Timer expiry or deletion means
//!   dead; a change re-resolves and re-arms both timer and watch.
//! - **await alive** (target currently dead): waits on store events only. Any
//!   event re-resolves; a live result ends the loop, anything else re-arms.
//!
//! Either loop reports exactly one outcome and stops.

use crate::state::{LivenessState, StateResolver};
use crate::PresenceError;
use presence_store::{CoordinationStore, NodeEvent, Watch};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Result of a liveness watch
#[derive(Debug)]
pub enum WatchOutcome {
    /// The target's liveness flipped to this value
    Transition(bool),
    /// The watch could not continue; liveness is unknown
    Failed(PresenceError),
}

impl WatchOutcome {
    /// New liveness, if a transition was observed
    pub fn transition(&self) -> Option<bool> {
        match self {
            WatchOutcome::Transition(alive) => Some(*alive),
            WatchOutcome::Failed(_) => None,
        }
    }
}

/// Single-use notification of the next liveness transition of one node
///
/// Resolves to one [`WatchOutcome`]. Re-issue the watch to keep observing.
/// Dropping the handle cancels its background task.
#[derive(Debug)]
pub struct WatchHandle {
    path: String,
    rx: oneshot::Receiver<WatchOutcome>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl WatchHandle {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stop watching without waiting for an outcome
    pub fn cancel(self) {
        self.token.cancel();
    }
}

impl Future for WatchHandle {
    type Output = WatchOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(WatchOutcome::Failed(PresenceError::WatchClosed)))
    }
}

/// Start the loop matching `state` and return its handle
pub(crate) fn spawn<S: CoordinationStore>(
    resolver: StateResolver<S>,
    state: LivenessState,
    watch: Watch,
) -> WatchHandle {
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let (tx, rx) = oneshot::channel();
    let path = state.path.clone();

    tokio::spawn(async move {
        let path = state.path.clone();
        let run = async move {
            if state.alive {
                await_death(&resolver, state, watch).await
            } else {
                await_alive(&resolver, state, watch).await
            }
        };

        tokio::select! {
            biased;
            _ = cancelled.cancelled() => {
                tracing::debug!(path = %path, "watch cancelled");
            }
            outcome = run => {
                match &outcome {
                    WatchOutcome::Transition(alive) => {
                        tracing::debug!(path = %path, alive, "liveness changed")
                    }
                    WatchOutcome::Failed(e) => {
                        tracing::warn!(path = %path, error = %e, "watch failed")
                    }
                }
                // Receiver gone means nobody is listening any more
                let _ = tx.send(outcome);
            }
        }
    });

    WatchHandle {
        path,
        rx,
        _guard: token.clone().drop_guard(),
        token,
    }
}

/// Wait for a live target to die
async fn await_death<S: CoordinationStore>(
    resolver: &StateResolver<S>,
    mut state: LivenessState,
    mut watch: Watch,
) -> WatchOutcome {
    loop {
        let event = tokio::select! {
            _ = tokio::time::sleep(state.timeout) => {
                tracing::debug!(path = %state.path, "liveness timeout expired");
                return WatchOutcome::Transition(false);
            }
            event = watch.recv() => event,
        };

        match event {
            Err(e) => return WatchOutcome::Failed(e.into()),
            Ok(NodeEvent::Deleted) => return WatchOutcome::Transition(false),
            Ok(event @ (NodeEvent::Created | NodeEvent::Changed)) => {
                tracing::trace!(path = %state.path, %event, "re-resolving");
                match resolver.resolve_with_watch(&state.path).await {
                    Ok((next, _)) if !next.alive => return WatchOutcome::Transition(false),
                    Ok((next, next_watch)) => {
                        state = next;
                        watch = next_watch;
                    }
                    Err(e) => return WatchOutcome::Failed(e),
                }
            }
        }
    }
}

/// Wait for a dead (or absent) target to come alive
async fn await_alive<S: CoordinationStore>(
    resolver: &StateResolver<S>,
    mut state: LivenessState,
    mut watch: Watch,
) -> WatchOutcome {
    loop {
        let event = match watch.recv().await {
            Ok(event) => event,
            Err(e) => return WatchOutcome::Failed(e.into()),
        };

        // Deletion keeps the target dead; re-resolving re-arms on the absent node
        tracing::trace!(path = %state.path, %event, "re-resolving");
        match resolver.resolve_with_watch(&state.path).await {
            Ok((next, _)) if next.alive => return WatchOutcome::Transition(true),
            Ok((next, next_watch)) => {
                state = next;
                watch = next_watch;
            }
            Err(e) => return WatchOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
