// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active heartbeat
//!
//! A pinger owns one node and rewrites it every period so its mtime stays
//! fresh. Stopping is a rendezvous: the caller waits for the refresh task to
//! exit before issuing the final write (`stop`) or the delete (`kill`).

use crate::node::ChangeNode;
use crate::state::encode_period;
use crate::{PresenceConfig, PresenceError};
use presence_store::{CoordinationStore, StoreError, Version};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Health of a pinger's refresh task
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PingerStatus {
    /// Refreshing on schedule
    Running,
    /// A refresh write failed; the node is no longer being refreshed
    Failed(String),
    /// The refresh task exited on request
    Stopped,
}

/// A running heartbeat on one node
pub struct Pinger<S: CoordinationStore> {
    store: S,
    target: ChangeNode,
    period: Duration,
    write_attempts: u32,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), PresenceError>>>,
    status: watch::Receiver<PingerStatus>,
}

impl<S: CoordinationStore> Pinger<S> {
    /// Write the node (creating it if needed) and start refreshing it every `period`
    pub async fn start(
        store: S,
        config: &PresenceConfig,
        path: impl Into<String>,
        period: Duration,
    ) -> Result<Self, PresenceError> {
        if period.is_zero() {
            return Err(PresenceError::InvalidPeriod(period));
        }

        let target = ChangeNode::new(path, encode_period(period));
        target.change(&store, config.write_attempts).await?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let (status_tx, status) = watch::channel(PingerStatus::Running);
        let task = tokio::spawn(refresh(
            store.clone(),
            target.clone(),
            period,
            config.write_attempts,
            stop_rx,
            status_tx,
        ));

        tracing::info!(
            path = %target.path(),
            period = %encode_period(period),
            "pinger started"
        );

        Ok(Self {
            store,
            target,
            period,
            write_attempts: config.write_attempts,
            stop_tx: Some(stop_tx),
            task: Some(task),
            status,
        })
    }

    pub fn path(&self) -> &str {
        self.target.path()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Current health of the refresh task
    pub fn status(&self) -> PingerStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to health changes of the refresh task
    pub fn subscribe(&self) -> watch::Receiver<PingerStatus> {
        self.status.clone()
    }

    /// Wait until the refresh task stops refreshing; returns the failure, if any
    pub async fn failed(&self) -> Option<String> {
        let mut status = self.status.clone();
        let result = status
            .wait_for(|s| !matches!(s, PingerStatus::Running))
            .await;
        match result.as_deref() {
            Ok(PingerStatus::Failed(reason)) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Stop refreshing and write the node one last time.
    ///
    /// Watchers keep seeing the target alive for a full timeout after this
    /// returns.
    pub async fn stop(mut self) -> Result<(), PresenceError> {
        self.halt().await?;
        self.target.change(&self.store, self.write_attempts).await?;
        tracing::info!(path = %self.target.path(), "pinger stopped");
        Ok(())
    }

    /// Stop refreshing and delete the node so watchers see it die at once.
    ///
    /// The node is deleted even if the refresh task had failed; that failure
    /// is reported afterwards.
    pub async fn kill(mut self) -> Result<(), PresenceError> {
        let halted = self.halt().await;
        match self.store.delete(self.target.path(), Version::Any).await {
            Ok(()) | Err(StoreError::NoNode(_)) => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(path = %self.target.path(), "pinger killed");
        halted
    }

    /// Signal the refresh task and wait for it to exit
    async fn halt(&mut self) -> Result<(), PresenceError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Already exited if the receiver is gone
            let _ = stop_tx.send(());
        }
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        let reason = match task.await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(e) => e.to_string(),
        };
        Err(PresenceError::Refresh {
            path: self.target.path().to_string(),
            reason,
        })
    }
}

/// Rewrite `target` every `period` until told to stop or a write fails.
///
/// Ticks are scheduled from the start of the task, so write latency does not
/// push later refreshes back.
async fn refresh<S: CoordinationStore>(
    store: S,
    target: ChangeNode,
    period: Duration,
    write_attempts: u32,
    mut stop_rx: oneshot::Receiver<()>,
    status_tx: watch::Sender<PingerStatus>,
) -> Result<(), PresenceError> {
    let mut ticks = tokio::time::interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick is immediate; `start` already wrote the node
    ticks.tick().await;

    loop {
        tokio::select! {
            biased;
            // Fires on an explicit stop and when the pinger is dropped
            _ = &mut stop_rx => {
                status_tx.send_replace(PingerStatus::Stopped);
                return Ok(());
            }
            _ = ticks.tick() => {
                if let Err(e) = target.change(&store, write_attempts).await {
                    tracing::warn!(path = %target.path(), error = %e, "heartbeat refresh failed");
                    status_tx.send_replace(PingerStatus::Failed(e.to_string()));
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "pinger_tests.rs"]
mod tests;
