// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public query API
//!
//! [`Presence`] is the entry point for both sides of the protocol: it starts
//! pingers for the local agent and answers liveness questions about others.

use crate::pinger::Pinger;
use crate::state::{LivenessState, StateResolver};
use crate::watcher::{self, WatchHandle};
use crate::{ConfigError, PingerConfig, PresenceConfig, PresenceError};
use presence_store::{CoordinationStore, StoreError};
use std::time::Duration;

/// Liveness client bound to one coordination store
#[derive(Clone)]
pub struct Presence<S: CoordinationStore> {
    store: S,
    config: PresenceConfig,
    resolver: StateResolver<S>,
}

impl<S: CoordinationStore> Presence<S> {
    pub fn new(store: S) -> Self {
        Self::build(store, PresenceConfig::default())
    }

    /// Client with custom settings; rejects a config that fails validation
    pub fn with_config(store: S, config: PresenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(store, config))
    }

    fn build(store: S, config: PresenceConfig) -> Self {
        Self {
            resolver: StateResolver::new(store.clone(), &config),
            store,
            config,
        }
    }

    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Full liveness state of `path`; a missing node is reported as absent
    pub async fn state(&self, path: &str) -> Result<LivenessState, PresenceError> {
        match self.store.get(path).await {
            Ok((content, stat)) => self.resolver.resolve(path, stat.mtime, &content).await,
            Err(StoreError::NoNode(_)) => Ok(LivenessState::absent(path)),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the pinger behind `path` is alive right now.
    ///
    /// A node that was never created is simply not alive. A node whose content
    /// is not a heartbeat period is an error.
    pub async fn alive(&self, path: &str) -> Result<bool, PresenceError> {
        Ok(self.state(path).await?.alive)
    }

    /// Current liveness of `path` plus a handle that resolves on its next flip
    pub async fn alive_watch(&self, path: &str) -> Result<(bool, WatchHandle), PresenceError> {
        let (state, watch) = self.resolver.resolve_with_watch(path).await?;
        let alive = state.alive;
        tracing::debug!(path, alive, "watching liveness");
        Ok((alive, watcher::spawn(self.resolver.clone(), state, watch)))
    }

    /// Start heartbeating on `path`
    pub async fn start_pinger(
        &self,
        path: impl Into<String>,
        period: Duration,
    ) -> Result<Pinger<S>, PresenceError> {
        Pinger::start(self.store.clone(), &self.config, path, period).await
    }

    /// Start the heartbeat described by `pinger`
    pub async fn start_configured(&self, pinger: &PingerConfig) -> Result<Pinger<S>, PresenceError> {
        self.start_pinger(pinger.path.clone(), pinger.period).await
    }
}

#[cfg(test)]
#[path = "presence_tests.rs"]
mod tests;
