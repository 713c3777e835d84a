// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use crate::traits::{Acl, CoordinationStore, Stat, StoreError, Version, Watch};
use async_trait::async_trait;
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any CoordinationStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

/// Log the outcome of a store call inside the current span.
///
/// `NoNode` and `NodeExists` are routine races for presence nodes, so they
/// are logged at debug rather than as errors.
fn record<T>(result: &Result<T, StoreError>, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::debug!(elapsed_ms, "ok"),
        Err(e @ (StoreError::NoNode(_) | StoreError::NodeExists(_))) => {
            tracing::debug!(elapsed_ms, error = %e, "race")
        }
        Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
    }
}

#[async_trait]
impl<S: CoordinationStore> CoordinationStore for TracedStore<S> {
    async fn get(&self, path: &str) -> Result<(String, Stat), StoreError> {
        let span = tracing::debug_span!("store.get", path);
        let started = Instant::now();
        let result = self.inner.get(path).instrument(span.clone()).await;
        span.in_scope(|| record(&result, started));
        result
    }

    async fn get_watch(&self, path: &str) -> Result<(String, Stat, Watch), StoreError> {
        let span = tracing::debug_span!("store.get_watch", path);
        let started = Instant::now();
        let result = self.inner.get_watch(path).instrument(span.clone()).await;
        span.in_scope(|| record(&result, started));
        result
    }

    async fn set(
        &self,
        path: &str,
        content: &str,
        version: Version,
    ) -> Result<Stat, StoreError> {
        let span = tracing::debug_span!("store.set", path, version = ?version);
        span.in_scope(|| tracing::trace!(content_len = content.len(), "writing"));
        let started = Instant::now();
        let result = self.inner.set(path, content, version).instrument(span.clone()).await;
        span.in_scope(|| record(&result, started));
        result
    }

    async fn create(&self, path: &str, content: &str, acl: &[Acl]) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.create", path);
        span.in_scope(|| {
            tracing::debug!(content_len = content.len(), acl_count = acl.len(), "creating")
        });
        let started = Instant::now();
        let result = self.inner.create(path, content, acl).instrument(span.clone()).await;
        span.in_scope(|| record(&result, started));
        result
    }

    async fn exists_watch(&self, path: &str) -> Result<(Option<Stat>, Watch), StoreError> {
        let span = tracing::debug_span!("store.exists_watch", path);
        let started = Instant::now();
        let result = self.inner.exists_watch(path).instrument(span.clone()).await;
        if let Ok((stat, _)) = &result {
            span.in_scope(|| tracing::trace!(exists = stat.is_some(), "checked"));
        }
        span.in_scope(|| record(&result, started));
        result
    }

    async fn delete(&self, path: &str, version: Version) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete", path, version = ?version);
        let started = Instant::now();
        let result = self.inner.delete(path, version).instrument(span.clone()).await;
        span.in_scope(|| record(&result, started));
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
