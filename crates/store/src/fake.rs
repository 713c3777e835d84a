// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake coordination store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::clock::FakeClock;
use crate::memory::MemoryStore;
use crate::traits::{Acl, CoordinationStore, Stat, StoreError, Version, Watch};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Store operation kind, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    GetWatch,
    Set,
    Create,
    ExistsWatch,
    Delete,
}

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get { path: String },
    GetWatch { path: String },
    Set { path: String, content: String },
    Create { path: String, content: String },
    ExistsWatch { path: String },
    Delete { path: String },
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::Get { .. } => StoreOp::Get,
            StoreCall::GetWatch { .. } => StoreOp::GetWatch,
            StoreCall::Set { .. } => StoreOp::Set,
            StoreCall::Create { .. } => StoreOp::Create,
            StoreCall::ExistsWatch { .. } => StoreOp::ExistsWatch,
            StoreCall::Delete { .. } => StoreOp::Delete,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            StoreCall::Get { path }
            | StoreCall::GetWatch { path }
            | StoreCall::Set { path, .. }
            | StoreCall::Create { path, .. }
            | StoreCall::ExistsWatch { path }
            | StoreCall::Delete { path } => path,
        }
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<StoreCall>,
    failures: HashMap<StoreOp, VecDeque<StoreError>>,
    creates: HashMap<String, usize>,
}

/// Fake coordination store for testing
///
/// Backed by a `MemoryStore` on a `FakeClock`. Records every call, can be told
/// to fail upcoming operations, and yields to the scheduler before each
/// operation so that concurrent callers interleave.
#[derive(Clone)]
pub struct FakeStore {
    store: MemoryStore<FakeClock>,
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeStore {
    pub fn new() -> Self {
        Self::with_clock(FakeClock::new())
    }

    pub fn with_clock(clock: FakeClock) -> Self {
        Self {
            store: MemoryStore::with_clock(clock),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// Clock the store stamps mtimes with
    pub fn clock(&self) -> &FakeClock {
        self.store.clock()
    }

    /// Underlying store, for setting up state without recording calls
    pub fn memory(&self) -> &MemoryStore<FakeClock> {
        &self.store
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Recorded calls against one path
    pub fn calls_for(&self, path: &str) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.path() == path)
            .cloned()
            .collect()
    }

    /// Make the next `op` fail with `error` (queued; one failure per call)
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Number of creates of `path` that actually succeeded
    pub fn successful_creates(&self, path: &str) -> usize {
        self.lock().creates.get(path).copied().unwrap_or(0)
    }

    /// Close the underlying store
    pub fn close(&self) {
        self.store.close();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Yield, record the call and pop any injected failure for it
    async fn enter(&self, call: StoreCall) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.lock();
        let op = call.op();
        state.calls.push(call);
        match state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CoordinationStore for FakeStore {
    async fn get(&self, path: &str) -> Result<(String, Stat), StoreError> {
        self.enter(StoreCall::Get {
            path: path.to_string(),
        })
        .await?;
        self.store.get(path).await
    }

    async fn get_watch(&self, path: &str) -> Result<(String, Stat, Watch), StoreError> {
        self.enter(StoreCall::GetWatch {
            path: path.to_string(),
        })
        .await?;
        self.store.get_watch(path).await
    }

    async fn set(
        &self,
        path: &str,
        content: &str,
        version: Version,
    ) -> Result<Stat, StoreError> {
        self.enter(StoreCall::Set {
            path: path.to_string(),
            content: content.to_string(),
        })
        .await?;
        self.store.set(path, content, version).await
    }

    async fn create(&self, path: &str, content: &str, acl: &[Acl]) -> Result<(), StoreError> {
        self.enter(StoreCall::Create {
            path: path.to_string(),
            content: content.to_string(),
        })
        .await?;
        self.store.create(path, content, acl).await?;
        *self.lock().creates.entry(path.to_string()).or_default() += 1;
        Ok(())
    }

    async fn exists_watch(&self, path: &str) -> Result<(Option<Stat>, Watch), StoreError> {
        self.enter(StoreCall::ExistsWatch {
            path: path.to_string(),
        })
        .await?;
        self.store.exists_watch(path).await
    }

    async fn delete(&self, path: &str, version: Version) -> Result<(), StoreError> {
        self.enter(StoreCall::Delete {
            path: path.to_string(),
        })
        .await?;
        self.store.delete(path, version).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
