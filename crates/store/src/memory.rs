// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process coordination store
//!
//! Linearizable by construction: every operation runs under one mutex. Useful
//! for agents that share a process, and as the backing state for `FakeStore`.

use crate::clock::{Clock, SystemClock};
use crate::traits::{
    Acl, CoordinationStore, NodeEvent, Stat, StoreError, Version, Watch, WatchSender,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Node {
    content: String,
    stat: Stat,
    acl: Vec<Acl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchKind {
    /// Left by `get_watch`: fires on change or deletion
    Data,
    /// Left by `exists_watch`: fires on any event
    Exists,
}

impl WatchKind {
    fn fires_on(self, event: NodeEvent) -> bool {
        match self {
            WatchKind::Data => matches!(event, NodeEvent::Changed | NodeEvent::Deleted),
            WatchKind::Exists => true,
        }
    }
}

#[derive(Debug)]
struct PendingWatch {
    kind: WatchKind,
    tx: WatchSender,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<String, Node>,
    watches: HashMap<String, Vec<PendingWatch>>,
    last_mtime: Option<DateTime<Utc>>,
    closed: bool,
}

impl Inner {
    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    /// Next modification time: never earlier than the wall clock, and strictly
    /// after every mtime this store has handed out before.
    fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mtime = match self.last_mtime {
            Some(last) if now <= last => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.last_mtime = Some(mtime);
        mtime
    }

    /// Drop watches whose receiver is gone, along with emptied entries
    fn reap(&mut self) {
        self.watches.retain(|_, pending| {
            pending.retain(|watch| !watch.tx.is_closed());
            !pending.is_empty()
        });
    }

    fn watch(&mut self, path: &str, kind: WatchKind) -> Watch {
        self.reap();
        let (tx, watch) = Watch::channel(path);
        self.watches
            .entry(path.to_string())
            .or_default()
            .push(PendingWatch { kind, tx });
        watch
    }

    fn fire(&mut self, path: &str, event: NodeEvent) {
        let Some(pending) = self.watches.remove(path) else {
            return;
        };
        let mut remaining = Vec::new();
        for watch in pending {
            if watch.kind.fires_on(event) {
                // Receiver may have been dropped; nothing to notify then
                let _ = watch.tx.send(Ok(event));
            } else {
                remaining.push(watch);
            }
        }
        if !remaining.is_empty() {
            self.watches.insert(path.to_string(), remaining);
        }
    }

    fn has_children(&self, path: &str) -> bool {
        let prefix = format!("{}/", path);
        self.nodes.keys().any(|p| p.starts_with(&prefix))
    }
}

/// Validate an absolute node path and return its parent ("/" for top level)
fn parent_of(path: &str) -> Result<&str, StoreError> {
    let invalid = || StoreError::InvalidPath(path.to_string());
    if !path.starts_with('/') || path.len() < 2 || path.ends_with('/') || path.contains("//") {
        return Err(invalid());
    }
    match path.rfind('/') {
        Some(0) => Ok("/"),
        Some(idx) => Ok(&path[..idx]),
        None => Err(invalid()),
    }
}

fn check_version(path: &str, version: Version, actual: i32) -> Result<(), StoreError> {
    match version {
        Version::Exact(expected) if !version.matches(actual) => Err(StoreError::BadVersion {
            path: path.to_string(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

/// In-memory coordination store
#[derive(Clone)]
pub struct MemoryStore<C: Clock = SystemClock> {
    inner: Arc<Mutex<Inner>>,
    clock: C,
}

impl MemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    /// Create a store that stamps mtimes from the given clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Close the store: pending watches fail and later operations are refused
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        // Dropping the senders resolves every watch to `Closed`
        inner.watches.clear();
    }

    /// ACL a node was created with
    pub fn acl(&self, path: &str) -> Option<Vec<Acl>> {
        self.lock().nodes.get(path).map(|node| node.acl.clone())
    }

    /// Number of watches on `path` that someone is still waiting on
    pub fn pending_watches(&self, path: &str) -> usize {
        let mut inner = self.lock();
        inner.reap();
        inner.watches.get(path).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<C: Clock> CoordinationStore for MemoryStore<C> {
    async fn get(&self, path: &str) -> Result<(String, Stat), StoreError> {
        parent_of(path)?;
        let inner = self.lock();
        inner.check_open()?;
        match inner.nodes.get(path) {
            Some(node) => Ok((node.content.clone(), node.stat)),
            None => Err(StoreError::NoNode(path.to_string())),
        }
    }

    async fn get_watch(&self, path: &str) -> Result<(String, Stat, Watch), StoreError> {
        parent_of(path)?;
        let mut inner = self.lock();
        inner.check_open()?;
        let (content, stat) = match inner.nodes.get(path) {
            Some(node) => (node.content.clone(), node.stat),
            None => return Err(StoreError::NoNode(path.to_string())),
        };
        let watch = inner.watch(path, WatchKind::Data);
        Ok((content, stat, watch))
    }

    async fn set(
        &self,
        path: &str,
        content: &str,
        version: Version,
    ) -> Result<Stat, StoreError> {
        parent_of(path)?;
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.check_open()?;
        let current = match inner.nodes.get(path) {
            Some(node) => node.stat,
            None => return Err(StoreError::NoNode(path.to_string())),
        };
        check_version(path, version, current.version)?;
        let stat = Stat {
            mtime: inner.stamp(now),
            version: current.version.wrapping_add(1),
        };
        if let Some(node) = inner.nodes.get_mut(path) {
            node.content = content.to_string();
            node.stat = stat;
        }
        inner.fire(path, NodeEvent::Changed);
        Ok(stat)
    }

    async fn create(&self, path: &str, content: &str, acl: &[Acl]) -> Result<(), StoreError> {
        let parent = parent_of(path)?;
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.check_open()?;
        if inner.nodes.contains_key(path) {
            return Err(StoreError::NodeExists(path.to_string()));
        }
        if parent != "/" && !inner.nodes.contains_key(parent) {
            return Err(StoreError::NoNode(parent.to_string()));
        }
        let stat = Stat {
            mtime: inner.stamp(now),
            version: 0,
        };
        inner.nodes.insert(
            path.to_string(),
            Node {
                content: content.to_string(),
                stat,
                acl: acl.to_vec(),
            },
        );
        inner.fire(path, NodeEvent::Created);
        Ok(())
    }

    async fn exists_watch(&self, path: &str) -> Result<(Option<Stat>, Watch), StoreError> {
        parent_of(path)?;
        let mut inner = self.lock();
        inner.check_open()?;
        let stat = inner.nodes.get(path).map(|node| node.stat);
        let watch = inner.watch(path, WatchKind::Exists);
        Ok((stat, watch))
    }

    async fn delete(&self, path: &str, version: Version) -> Result<(), StoreError> {
        parent_of(path)?;
        let mut inner = self.lock();
        inner.check_open()?;
        let current = match inner.nodes.get(path) {
            Some(node) => node.stat,
            None => return Err(StoreError::NoNode(path.to_string())),
        };
        check_version(path, version, current.version)?;
        if inner.has_children(path) {
            return Err(StoreError::NotEmpty(path.to_string()));
        }
        inner.nodes.remove(path);
        inner.fire(path, NodeEvent::Deleted);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
