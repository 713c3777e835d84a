// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination store contract
//!
//! A hierarchical, versioned node store with atomic create/delete and
//! single-fire change notifications per node (a ZooKeeper-class service).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use tokio::sync::oneshot;

// =============================================================================
// Node metadata
// =============================================================================

/// Metadata the store keeps for every node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Modification time, assigned by the store on every write
    pub mtime: DateTime<Utc>,
    /// Data version, incremented on every write
    pub version: i32,
}

/// Version precondition for writes and deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    /// No check; last write wins
    #[default]
    Any,
    /// Fail with `BadVersion` unless the node is at this version
    Exact(i32),
}

impl Version {
    pub fn matches(self, actual: i32) -> bool {
        match self {
            Version::Any => true,
            Version::Exact(expected) => expected == actual,
        }
    }
}

/// Permission bits carried by an ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Perms(pub u32);

impl Perms {
    pub const READ: Perms = Perms(1);
    pub const WRITE: Perms = Perms(1 << 1);
    pub const CREATE: Perms = Perms(1 << 2);
    pub const DELETE: Perms = Perms(1 << 3);
    pub const ADMIN: Perms = Perms(1 << 4);
    pub const ALL: Perms = Perms(0x1f);

    pub fn contains(self, other: Perms) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Access control entry, passed through to the store untouched
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Acl {
    pub perms: Perms,
    pub scheme: String,
    pub id: String,
}

impl Acl {
    /// Open ACL: anyone may do anything
    pub fn world_all() -> Self {
        Self {
            perms: Perms::ALL,
            scheme: "world".to_string(),
            id: "anyone".to_string(),
        }
    }
}

// =============================================================================
// Watches
// =============================================================================

/// Kind of change a watch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    Created,
    Deleted,
    Changed,
}

impl fmt::Display for NodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeEvent::Created => write!(f, "created"),
            NodeEvent::Deleted => write!(f, "deleted"),
            NodeEvent::Changed => write!(f, "changed"),
        }
    }
}

/// Store side of a watch; consumed when it fires
pub type WatchSender = oneshot::Sender<Result<NodeEvent, StoreError>>;

/// A one-shot change notification for a single node
///
/// Fires at most once. A watch whose store went away resolves to
/// `StoreError::Closed`.
#[derive(Debug)]
pub struct Watch {
    path: String,
    rx: oneshot::Receiver<Result<NodeEvent, StoreError>>,
}

impl Watch {
    /// Create a linked sender/watch pair for `path`
    pub fn channel(path: impl Into<String>) -> (WatchSender, Watch) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Watch {
                path: path.into(),
                rx,
            },
        )
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the watch to fire
    pub async fn recv(self) -> Result<NodeEvent, StoreError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Closed),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors from store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("node does not exist: {0}")]
    NoNode(String),
    #[error("node already exists: {0}")]
    NodeExists(String),
    #[error("version mismatch on {path}: expected {expected}, found {actual}")]
    BadVersion {
        path: String,
        expected: i32,
        actual: i32,
    },
    #[error("node has children: {0}")]
    NotEmpty(String),
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
    #[error("store connection closed")]
    Closed,
    #[error("connection error: {0}")]
    Connection(String),
}

// =============================================================================
// Store trait
// =============================================================================

/// Capability contract for a coordination store
///
/// All operations may race with other clients; the store guarantees per-node
/// linearizability and delivers each watch at most once.
#[async_trait]
pub trait CoordinationStore: Clone + Send + Sync + 'static {
    /// Read a node's content and metadata
    async fn get(&self, path: &str) -> Result<(String, Stat), StoreError>;

    /// Read a node and leave a watch that fires when it changes or is deleted
    async fn get_watch(&self, path: &str) -> Result<(String, Stat, Watch), StoreError>;

    /// Overwrite a node's content, returning the new metadata
    async fn set(&self, path: &str, content: &str, version: Version)
        -> Result<Stat, StoreError>;

    /// Create a node; fails with `NodeExists` if someone got there first
    async fn create(&self, path: &str, content: &str, acl: &[Acl]) -> Result<(), StoreError>;

    /// Check for a node and leave a watch that fires on creation, change or deletion
    async fn exists_watch(&self, path: &str) -> Result<(Option<Stat>, Watch), StoreError>;

    /// Remove a node
    async fn delete(&self, path: &str, version: Version) -> Result<(), StoreError>;
}

#[cfg(test)]
#[path = "traits_tests.rs"]
mod tests;
