// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! presence-store: the coordination store contract
//!
//! This crate provides:
//! - The `CoordinationStore` trait: versioned nodes, create/delete, one-shot watches
//! - A wall-clock abstraction used by stores to stamp modification times
//! - `MemoryStore`, a linearizable in-process store
//! - `TracedStore`, a tracing decorator for any store

pub mod clock;
pub mod memory;
pub mod traced;
pub mod traits;

pub use clock::{Clock, FakeClock, SystemClock};
pub use memory::MemoryStore;
pub use traced::TracedStore;
pub use traits::{
    Acl, CoordinationStore, NodeEvent, Perms, Stat, StoreError, Version, Watch, WatchSender,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
mod logs;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall, StoreOp};
#[cfg(any(test, feature = "test-support"))]
pub use logs::CapturedLogs;
