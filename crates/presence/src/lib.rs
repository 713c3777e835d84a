// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! presence: liveness detection over a coordination store
//!
//! An agent runs a [`Pinger`] that keeps rewriting its node; anyone else can ask
//! whether that agent is alive ([`Presence::alive`]) or wait for its liveness to
//! flip ([`Presence::alive_watch`]). Staleness is judged against a time the store
//! itself assigns, so local clock skew never decides liveness.

mod clock;
mod config;
mod error;
mod node;
mod pinger;
mod presence;
mod state;
mod watcher;

pub use clock::ClockSource;
pub use config::{ConfigError, PingerConfig, PresenceConfig};
pub use error::PresenceError;
pub use pinger::{Pinger, PingerStatus};
pub use presence::Presence;
pub use state::{decode_period, encode_period, LivenessState, StateResolver};
pub use watcher::{WatchHandle, WatchOutcome};
