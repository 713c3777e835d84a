//! Clock skew specs
//!
//! Liveness is judged on the store's clock alone, so a store whose time is
//! far from the local wall clock must not change any answer.

use crate::prelude::*;
use chrono::{TimeZone, Utc};
use presence_store::MemoryStore;
use tokio::time::Instant;

fn skewed(year: i32) -> Store {
    let base = Utc.with_ymd_and_hms(year, 6, 1, 12, 0, 0).unwrap();
    MemoryStore::with_clock(TokioClock::starting_at(base))
}

#[tokio::test(start_paused = true)]
async fn store_far_in_the_past_still_sees_pinger_alive() {
    let presence = Presence::new(skewed(1990));

    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();

    assert!(presence.alive("/agent").await.unwrap());
    pinger.kill().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn store_far_in_the_future_keeps_timeout_window() {
    let presence = Presence::new(skewed(2090));
    let t0 = Instant::now();
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    let (alive, handle) = presence.alive_watch("/agent").await.unwrap();
    assert!(alive);

    tokio::time::sleep(ms(5)).await;
    pinger.stop().await.unwrap();

    assert_eq!(handle.await.transition(), Some(false));
    assert_between(t0.elapsed(), 25, 27);
}

#[tokio::test(start_paused = true)]
async fn clock_node_lives_on_the_store() {
    let store = skewed(2090);
    let presence = Presence::new(store.clone());
    store.create("/agent", "1s", &[]).await.unwrap();

    presence.alive("/agent").await.unwrap();

    let (_, clock) = store.get("/clock").await.unwrap();
    assert_eq!(clock.mtime.format("%Y").to_string(), "2090");
}
