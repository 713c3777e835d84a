//! Pinger lifecycle specs
//!
//! Verify configured pingers and how refresh failures reach observers.

use crate::prelude::*;
use presence::{PingerConfig, PingerStatus};
use presence_store::StoreOp;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn pinger_declared_in_toml_heartbeats() {
    let store = store();
    let config = PresenceConfig::from_toml_str("clock_path = \"/now\"\n").unwrap();
    let declared =
        PingerConfig::from_toml_str("path = \"/agent\"\nperiod = \"10ms\"\n").unwrap();
    let presence = Presence::with_config(store.clone(), config).unwrap();

    let pinger = presence.start_configured(&declared).await.unwrap();
    tokio::time::sleep(ms(100)).await;

    assert!(presence.alive("/agent").await.unwrap());
    assert!(store.get("/now").await.is_ok());
    pinger.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn relative_clock_path_is_refused_up_front() {
    let config = PresenceConfig::default().with_clock_path("clock");

    let result = Presence::with_config(store(), config);

    assert!(matches!(result, Err(presence::ConfigError::Invalid(_))));
}

#[tokio::test(start_paused = true)]
async fn zero_period_is_refused() {
    let presence = Presence::new(store());

    let result = presence.start_pinger("/agent", ms(0)).await;

    assert!(matches!(result, Err(PresenceError::InvalidPeriod(_))));
    assert!(!presence.alive("/agent").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_is_reported_and_observers_see_death() {
    let store = FakeStore::new();
    let presence = Presence::new(store.clone());
    let t0 = Instant::now();
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    let (_, handle) = presence.alive_watch("/agent").await.unwrap();
    store.fail_next(StoreOp::Set, StoreError::Connection("lost".to_string()));

    let reason = pinger.failed().await.unwrap();
    assert!(reason.contains("lost"), "{}", reason);
    assert!(matches!(pinger.status(), PingerStatus::Failed(_)));

    // No refresh after t0, so the watch times out one window later
    assert_eq!(handle.await.transition(), Some(false));
    assert_between(t0.elapsed(), 20, 22);

    let err = pinger.kill().await.unwrap_err();
    assert!(matches!(err, PresenceError::Refresh { .. }));
    assert!(!presence.alive("/agent").await.unwrap());
}
