//! Liveness transition specs
//!
//! Verify when an observer learns that a pinger died or came alive.

use crate::prelude::*;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn kill_is_seen_immediately() {
    let presence = Presence::new(store());
    let t0 = Instant::now();
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    let (alive, handle) = presence.alive_watch("/agent").await.unwrap();
    assert!(alive);

    tokio::time::sleep(ms(5)).await;
    pinger.kill().await.unwrap();

    assert_eq!(handle.await.transition(), Some(false));
    assert_between(t0.elapsed(), 5, 6);
}

#[tokio::test(start_paused = true)]
async fn graceful_stop_is_seen_one_timeout_after_the_final_write() {
    let presence = Presence::new(store());
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
async fn crashed_pinger_is_seen_one_timeout_after_its_last_refresh() {
    let presence = Presence::new(store());
    let t0 = Instant::now();
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    let (_, handle) = presence.alive_watch("/agent").await.unwrap();

    // Refreshes at 10ms and 20ms, then nothing
    tokio::time::sleep(ms(25)).await;
    drop(pinger);

    assert_eq!(handle.await.transition(), Some(false));
    assert_between(t0.elapsed(), 40, 42);
}

#[tokio::test(start_paused = true)]
async fn running_pinger_never_times_out() {
    let presence = Presence::new(store());
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    let (_, handle) = presence.alive_watch("/agent").await.unwrap();

    let result = tokio::time::timeout(ms(500), handle).await;

    assert!(result.is_err(), "watch resolved early: {:?}", result);
    pinger.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dead_path_comes_alive_when_recreated() {
    let presence = Presence::new(store());
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    pinger.kill().await.unwrap();

    let (alive, handle) = presence.alive_watch("/agent").await.unwrap();
    assert!(!alive);

    tokio::time::sleep(ms(100)).await;
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();

    assert_eq!(handle.await.transition(), Some(true));
    pinger.kill().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn timed_out_node_comes_alive_when_refreshed() {
    let presence = Presence::new(store());
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    pinger.stop().await.unwrap();
    tokio::time::sleep(ms(30)).await;

    let (alive, handle) = presence.alive_watch("/agent").await.unwrap();
    assert!(!alive);

    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();

    assert_eq!(handle.await.transition(), Some(true));
    pinger.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn every_observer_sees_the_death() {
    let presence = Presence::new(store());
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
    let mut handles = Vec::new();
    for _ in 0..5 {
        let (alive, handle) = presence.alive_watch("/agent").await.unwrap();
        assert!(alive);
        handles.push(handle);
    }

    pinger.kill().await.unwrap();

    for handle in handles {
        assert_eq!(handle.await.transition(), Some(false));
    }
}

#[tokio::test(start_paused = true)]
async fn watch_chain_follows_repeated_restarts() {
    let presence = Presence::new(store());
    let mut seen = Vec::new();

    for _ in 0..3 {
        let (alive, handle) = presence.alive_watch("/agent").await.unwrap();
        assert!(!alive);
        let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();
        seen.push(handle.await.transition());

        let (alive, handle) = presence.alive_watch("/agent").await.unwrap();
        assert!(alive);
        pinger.kill().await.unwrap();
        seen.push(handle.await.transition());
    }

    assert_eq!(
        seen,
        vec![
            Some(true),
            Some(false),
            Some(true),
            Some(false),
            Some(true),
            Some(false)
        ]
    );
}
