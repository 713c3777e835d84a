//! Concurrent pinger specs
//!
//! Verify racing pingers on one path converge on a single node.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn concurrent_starts_on_a_new_path_both_succeed() {
    let store = FakeStore::new();
    let presence = Presence::new(store.clone());

    let (a, b) = tokio::join!(
        presence.start_pinger("/agent", ms(10)),
        presence.start_pinger("/agent", ms(10)),
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(store.successful_creates("/agent"), 1);
    assert!(presence.alive("/agent").await.unwrap());
    a.stop().await.unwrap();
    b.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn concurrent_starts_on_many_paths_create_each_once() {
    let store = FakeStore::new();
    let presence = Presence::new(store.clone());
    let paths: Vec<String> = (0..4).map(|i| format!("/agent-{}", i)).collect();

    let mut tasks = Vec::new();
    for path in paths.iter().chain(paths.iter()) {
        let presence = presence.clone();
        let path = path.clone();
        tasks.push(tokio::spawn(async move {
            presence.start_pinger(path, ms(10)).await
        }));
    }
    let mut pingers = Vec::new();
    for task in tasks {
        pingers.push(task.await.unwrap().unwrap());
    }

    for path in &paths {
        assert_eq!(store.successful_creates(path), 1, "{}", path);
        assert!(presence.alive(path).await.unwrap());
    }
    // Observers share one clock node; it too is created exactly once
    assert_eq!(store.successful_creates("/clock"), 1);
    for pinger in pingers {
        pinger.kill().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_observers_share_the_clock_node() {
    let store = FakeStore::new();
    let presence = Presence::new(store.clone());
    let pinger = presence.start_pinger("/agent", ms(10)).await.unwrap();

    let (a, b, c) = tokio::join!(
        presence.alive("/agent"),
        presence.alive("/agent"),
        presence.alive("/agent"),
    );

    assert!(a.unwrap() && b.unwrap() && c.unwrap());
    assert_eq!(store.successful_creates("/clock"), 1);
    pinger.kill().await.unwrap();
}
