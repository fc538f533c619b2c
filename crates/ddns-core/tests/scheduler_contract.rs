//! Contract Test: Scheduling & Shutdown
//!
//! Verifies that the engine runs cycles on a fixed interval and stops
//! cleanly when signalled.
//!
//! Constraints verified:
//! - The first cycle runs immediately
//! - Later cycles follow the configured interval
//! - Shutdown returns Ok and emits a Stopped event
//! - An address change between cycles is picked up by the next cycle
//!
//! Time is paused; sleeping in the test advances the engine's clock.

mod common;

use common::*;
use ddns_core::{DdnsEngine, EngineEvent};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_immediately_then_on_interval() {
    let source = StaticIpSource::v4_only("203.0.113.5");
    let provider = MockZoneProvider::new().with_zone(
        "example.com",
        "zoneA",
        vec![record("ra", "a", "A", "203.0.113.5")],
    );

    let (engine, _events) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        test_config(&["a.example.com"], false).with_interval_secs(300),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.v4_calls(), 1, "first cycle runs at start");

    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(source.v4_calls(), 1, "no cycle before the interval elapses");

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(source.v4_calls(), 2, "second cycle after one interval");

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(source.v4_calls(), 3);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(provider.update_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_emits_stopped_event() {
    let (engine, mut events) = DdnsEngine::new(
        Box::new(StaticIpSource::v4_only("203.0.113.5")),
        Box::new(MockZoneProvider::new()),
        test_config(&["a.example.com"], false),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    assert_eq!(
        last,
        Some(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string()
        })
    );
}

#[tokio::test(start_paused = true)]
async fn dropped_shutdown_sender_stops_engine() {
    let (engine, _events) = DdnsEngine::new(
        Box::new(StaticIpSource::v4_only("203.0.113.5")),
        Box::new(MockZoneProvider::new()),
        test_config(&["a.example.com"], false),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    drop(shutdown_tx);
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "engine should stop when the sender is dropped");
}

#[tokio::test(start_paused = true)]
async fn address_change_is_applied_next_cycle() {
    let source = StaticIpSource::v4_only("203.0.113.5");
    let provider = MockZoneProvider::new().with_zone(
        "example.com",
        "zoneA",
        vec![record("ra", "a", "A", "203.0.113.5")],
    );

    let (engine, mut events) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        test_config(&["a.example.com"], false).with_interval_secs(60),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(provider.update_calls(), 0);

    source.set_v4("198.51.100.20");
    tokio::time::sleep(Duration::from_secs(90)).await;

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(provider.address_of("ra").as_deref(), Some("198.51.100.20"));
    assert_eq!(provider.reload_calls(), 1);

    let mut updated = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::RecordUpdated { previous, new_ip, .. } = event {
            updated.push((previous, new_ip));
        }
    }
    assert_eq!(
        updated,
        vec![("203.0.113.5".to_string(), "198.51.100.20".parse().unwrap())]
    );
}
