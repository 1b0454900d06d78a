mod common;

use std::{sync::Arc, thread, time::Duration};

use bytes::Bytes;
use common::{
    coordinator, wait_for, weak_callback, Behavior, MockTransport, RecordingCallback, WAIT,
};
use parking_lot::Mutex;
use remotedraw::{
    config::FetcherConfig,
    fetch::{FetchOutcome, PresentationQueue},
    FetchError,
};

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test]
fn test_fetch_coordinator_shares_one_fetch_per_key() -> anyhow::Result<()> {
    let transport = MockTransport::gated();
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let first = RecordingCallback::new();
    let second = RecordingCallback::new();
    let _r1 = pending(coordinator.fetch_or_get("img2", weak_callback(&first)));
    let _r2 = pending(coordinator.fetch_or_get("img2", weak_callback(&second)));

    assert!(wait_for(|| transport.calls_for("img2") == 1));
    assert_eq!(coordinator.waiter_count("img2"), 2);
    assert_eq!(coordinator.pending_count(), 1);

    transport.release();
    queue.run_until(WAIT, || first.event_count() == 1 && second.event_count() == 1);

    let a = first.loaded().expect("first callback loaded");
    let b = second.loaded().expect("second callback loaded");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!((a.width(), a.height()), (4, 3));
    assert_eq!(transport.calls_for("img2"), 1);
    assert!(!coordinator.is_pending("img2"));

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_serves_cache_hits_synchronously() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let callback = RecordingCallback::new();
    let _registration = pending(coordinator.fetch_or_get("img", weak_callback(&callback)));
    queue.run_until(WAIT, || callback.event_count() == 1);
    let loaded = callback.loaded().expect("loaded");

    let later = RecordingCallback::new();
    match coordinator.fetch_or_get("img", weak_callback(&later)) {
        FetchOutcome::Ready(resource) => assert!(Arc::ptr_eq(&resource, &loaded)),
        FetchOutcome::Pending(_) => panic!("expected a cache hit"),
    }

    assert_eq!(queue.run_for(Duration::from_millis(50)), 0);
    assert_eq!(later.event_count(), 0);
    assert_eq!(transport.total_calls(), 1);
    assert_eq!(coordinator.cache_len(), 1);

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_failure_is_not_cached() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.set("broken", Behavior::Fail("connection reset".into()));
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let callback = RecordingCallback::new();
    let _registration = pending(coordinator.fetch_or_get("broken", weak_callback(&callback)));
    queue.run_until(WAIT, || callback.event_count() == 1);

    assert_eq!(
        callback.failure(),
        Some(FetchError::Transport("connection reset".into()))
    );
    assert!(coordinator.cached("broken").is_none());
    assert!(!coordinator.is_pending("broken"));

    // Nothing retries on its own; asking again starts a new attempt.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(transport.calls_for("broken"), 1);

    let retry = RecordingCallback::new();
    let _registration = pending(coordinator.fetch_or_get("broken", weak_callback(&retry)));
    queue.run_until(WAIT, || retry.event_count() == 1);
    assert_eq!(transport.calls_for("broken"), 2);
    assert!(retry.failure().is_some());

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_reports_decode_errors() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.set("garbage", Behavior::Serve(Bytes::from_static(b"not an image")));
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let callback = RecordingCallback::new();
    let _registration = pending(coordinator.fetch_or_get("garbage", weak_callback(&callback)));
    queue.run_until(WAIT, || callback.event_count() == 1);

    assert!(matches!(callback.failure(), Some(FetchError::Decode(_))));
    assert_eq!(coordinator.cache_len(), 0);

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_enforces_fetch_deadline() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.set("slow", Behavior::Hang);
    let queue = PresentationQueue::new();
    let config = FetcherConfig::default().with_fetch_timeout(Duration::from_millis(50));
    let coordinator = coordinator(config, &transport, &queue);

    let callback = RecordingCallback::new();
    let _registration = pending(coordinator.fetch_or_get("slow", weak_callback(&callback)));
    queue.run_until(WAIT, || callback.event_count() == 1);

    assert_eq!(
        callback.failure(),
        Some(FetchError::Timeout(Duration::from_millis(50)))
    );
    assert!(wait_for(|| transport.in_flight() == 0));

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_bounds_concurrency_by_pool_size() -> anyhow::Result<()> {
    let transport = MockTransport::gated();
    let queue = PresentationQueue::new();
    let config = FetcherConfig::default().with_pool_size(3);
    let coordinator = coordinator(config, &transport, &queue);

    let keys = ["a", "b", "c", "d", "e"];
    let callbacks: Vec<_> = keys.iter().map(|_| RecordingCallback::new()).collect();
    let _registrations: Vec<_> = keys
        .iter()
        .zip(&callbacks)
        .map(|(key, callback)| pending(coordinator.fetch_or_get(key, weak_callback(callback))))
        .collect();

    assert!(wait_for(|| transport.in_flight() == 3));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(transport.total_calls(), 3);
    assert_eq!(coordinator.pending_count(), 5);

    transport.release();
    queue.run_until(WAIT, || callbacks.iter().all(|c| c.event_count() == 1));

    assert!(callbacks.iter().all(|c| c.loaded().is_some()));
    assert_eq!(transport.total_calls(), 5);
    assert_eq!(transport.max_in_flight(), 3);

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_notifies_in_registration_order() -> anyhow::Result<()> {
    let transport = MockTransport::gated();
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let log = Arc::new(Mutex::new(Vec::new()));
    let callbacks: Vec<_> = ["first", "second", "third"]
        .iter()
        .map(|name| RecordingCallback::logging(name, &log))
        .collect();
    let _registrations: Vec<_> = callbacks
        .iter()
        .map(|callback| pending(coordinator.fetch_or_get("img", weak_callback(callback))))
        .collect();

    transport.release();
    queue.run_until(WAIT, || log.lock().len() == 3);

    assert_eq!(*log.lock(), vec!["first", "second", "third"]);

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_skips_unregistered_callbacks() -> anyhow::Result<()> {
    let transport = MockTransport::gated();
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let cancelled = RecordingCallback::new();
    let dropped = RecordingCallback::new();
    let kept = RecordingCallback::new();

    let registration = pending(coordinator.fetch_or_get("img", weak_callback(&cancelled)));
    let _dropped_registration = pending(coordinator.fetch_or_get("img", weak_callback(&dropped)));
    let _kept_registration = pending(coordinator.fetch_or_get("img", weak_callback(&kept)));
    assert_eq!(coordinator.waiter_count("img"), 3);

    registration.cancel();
    assert_eq!(coordinator.waiter_count("img"), 2);

    let dropped_weak = Arc::downgrade(&dropped);
    drop(dropped);
    assert!(dropped_weak.upgrade().is_none());

    transport.release();
    queue.run_until(WAIT, || kept.event_count() == 1);
    queue.run_for(Duration::from_millis(20));

    assert_eq!(cancelled.event_count(), 0);
    assert!(kept.loaded().is_some());
    assert!(coordinator.cached("img").is_some());

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_keeps_fetching_without_waiters() -> anyhow::Result<()> {
    let transport = MockTransport::gated();
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let callback = RecordingCallback::new();
    drop(coordinator.fetch_or_get("img", weak_callback(&callback)));
    assert_eq!(coordinator.waiter_count("img"), 0);
    assert!(coordinator.is_pending("img"));

    transport.release();
    assert!(wait_for(|| coordinator.cached("img").is_some()));
    assert_eq!(queue.run_pending(), 0);
    assert_eq!(callback.event_count(), 0);

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_shutdown_fails_pending_fetches() -> anyhow::Result<()> {
    let transport = MockTransport::gated();
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    transport.set("ready", Behavior::Serve(common::png_bytes(2, 2)));
    transport.release();
    let warm = RecordingCallback::new();
    let _warm = pending(coordinator.fetch_or_get("ready", weak_callback(&warm)));
    queue.run_until(WAIT, || warm.event_count() == 1);

    transport.set("stuck", Behavior::Hang);
    let stuck = RecordingCallback::new();
    let _stuck = pending(coordinator.fetch_or_get("stuck", weak_callback(&stuck)));
    assert!(wait_for(|| transport.calls_for("stuck") == 1));

    coordinator.shutdown();
    coordinator.shutdown();
    queue.run_pending();
    assert_eq!(stuck.failure(), Some(FetchError::Shutdown));
    assert_eq!(coordinator.pending_count(), 0);

    // Cached resources are still served; misses fail right away.
    assert!(matches!(
        coordinator.fetch_or_get("ready", weak_callback(&warm)),
        FetchOutcome::Ready(_)
    ));

    let late = RecordingCallback::new();
    let _late = pending(coordinator.fetch_or_get("other", weak_callback(&late)));
    queue.run_pending();
    assert_eq!(late.failure(), Some(FetchError::Shutdown));
    assert_eq!(transport.calls_for("other"), 0);

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_evict_forces_refetch() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    let queue = PresentationQueue::new();
    let coordinator = coordinator(FetcherConfig::default(), &transport, &queue);

    let callback = RecordingCallback::new();
    let _registration = pending(coordinator.fetch_or_get("img", weak_callback(&callback)));
    queue.run_until(WAIT, || callback.event_count() == 1);

    assert!(coordinator.evict("img").is_some());
    assert!(coordinator.cached("img").is_none());

    let again = RecordingCallback::new();
    let _registration = pending(coordinator.fetch_or_get("img", weak_callback(&again)));
    queue.run_until(WAIT, || again.event_count() == 1);
    assert_eq!(transport.calls_for("img"), 2);

    coordinator.clear_cache();
    assert_eq!(coordinator.cache_len(), 0);

    Ok(())
}

#[test_log::test]
fn test_fetch_coordinator_rejects_invalid_config() {
    let transport = MockTransport::new();
    let queue = PresentationQueue::new();
    let result = remotedraw::fetch::FetchCoordinator::new(
        FetcherConfig::default().with_pool_size(0),
        transport,
        Arc::new(remotedraw::resource::ImageDecoder),
        queue.presenter(),
    );

    assert!(matches!(
        result,
        Err(remotedraw::RemoteDrawError::InvalidConfig(_))
    ));
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn pending(outcome: FetchOutcome) -> remotedraw::fetch::FetchRegistration {
    match outcome {
        FetchOutcome::Pending(registration) => registration,
        FetchOutcome::Ready(_) => panic!("expected a pending fetch"),
    }
}
