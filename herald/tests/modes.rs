//! Execution modes, caller cancellation, cache invalidation and concurrency.

use herald::{
    BuildError, DispatchError, EventBus, Priority,
    handlers::IgnoreExceptionHandler,
    testing::{CallLog, CountingListener, FailingListener, RecordingListener},
};
use std::{sync::Arc, time::Duration};

mod common;
use common::{Ping, SlowListener, quiet_bus};

fn registered(bus: &EventBus) -> CountingListener {
    let counter = CountingListener::new();
    bus.subscribe::<Ping, _>(Priority::High, false, counter.clone());
    bus.subscribe::<Ping, _>(Priority::Low, false, FailingListener::new("bad"));
    counter
}

// ============================================================================
// Execution modes
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_all_modes_produce_the_same_result() {
    let bus = quiet_bus();
    let counter = registered(&bus);

    let waited = bus.post_async(Ping { seq: 1 }).await;
    let spawned = bus.post(Ping { seq: 2 }).await.unwrap();
    let future = bus.post_future(Ping { seq: 3 }).await.unwrap();

    for result in [&waited, &spawned, &future] {
        assert_eq!(result.successful_calls(), 1);
        assert_eq!(result.failed_calls(), 1);
        assert_eq!(result.execution_times().len(), 1);
    }
    assert_eq!(spawned.event().seq, 2);
    assert_eq!(future.event().seq, 3);
    assert_eq!(counter.count(), 3);
}

#[test]
fn test_blocking_callers_without_runtime() {
    let bus = EventBus::builder()
        .exception_handler(IgnoreExceptionHandler)
        .build()
        .unwrap();
    assert!(bus.runtime().is_none());
    let counter = registered(&bus);

    let blocking = bus.post_blocking(Ping { seq: 1 });
    let handle = bus.post(Ping { seq: 2 });
    assert!(handle.is_finished());
    let waited = bus.post_future(Ping { seq: 3 }).wait().unwrap();

    assert_eq!(blocking.successful_calls(), waited.successful_calls());
    assert_eq!(blocking.failed_calls(), waited.failed_calls());
    assert_eq!(counter.count(), 3);
}

#[test]
fn test_post_future_wait_from_plain_thread() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .unwrap();
    let bus = EventBus::builder()
        .runtime(rt.handle().clone())
        .require_runtime(true)
        .build()
        .unwrap();
    let log = CallLog::new();
    bus.subscribe::<Ping, _>(
        Priority::Normal,
        false,
        SlowListener {
            label: "slow",
            delay: Duration::from_millis(20),
            log: log.clone(),
        },
    );

    let mut pending = bus.post_future(Ping { seq: 1 });
    let result = loop {
        if let Some(outcome) = pending.try_take() {
            break outcome.unwrap();
        }
        std::thread::sleep(Duration::from_millis(5));
    };
    assert_eq!(result.successful_calls(), 1);

    let result = bus.post_future(Ping { seq: 2 }).wait().unwrap();
    assert_eq!(result.successful_calls(), 1);
    assert_eq!(log.entries(), ["slow", "slow"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_on_complete_callback() {
    let bus = quiet_bus();
    bus.subscribe::<Ping, _>(Priority::Normal, false, CountingListener::new());

    let (tx, rx) = tokio::sync::oneshot::channel();
    bus.post_future(Ping { seq: 9 }).on_complete(move |outcome| {
        let _ = tx.send(outcome.map(|r| (r.event().seq, r.successful_calls())));
    });
    assert_eq!(rx.await.unwrap(), Ok((9, 1)));
}

#[test]
fn test_required_runtime_is_checked_at_build() {
    let err = EventBus::builder().require_runtime(true).build().unwrap_err();
    assert_eq!(err, BuildError::MissingRuntime);
}

// ============================================================================
// Caller cancellation
// ============================================================================

#[tokio::test]
async fn test_aborted_post_reports_cancellation_and_stops() {
    let bus = quiet_bus();
    let log = CallLog::new();
    bus.subscribe::<Ping, _>(
        Priority::High,
        false,
        SlowListener {
            label: "slow",
            delay: Duration::from_secs(30),
            log: log.clone(),
        },
    );
    bus.subscribe::<Ping, _>(Priority::Low, false, RecordingListener::new("after", &log));

    let handle = bus.post(Ping { seq: 1 });
    tokio::task::yield_now().await;
    handle.abort();

    assert_eq!(handle.await.unwrap_err(), DispatchError::Cancelled);
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_dropped_wait_abandons_the_pass() {
    let bus = quiet_bus();
    let log = CallLog::new();
    bus.subscribe::<Ping, _>(
        Priority::High,
        false,
        SlowListener {
            label: "slow",
            delay: Duration::from_secs(30),
            log: log.clone(),
        },
    );
    bus.subscribe::<Ping, _>(Priority::Low, false, RecordingListener::new("after", &log));

    let timed_out =
        tokio::time::timeout(Duration::from_millis(10), bus.post_async(Ping { seq: 1 })).await;
    assert!(timed_out.is_err());
    assert!(log.is_empty());
}

// ============================================================================
// Cache invalidation
// ============================================================================

#[tokio::test]
async fn test_unregister_is_seen_by_the_next_post() {
    let bus = quiet_bus();
    let log = CallLog::new();
    let gone =
        bus.subscribe::<Ping, _>(Priority::High, false, RecordingListener::new("gone", &log));
    bus.subscribe::<Ping, _>(Priority::Low, false, RecordingListener::new("stays", &log));

    bus.post_async(Ping { seq: 1 }).await;
    assert_eq!(bus.registry().cache().len(), 1);

    assert!(bus.unregister(&gone));
    assert!(!bus.unregister(&gone));
    log.clear();

    bus.post_async(Ping { seq: 2 }).await;
    assert_eq!(log.entries(), ["stays"]);
}

#[tokio::test]
async fn test_subscribe_is_seen_by_the_next_post() {
    let bus = quiet_bus();
    let log = CallLog::new();
    bus.subscribe::<Ping, _>(Priority::Normal, false, RecordingListener::new("first", &log));
    bus.post_async(Ping { seq: 1 }).await;

    bus.subscribe::<Ping, _>(Priority::Highest, false, RecordingListener::new("late", &log));
    bus.post_async(Ping { seq: 2 }).await;
    assert_eq!(log.entries(), ["first", "late", "first"]);
}

#[tokio::test]
async fn test_register_batch() {
    let bus = quiet_bus();
    let log = CallLog::new();
    let weak = Arc::new(RecordingListener::new("weak", &log));

    let subs = bus.register(|r| {
        r.strong::<Ping, _>(Priority::Low, false, RecordingListener::new("strong", &log))
            .weak::<Ping, _>(Priority::High, false, &weak)
            .function(Priority::Monitor, true, |_: &Ping| Ok(()));
    });
    assert_eq!(subs.len(), 3);

    let result = bus.post_async(Ping { seq: 1 }).await;
    assert_eq!(log.entries(), ["weak", "strong"]);
    assert_eq!(result.successful_calls(), 3);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts_and_registrations() {
    let bus = quiet_bus();
    let counter = CountingListener::new();
    bus.subscribe::<Ping, _>(Priority::Normal, false, counter.clone());

    let mut tasks = Vec::new();
    for seq in 0..32 {
        let bus = bus.clone();
        tasks.push(tokio::spawn(async move {
            let extra = bus.subscribe::<Ping, _>(Priority::Low, false, CountingListener::new());
            let result = bus.post_async(Ping { seq }).await;
            bus.unregister(&extra);
            result.successful_calls()
        }));
    }

    for task in tasks {
        // The shared listener always runs; racing extras may or may not.
        assert!(task.await.unwrap() >= 1);
    }
    assert_eq!(counter.count(), 32);
    assert_eq!(bus.registry().len(), 1);
}
