//! Hierarchical matching, cancellation, weak liveness and fault isolation.

use herald::{
    Cancellable, DynListener, Event, ListenerFault, Liveness, Priority, SubscriptionInfo,
    testing::{
        CallLog, CancellingListener, CountingListener, FailingListener, PanickingListener,
        RecordingListener,
    },
};
use std::sync::Arc;

mod common;
use common::{Ping, PlayerEvent, PlayerJoin, PlayerNameListener, collecting_bus, quiet_bus};

// ============================================================================
// Hierarchy
// ============================================================================

#[tokio::test]
async fn test_supertype_listener_receives_subtype_when_hierarchical() {
    let (bus, _) = collecting_bus(true);
    let log = CallLog::new();
    bus.subscribe::<PlayerEvent, _>(
        Priority::Normal,
        false,
        PlayerNameListener { log: log.clone() },
    );
    bus.subscribe::<PlayerJoin, _>(Priority::Low, false, RecordingListener::new("join", &log));

    let result = bus.post_async(PlayerJoin::new("alice")).await;
    assert_eq!(log.entries(), ["alice", "join"]);
    assert_eq!(result.successful_calls(), 2);
}

#[tokio::test]
async fn test_supertype_listener_ignored_when_not_hierarchical() {
    let (bus, _) = collecting_bus(false);
    let log = CallLog::new();
    bus.subscribe::<PlayerEvent, _>(
        Priority::Normal,
        false,
        PlayerNameListener { log: log.clone() },
    );
    bus.subscribe::<PlayerJoin, _>(Priority::Low, false, RecordingListener::new("join", &log));

    let result = bus.post_async(PlayerJoin::new("alice")).await;
    assert_eq!(log.entries(), ["join"]);
    assert_eq!(result.successful_calls(), 1);

    // Exact matches still work.
    bus.post_async(PlayerEvent::new("bob")).await;
    assert_eq!(log.entries(), ["join", "bob"]);
}

#[tokio::test]
async fn test_subtype_listener_does_not_receive_supertype() {
    let bus = quiet_bus();
    let counter = CountingListener::new();
    bus.subscribe::<PlayerJoin, _>(Priority::Normal, false, counter.clone());

    let result = bus.post_async(PlayerEvent::new("carol")).await;
    assert_eq!(result.total_calls(), 0);
    assert_eq!(counter.count(), 0);
}

#[tokio::test]
async fn test_mixed_hierarchy_keeps_global_priority_order() {
    let bus = quiet_bus();
    let log = CallLog::new();
    bus.subscribe::<PlayerEvent, _>(
        Priority::Monitor,
        false,
        RecordingListener::new("base-monitor", &log),
    );
    bus.subscribe::<PlayerJoin, _>(Priority::Low, false, RecordingListener::new("join-low", &log));
    bus.subscribe::<PlayerEvent, _>(
        Priority::High,
        false,
        RecordingListener::new("base-high", &log),
    );
    bus.subscribe::<Ping, _>(Priority::Highest, false, RecordingListener::new("ping", &log));

    bus.post_async(PlayerJoin::new("dave")).await;
    assert_eq!(log.entries(), ["base-high", "join-low", "base-monitor"]);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancelled_event_skips_non_ignoring_listeners() {
    let bus = quiet_bus();
    let log = CallLog::new();
    bus.subscribe::<PlayerEvent, _>(Priority::Highest, false, CancellingListener);
    bus.subscribe::<PlayerEvent, _>(
        Priority::Normal,
        false,
        RecordingListener::new("normal", &log),
    );
    bus.subscribe::<PlayerEvent, _>(Priority::Low, true, RecordingListener::new("low", &log));

    let result = bus.post_async(PlayerEvent::new("erin")).await;
    assert_eq!(log.entries(), ["low"]);
    assert_eq!(result.successful_calls(), 2);
    assert_eq!(result.failed_calls(), 0);
    assert!(result.event().cancelled.is_cancelled());
}

#[tokio::test]
async fn test_cancellation_reaches_through_the_hierarchy() {
    let bus = quiet_bus();
    let log = CallLog::new();
    bus.subscribe::<PlayerJoin, _>(Priority::High, false, CancellingListener);
    bus.subscribe::<PlayerEvent, _>(
        Priority::Normal,
        false,
        RecordingListener::new("skipped", &log),
    );
    bus.subscribe::<PlayerEvent, _>(
        Priority::Monitor,
        true,
        RecordingListener::new("monitor", &log),
    );

    let result = bus.post_async(PlayerJoin::new("frank")).await;
    assert_eq!(log.entries(), ["monitor"]);
    assert!((result.event() as &dyn Event).is_cancelled());
}

#[tokio::test]
async fn test_listener_can_uncancel() {
    struct Uncancel;

    impl herald::Listener<PlayerEvent> for Uncancel {
        async fn handle(&self, event: &PlayerEvent) -> Result<(), herald::BoxError> {
            event.cancelled.set_cancelled(false);
            Ok(())
        }
    }

    let bus = quiet_bus();
    let log = CallLog::new();
    bus.subscribe::<PlayerEvent, _>(Priority::Highest, false, CancellingListener);
    bus.subscribe::<PlayerEvent, _>(Priority::High, true, Uncancel);
    bus.subscribe::<PlayerEvent, _>(Priority::Normal, false, RecordingListener::new("runs", &log));

    bus.post_async(PlayerEvent::new("gina")).await;
    assert_eq!(log.entries(), ["runs"]);
}

// ============================================================================
// Weak liveness
// ============================================================================

#[tokio::test]
async fn test_dead_weak_listener_is_skipped_and_removed() {
    let bus = quiet_bus();
    let log = CallLog::new();
    let listener = Arc::new(RecordingListener::new("weak", &log));
    let sub = bus.subscribe_weak::<Ping, _>(Priority::Normal, false, &listener);
    assert_eq!(sub.liveness(), Liveness::Weak);

    bus.post_async(Ping { seq: 1 }).await;
    assert_eq!(log.len(), 1);

    drop(listener);
    let result = bus.post_async(Ping { seq: 2 }).await;
    assert_eq!(log.len(), 1);
    assert_eq!(result.total_calls(), 0);
    assert!(!bus.registry().contains(&sub));
    assert!(!bus.unregister(&sub));
}

#[tokio::test]
async fn test_live_weak_listener_keeps_running() {
    let bus = quiet_bus();
    let counter = Arc::new(CountingListener::new());
    bus.subscribe_weak::<Ping, _>(Priority::Normal, false, &counter);

    for seq in 0..3 {
        bus.post_async(Ping { seq }).await;
    }
    assert_eq!(counter.count(), 3);
    assert_eq!(bus.registry().len(), 1);
}

// ============================================================================
// Fault isolation
// ============================================================================

#[tokio::test]
async fn test_failing_listener_does_not_stop_the_pass() {
    let (bus, faults) = collecting_bus(true);
    let log = CallLog::new();
    let failing = bus.subscribe::<Ping, _>(Priority::High, false, FailingListener::new("broken"));
    let ok = bus.subscribe::<Ping, _>(Priority::Low, false, RecordingListener::new("ok", &log));

    let result = bus.post_async(Ping { seq: 1 }).await;
    assert_eq!(result.failed_calls(), 1);
    assert_eq!(result.successful_calls(), 1);
    assert!(result.execution_time(failing.id()).is_none());
    assert!(result.execution_time(ok.id()).is_some());
    assert_eq!(log.entries(), ["ok"]);

    let faults = faults.faults();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].0.id, failing.id());
    assert_eq!(faults[0].1, "listener failed: broken");
}

#[tokio::test]
async fn test_panicking_listener_is_a_fault() {
    let (bus, faults) = collecting_bus(true);
    let counter = CountingListener::new();
    bus.subscribe::<Ping, _>(Priority::Highest, false, PanickingListener::new("boom"));
    bus.subscribe::<Ping, _>(Priority::Normal, false, counter.clone());

    let result = bus.post_async(Ping { seq: 1 }).await;
    assert_eq!(result.failed_calls(), 1);
    assert_eq!(counter.count(), 1);
    assert_eq!(faults.faults()[0].1, "listener panicked: boom");
}

#[tokio::test]
async fn test_exception_handler_sees_the_event() {
    let seen = Arc::new(seen::Seen::default());
    let sink = seen.clone();
    let bus = herald::EventBus::builder()
        .exception_handler(
            move |info: &SubscriptionInfo, event: &dyn Event, fault: &ListenerFault| {
                let player = event.downcast_ref::<PlayerEvent>().map(|p| p.player.clone());
                sink.record(info.priority, player, fault.to_string());
            },
        )
        .build()
        .unwrap();
    bus.subscribe::<PlayerEvent, _>(Priority::Low, false, FailingListener::new("nope"));

    bus.post_async(PlayerJoin::new("hank")).await;
    assert_eq!(
        seen.take(),
        vec![(
            Priority::Low,
            Some("hank".to_string()),
            "listener failed: nope".to_string()
        )]
    );
}

// ============================================================================
// Boxed listeners
// ============================================================================

#[tokio::test]
async fn test_boxed_dyn_listener_receives_events() {
    let (bus, faults) = collecting_bus(true);
    let log = CallLog::new();
    let sink = log.clone();
    let boxed: Box<dyn DynListener<Ping>> = Box::new(herald::from_fn(move |ping: &Ping| {
        sink.push(format!("boxed-{}", ping.seq));
        Ok(())
    }));
    bus.subscribe::<Ping, _>(Priority::Normal, false, boxed);

    let failing: Box<dyn DynListener<Ping>> = Box::new(FailingListener::new("boxed"));
    bus.subscribe::<Ping, _>(Priority::Low, false, failing);

    let result = bus.post_async(Ping { seq: 4 }).await;
    assert_eq!(result.successful_calls(), 1);
    assert_eq!(result.failed_calls(), 1);
    assert_eq!(log.entries(), ["boxed-4"]);
    assert_eq!(faults.faults()[0].1, "listener failed: boxed");
}

mod seen {
    use herald::Priority;
    use std::sync::Mutex;

    type Entry = (Priority, Option<String>, String);

    #[derive(Default)]
    pub struct Seen(Mutex<Vec<Entry>>);

    impl Seen {
        pub fn record(&self, priority: Priority, player: Option<String>, fault: String) {
            self.0.lock().unwrap().push((priority, player, fault));
        }

        pub fn take(&self) -> Vec<Entry> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }
}
