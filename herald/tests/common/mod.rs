#![allow(dead_code)]

use herald::{
    BoxError, CancelFlag, Cancellable, Event, EventBus, EventType, Listener,
    handlers::IgnoreExceptionHandler,
    testing::{CallLog, CollectingExceptionHandler},
};
use std::{
    any::{Any, TypeId},
    time::Duration,
};

// ============================================================================
// Test Event Types
// ============================================================================

/// A plain leaf event.
#[derive(Clone, Debug, PartialEq)]
pub struct Ping {
    pub seq: u32,
}

impl Event for Ping {}

/// A cancellable base event.
#[derive(Debug, Default)]
pub struct PlayerEvent {
    pub player: String,
    pub cancelled: CancelFlag,
}

impl PlayerEvent {
    pub fn new(player: &str) -> Self {
        Self {
            player: player.to_string(),
            cancelled: CancelFlag::default(),
        }
    }
}

impl Event for PlayerEvent {
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        Some(&self.cancelled)
    }
}

/// A subtype of [`PlayerEvent`], embedding it.
#[derive(Debug)]
pub struct PlayerJoin {
    pub base: PlayerEvent,
    pub first_time: bool,
}

impl PlayerJoin {
    pub fn new(player: &str) -> Self {
        Self {
            base: PlayerEvent::new(player),
            first_time: true,
        }
    }
}

impl Event for PlayerJoin {
    fn lineage() -> Vec<EventType> {
        let mut lineage = vec![EventType::of::<Self>()];
        lineage.extend(PlayerEvent::lineage());
        lineage
    }

    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        if target == TypeId::of::<Self>() {
            Some(self)
        } else {
            self.base.upcast(target)
        }
    }

    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        self.base.as_cancellable()
    }
}

// ============================================================================
// Buses
// ============================================================================

/// A bus whose faults are collected instead of logged.
pub fn collecting_bus(hierarchical: bool) -> (EventBus, CollectingExceptionHandler) {
    let faults = CollectingExceptionHandler::new();
    let bus = EventBus::builder()
        .hierarchical(hierarchical)
        .exception_handler(faults.clone())
        .build()
        .unwrap();
    (bus, faults)
}

/// A hierarchical bus that discards faults.
pub fn quiet_bus() -> EventBus {
    EventBus::builder()
        .exception_handler(IgnoreExceptionHandler)
        .build()
        .unwrap()
}

// ============================================================================
// Test Listeners
// ============================================================================

/// Sleeps before logging its label; holds the pass open across an await.
pub struct SlowListener {
    pub label: &'static str,
    pub delay: Duration,
    pub log: CallLog,
}

impl<E: Event> Listener<E> for SlowListener {
    async fn handle(&self, _event: &E) -> Result<(), BoxError> {
        tokio::time::sleep(self.delay).await;
        self.log.push(self.label);
        Ok(())
    }
}

/// Records the player name carried by any player event.
pub struct PlayerNameListener {
    pub log: CallLog,
}

impl Listener<PlayerEvent> for PlayerNameListener {
    async fn handle(&self, event: &PlayerEvent) -> Result<(), BoxError> {
        self.log.push(event.player.clone());
        Ok(())
    }
}
