//! Subscription metadata shared by the engine and exception handlers.

use crate::{event::EventType, priority::Priority};
use std::fmt;

/// Identifier of a subscription, unique within the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a subscription holds on to its listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Liveness {
    /// The subscription owns its listener; it lives until unregistered.
    Strong,
    /// The subscription only observes its listener; once every outside owner
    /// drops it, the subscription is reclaimed on the next dispatch that
    /// reaches it.
    Weak,
}

/// Immutable metadata of a registered listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    /// Registry-assigned identifier.
    pub id: SubscriptionId,
    /// Display name, usually the listener's type name.
    pub name: String,
    /// The event type the listener was registered for.
    pub event_type: EventType,
    /// Execution priority.
    pub priority: Priority,
    /// Whether the listener still runs once the event has been cancelled.
    pub ignore_cancelled: bool,
    /// Strong or weak listener reference.
    pub liveness: Liveness,
}

impl fmt::Display for SubscriptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.liveness {
            Liveness::Strong => "StrongSubscription",
            Liveness::Weak => "WeakSubscription",
        };
        write!(
            f,
            "{kind}({}, priority={}, ignoreCancelled={})",
            self.name, self.priority, self.ignore_cancelled
        )
    }
}
