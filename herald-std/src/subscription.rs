//! Registered listeners and their liveness.
//!
//! A [`Subscription`] pairs immutable metadata with a type-erased listener
//! slot. The slot either owns the listener (strong) or only observes an
//! `Arc` the caller keeps (weak). Weak listeners are the explicit
//! expiring-handle model: when the last outside `Arc` is dropped, the next
//! dispatch that reaches the subscription finds it gone and reclaims it.

use futures::future::BoxFuture;
use herald_core::{
    BoxError, Event, EventType, Listener, Liveness, Priority, SubscriptionId, SubscriptionInfo,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::{Arc, Weak},
};

/// Result of resolving a subscription's listener against a posted event.
pub(crate) enum Binding<'a> {
    /// The listener is alive; the future runs it once polled.
    Ready(BoxFuture<'a, Result<(), BoxError>>),
    /// A weak listener whose last owner is gone.
    Gone,
    /// The event has no view of the subscribed type.
    Mismatch,
}

/// Type-erased listener storage.
trait ListenerSlot: Send + Sync {
    /// Resolve the listener and prepare (but do not start) its invocation.
    fn bind<'a>(&'a self, event: &'a dyn Event) -> Binding<'a>;

    fn is_alive(&self) -> bool;
}

enum Handle<L> {
    Strong(Arc<L>),
    Weak(Weak<L>),
}

struct Slot<E, L> {
    handle: Handle<L>,
    _event: PhantomData<fn(&E)>,
}

impl<E, L> ListenerSlot for Slot<E, L>
where
    E: Event,
    L: Listener<E>,
{
    fn bind<'a>(&'a self, event: &'a dyn Event) -> Binding<'a> {
        let listener = match &self.handle {
            Handle::Strong(listener) => Arc::clone(listener),
            Handle::Weak(weak) => match weak.upgrade() {
                Some(listener) => listener,
                None => return Binding::Gone,
            },
        };
        let Some(event) = event.downcast_ref::<E>() else {
            return Binding::Mismatch;
        };
        Binding::Ready(Box::pin(async move { listener.handle(event).await }))
    }

    fn is_alive(&self) -> bool {
        match &self.handle {
            Handle::Strong(_) => true,
            Handle::Weak(weak) => weak.strong_count() > 0,
        }
    }
}

struct Inner {
    info: SubscriptionInfo,
    slot: Box<dyn ListenerSlot>,
}

/// A registered listener plus its metadata.
///
/// Cloning is cheap and every clone refers to the same registration;
/// equality and hashing use the [`SubscriptionId`].
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    /// A subscription that owns `listener` until it is unregistered.
    pub(crate) fn strong<E, L>(
        id: SubscriptionId,
        priority: Priority,
        ignore_cancelled: bool,
        listener: L,
    ) -> Self
    where
        E: Event,
        L: Listener<E>,
    {
        Self::with_handle::<E, L>(
            id,
            priority,
            ignore_cancelled,
            Liveness::Strong,
            Handle::Strong(Arc::new(listener)),
        )
    }

    /// A subscription that only observes `listener`.
    ///
    /// The caller keeps ownership; once every `Arc` to the listener is
    /// dropped the subscription stops firing and is removed from its registry
    /// by the next dispatch that reaches it.
    pub(crate) fn weak<E, L>(
        id: SubscriptionId,
        priority: Priority,
        ignore_cancelled: bool,
        listener: &Arc<L>,
    ) -> Self
    where
        E: Event,
        L: Listener<E>,
    {
        Self::with_handle::<E, L>(
            id,
            priority,
            ignore_cancelled,
            Liveness::Weak,
            Handle::Weak(Arc::downgrade(listener)),
        )
    }

    fn with_handle<E, L>(
        id: SubscriptionId,
        priority: Priority,
        ignore_cancelled: bool,
        liveness: Liveness,
        handle: Handle<L>,
    ) -> Self
    where
        E: Event,
        L: Listener<E>,
    {
        let info = SubscriptionInfo {
            id,
            name: std::any::type_name::<L>().to_string(),
            event_type: EventType::of::<E>(),
            priority,
            ignore_cancelled,
            liveness,
        };
        let slot: Box<dyn ListenerSlot> = Box::new(Slot::<E, L> {
            handle,
            _event: PhantomData,
        });
        Self {
            inner: Arc::new(Inner { info, slot }),
        }
    }

    /// Registry-assigned identifier.
    pub fn id(&self) -> SubscriptionId {
        self.inner.info.id
    }

    /// Full metadata.
    pub fn info(&self) -> &SubscriptionInfo {
        &self.inner.info
    }

    /// Display name (the listener's type name).
    pub fn name(&self) -> &str {
        &self.inner.info.name
    }

    /// The event type this subscription was registered for.
    pub fn event_type(&self) -> EventType {
        self.inner.info.event_type
    }

    /// Execution priority.
    pub fn priority(&self) -> Priority {
        self.inner.info.priority
    }

    /// Whether the listener still runs for cancelled events.
    pub fn ignore_cancelled(&self) -> bool {
        self.inner.info.ignore_cancelled
    }

    /// Strong or weak.
    pub fn liveness(&self) -> Liveness {
        self.inner.info.liveness
    }

    /// Whether the listener can still be invoked. Always true for strong subscriptions.
    pub fn is_alive(&self) -> bool {
        self.inner.slot.is_alive()
    }

    pub(crate) fn bind<'a>(&'a self, event: &'a dyn Event) -> Binding<'a> {
        self.inner.slot.bind(event)
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Subscription {}

impl Hash for Subscription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("event_type", &self.event_type())
            .field("priority", &self.priority())
            .field("ignore_cancelled", &self.ignore_cancelled())
            .field("liveness", &self.liveness())
            .finish()
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.info(), f)
    }
}
