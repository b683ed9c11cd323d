//! # Events and Event Types
//!
//! An [`Event`] is any thread-safe, `'static` value that can be posted to a
//! bus. Each event has a concrete [`EventType`] and a *lineage*: the concrete
//! type followed by every supertype it embeds, nearest first.
//!
//! Rust has no inheritance, so the hierarchy is expressed by composition. A
//! subtype embeds its supertype as a field and forwards [`Event::lineage`],
//! [`Event::upcast`] and [`Event::as_cancellable`] to it:
//!
//! ```rust
//! use herald_core::{CancelFlag, Cancellable, Event, EventType};
//! use std::any::{Any, TypeId};
//!
//! struct PlayerEvent {
//!     player: String,
//!     cancelled: CancelFlag,
//! }
//!
//! impl Event for PlayerEvent {
//!     fn as_cancellable(&self) -> Option<&dyn Cancellable> {
//!         Some(&self.cancelled)
//!     }
//! }
//!
//! struct PlayerJoin {
//!     base: PlayerEvent,
//! }
//!
//! impl Event for PlayerJoin {
//!     fn lineage() -> Vec<EventType> {
//!         let mut lineage = vec![EventType::of::<Self>()];
//!         lineage.extend(PlayerEvent::lineage());
//!         lineage
//!     }
//!
//!     fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
//!         if target == TypeId::of::<Self>() {
//!             Some(self)
//!         } else {
//!             self.base.upcast(target)
//!         }
//!     }
//!
//!     fn as_cancellable(&self) -> Option<&dyn Cancellable> {
//!         self.base.as_cancellable()
//!     }
//! }
//!
//! let lineage = PlayerJoin::lineage();
//! assert_eq!(lineage[1], EventType::of::<PlayerEvent>());
//! ```
//!
//! With the `macros` feature of the `herald` crate, `#[derive(Event)]`
//! generates the same code from `#[event(parent)]` and `#[event(cancel)]`
//! field attributes.

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicBool, Ordering},
};

/// Identifier for the runtime type of an event.
///
/// Equality and hashing use the [`TypeId`] only; the name is carried for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// The event type of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Object-safe access to the concrete type behind an [`Event`].
///
/// Implemented for every `'static` type; never implement it by hand.
#[doc(hidden)]
pub trait AsAny: Any {
    /// `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A value that can be posted to an event bus.
///
/// The defaults describe a leaf event with no supertypes and no cancelled
/// flag, so the simplest implementation is an empty `impl Event for MyEvent {}`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Event`",
    label = "missing `Event` implementation",
    note = "Implement `Event` (or `#[derive(Event)]`) for `{Self}` to post it or listen to it."
)]
pub trait Event: AsAny + Send + Sync + 'static {
    /// The concrete type followed by every supertype, nearest first.
    ///
    /// Hierarchical dispatch delivers this event to listeners registered for
    /// any entry of the lineage.
    fn lineage() -> Vec<EventType>
    where
        Self: Sized,
    {
        vec![EventType::of::<Self>()]
    }

    /// View this event as one of its lineage types.
    ///
    /// Returns `None` when `target` is not part of the lineage.
    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        (target == TypeId::of::<Self>()).then(|| self.as_any())
    }

    /// The cancellable capability, if this event has one.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }
}

impl dyn Event {
    /// The concrete type of this event.
    pub fn event_type(&self) -> EventType {
        EventType {
            id: self.as_any().type_id(),
            name: self.type_name(),
        }
    }

    /// View this event as `T`, which may be the concrete type or any supertype.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.upcast(TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Whether this event is cancellable and currently cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.as_cancellable().is_some_and(|c| c.is_cancelled())
    }
}

impl fmt::Debug for dyn Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

/// An event capability: a cancelled flag listeners can set during dispatch.
///
/// Listeners only ever see `&E`, so implementations use interior mutability.
pub trait Cancellable: Send + Sync {
    /// Whether the event is currently cancelled.
    fn is_cancelled(&self) -> bool;

    /// Set the cancelled flag.
    fn set_cancelled(&self, cancelled: bool);

    /// Mark the event cancelled.
    fn cancel(&self) {
        self.set_cancelled(true);
    }
}

/// Atomic cancelled flag, the stock [`Cancellable`] implementation.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    /// Create a flag with the given initial state.
    pub fn new(cancelled: bool) -> Self {
        Self(AtomicBool::new(cancelled))
    }
}

impl Cancellable for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set_cancelled(&self, cancelled: bool) {
        self.0.store(cancelled, Ordering::Release);
    }
}

impl Clone for CancelFlag {
    fn clone(&self) -> Self {
        Self::new(self.is_cancelled())
    }
}
