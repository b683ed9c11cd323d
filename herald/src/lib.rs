//! # herald - Typed In-Process Event Bus
//!
//! `herald` delivers posted events to every live listener registered for the
//! event's type, in a deterministic priority order, optionally including
//! listeners registered for the event's supertypes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! struct PlayerJoin {
//!     name: String,
//! }
//! impl Event for PlayerJoin {}
//!
//! let bus = EventBus::new();
//! bus.subscribe_fn(Priority::High, false, |event: &PlayerJoin| {
//!     println!("welcome, {}", event.name);
//!     Ok(())
//! });
//!
//! let result = bus.post_async(PlayerJoin { name: "alice".into() }).await;
//! assert_eq!(result.successful_calls(), 1);
//! ```
//!
//! ## Execution Modes
//!
//! - [`EventBus::post_async`]: run the pass on the current task and wait
//! - [`EventBus::post`]: spawn the pass and get an awaitable [`PostHandle`]
//! - [`EventBus::post_future`]: spawn the pass and get a [`PostFuture`] for
//!   non-async callers
//! - [`EventBus::post_blocking`]: run the pass on the calling thread
//!
//! ## Features
//!
//! - `tracing` (default): structured logs for registration, dispatch and faults
//! - `serde`: `Serialize`/`Deserialize` for [`BusConfig`] and [`Priority`]
//! - `macros`: `#[derive(Event)]` and `#[listener]`

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use herald_core::{
    // Error types
    BoxError,
    BuildError,
    // Events
    CancelFlag,
    Cancellable,
    DispatchError,
    // Listeners
    DynListener,
    Event,
    EventType,
    // Faults
    ExceptionHandler,
    FnListener,
    HeraldError,
    Listener,
    ListenerFault,
    Liveness,
    ParsePriorityError,
    // Results
    PostResult,
    // Ordering
    Priority,
    SubscriptionId,
    SubscriptionInfo,
    from_fn,
};

pub use herald_std::{
    BusConfig, DispatchCache, DispatchEngine, EventBus, EventBusBuilder, PostFuture, PostHandle,
    Registrar, Subscription, SubscriptionRegistry, post::PostOutcome,
};

/// Standard exception handlers.
pub mod handlers {
    pub use herald_std::handlers::{IgnoreExceptionHandler, LogExceptionHandler};
    pub use herald_std::testing::CollectingExceptionHandler;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use herald_std::testing::*;
}

/// Prelude module - common imports for Herald.
///
/// # Usage
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, CancelFlag, Cancellable, Event, EventBus, Listener, PostResult, Priority,
        Subscription, from_fn,
    };
}

#[cfg(feature = "macros")]
pub use herald_macros::{Event, listener};
