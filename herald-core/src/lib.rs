//! # herald-core
//!
//! Core traits and value types for the Herald typed event bus.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins and extensions that publish or listen to events without pulling in
//! the dispatch engine from `herald-std`.
//!
//! # Building Blocks
//!
//! ## Events ([`Event`])
//!
//! Any `Send + Sync + 'static` type can be posted once it implements [`Event`].
//! An event names its own [`EventType`] and, optionally, the chain of
//! supertypes it embeds. Hierarchical dispatch delivers a posted event to
//! listeners registered for any type in that chain.
//!
//! ## Cancellation ([`Cancellable`])
//!
//! An event may expose a cancelled flag. Listeners flip it during a dispatch
//! pass; subscriptions that do not ignore cancellation are skipped afterwards.
//!
//! ## Listeners ([`Listener`])
//!
//! The unit of work invoked for each matching event. Listeners are async; a
//! blocking body simply never awaits.
//!
//! ## Ordering ([`Priority`])
//!
//! Listeners run from [`Priority::Highest`] down to [`Priority::Lowest`], with
//! [`Priority::Monitor`] always last.
//!
//! ## Faults ([`ExceptionHandler`])
//!
//! A listener that fails never aborts the pass. The fault is handed to the
//! bus's exception handler and counted in the [`PostResult`].
//!
//! # Error Types
//!
//! - [`HeraldError`] - Top-level error type
//! - [`DispatchError`] - A post that ended without a result
//! - [`BuildError`] - Bus construction errors
//! - [`ListenerFault`] - Faults raised by individual listeners

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod handler;
mod listener;
mod priority;
mod result;
mod subscription;

// Re-exports
pub use error::{BoxError, BuildError, DispatchError, HeraldError, ListenerFault, panic_message};
#[doc(hidden)]
pub use event::AsAny;
pub use event::{CancelFlag, Cancellable, Event, EventType};
pub use handler::ExceptionHandler;
pub use listener::{DynListener, FnListener, Listener, from_fn};
pub use priority::{ParsePriorityError, Priority};
pub use result::PostResult;
pub use subscription::{Liveness, SubscriptionId, SubscriptionInfo};
