//! # herald-std
//!
//! The dispatch engine of the Herald event bus.
//!
//! This crate provides:
//! - **Subscriptions**: [`Subscription`], strong or weak handles to a listener
//! - **Registry**: [`SubscriptionRegistry`], priority-ordered storage indexed by event type
//! - **Cache**: [`DispatchCache`], memoized per-type dispatch lists
//! - **Engine**: [`DispatchEngine`], the single dispatch pass every post goes through
//! - **Bus**: [`EventBus`] with its builder, configuration and post handles
//! - **Exception handlers**: logging and ignoring handlers
//! - **Testing**: fixtures for exercising buses in tests

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use herald_core;

// Modules
pub mod bus;
pub mod cache;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod post;
pub mod registry;
pub mod subscription;
pub mod testing;

pub use bus::{EventBus, Registrar};
pub use cache::{CacheKey, DispatchCache, DispatchList};
pub use config::{BusConfig, EventBusBuilder};
pub use engine::DispatchEngine;
pub use handlers::{IgnoreExceptionHandler, LogExceptionHandler};
pub use post::{PostFuture, PostHandle};
pub use registry::SubscriptionRegistry;
pub use subscription::Subscription;
