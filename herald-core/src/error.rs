//! Error types for Herald.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HeraldError`] - Top-level error type for all Herald operations
//! - [`DispatchError`] - A post that ended without producing a result
//! - [`BuildError`] - Errors while assembling a bus
//! - [`ListenerFault`] - Faults raised by an individual listener

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Herald operations.
#[derive(Error, Debug)]
pub enum HeraldError {
    /// A post ended without a result.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// The bus could not be built.
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Ways a scheduled post can end without a [`PostResult`].
///
/// Listener faults never surface here; they are reported to the exception
/// handler and counted in the result instead.
///
/// [`PostResult`]: crate::PostResult
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The task running the dispatch pass was cancelled before it finished.
    #[error("dispatch was cancelled before completion")]
    Cancelled,

    /// The task running the dispatch pass panicked outside any listener.
    #[error("dispatch task panicked: {0}")]
    Panicked(String),
}

/// Errors raised while building an event bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A runtime was required but none was supplied or running.
    #[error("event bus requires a tokio runtime, but none was supplied or running")]
    MissingRuntime,
}

/// A fault raised by a single listener during a dispatch pass.
#[derive(Error, Debug)]
pub enum ListenerFault {
    /// The listener returned an error.
    #[error("listener failed: {0}")]
    Failed(#[source] BoxError),

    /// The listener panicked.
    #[error("listener panicked: {0}")]
    Panicked(String),

    /// The posted event could not be viewed as the subscribed type.
    #[error("event cannot be viewed as `{expected}`")]
    TypeMismatch {
        /// Name of the subscribed event type.
        expected: &'static str,
    },
}

impl ListenerFault {
    /// Build a fault from a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        ListenerFault::Panicked(panic_message(payload.as_ref()))
    }
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl DispatchError {
    /// Build a dispatch error from a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        DispatchError::Panicked(panic_message(payload.as_ref()))
    }
}

// Convenience conversions
impl From<BoxError> for HeraldError {
    fn from(err: BoxError) -> Self {
        HeraldError::Custom(err)
    }
}

impl From<BoxError> for ListenerFault {
    fn from(err: BoxError) -> Self {
        ListenerFault::Failed(err)
    }
}
