//! Testing utilities for Herald.
//!
//! This module provides fixtures to make testing buses and listeners easier.
//! Every listener here implements [`Listener<E>`] for any event type, so
//! pick the event with a turbofish: `bus.subscribe::<MyEvent, _>(..)`.
//!
//! # Features
//!
//! - [`CallLog`]: a shared, ordered log of listener invocations
//! - [`RecordingListener`]: appends its label to a [`CallLog`]
//! - [`CountingListener`]: counts invocations
//! - [`FailingListener`] / [`PanickingListener`]: raise a fault on every call
//! - [`CancellingListener`]: cancels every cancellable event it sees
//! - [`CollectingExceptionHandler`]: keeps every reported fault for inspection

use herald_core::{BoxError, Event, ExceptionHandler, Listener, ListenerFault, SubscriptionInfo};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Call Log
// ============================================================================

/// A shared log of labels, in the order listeners ran.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// bus.subscribe::<Ping, _>(Priority::High, false, RecordingListener::new("first", &log));
/// bus.subscribe::<Ping, _>(Priority::Low, false, RecordingListener::new("second", &log));
///
/// bus.post_async(Ping).await;
/// assert_eq!(log.entries(), ["first", "second"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Get a copy of the entries.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ============================================================================
// Recording Listener
// ============================================================================

/// A listener that appends its label to a [`CallLog`] on every event.
#[derive(Debug, Clone)]
pub struct RecordingListener {
    label: String,
    log: CallLog,
}

impl RecordingListener {
    /// Create a recording listener writing to `log`.
    pub fn new(label: impl Into<String>, log: &CallLog) -> Self {
        Self {
            label: label.into(),
            log: log.clone(),
        }
    }

    /// The label this listener records.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<E: Event> Listener<E> for RecordingListener {
    async fn handle(&self, _event: &E) -> Result<(), BoxError> {
        self.log.push(self.label.clone());
        Ok(())
    }
}

// ============================================================================
// Counting Listener
// ============================================================================

/// A listener that counts invocations.
///
/// Clones share the counter, so keep one to inspect after handing another to
/// the bus.
#[derive(Debug, Clone, Default)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl CountingListener {
    /// Create a new counting listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<E: Event> Listener<E> for CountingListener {
    async fn handle(&self, _event: &E) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Faulty Listeners
// ============================================================================

/// A listener that always returns an error.
#[derive(Debug, Clone)]
pub struct FailingListener {
    message: String,
}

impl FailingListener {
    /// Fail with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<E: Event> Listener<E> for FailingListener {
    async fn handle(&self, _event: &E) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}

/// A listener that always panics.
#[derive(Debug, Clone, Copy)]
pub struct PanickingListener {
    message: &'static str,
}

impl PanickingListener {
    /// Panic with `message`.
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl<E: Event> Listener<E> for PanickingListener {
    async fn handle(&self, _event: &E) -> Result<(), BoxError> {
        panic!("{}", self.message)
    }
}

// ============================================================================
// Cancelling Listener
// ============================================================================

/// A listener that cancels the event it receives.
///
/// Fails when the event has no cancelled flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancellingListener;

impl<E: Event> Listener<E> for CancellingListener {
    async fn handle(&self, event: &E) -> Result<(), BoxError> {
        match event.as_cancellable() {
            Some(flag) => {
                flag.cancel();
                Ok(())
            }
            None => Err(format!("`{}` is not cancellable", std::any::type_name::<E>()).into()),
        }
    }
}

// ============================================================================
// Collecting Exception Handler
// ============================================================================

/// An exception handler that keeps every fault it receives.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct CollectingExceptionHandler {
    faults: Arc<Mutex<Vec<(SubscriptionInfo, String)>>>,
}

impl CollectingExceptionHandler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reported subscriptions and fault descriptions, in report order.
    pub fn faults(&self) -> Vec<(SubscriptionInfo, String)> {
        self.faults.lock().clone()
    }

    /// Number of reported faults.
    pub fn len(&self) -> usize {
        self.faults.lock().len()
    }

    /// Whether no fault was reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExceptionHandler for CollectingExceptionHandler {
    fn handle_exception(&self, info: &SubscriptionInfo, _event: &dyn Event, fault: &ListenerFault) {
        self.faults.lock().push((info.clone(), fault.to_string()));
    }
}
