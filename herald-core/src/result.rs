//! Outcome of a single post.

use crate::subscription::SubscriptionId;
use std::{collections::HashMap, time::Duration};

/// Immutable summary of one dispatch pass.
///
/// Only listeners that actually ran and returned normally have an entry in
/// [`execution_times`](Self::execution_times). Skipped listeners (cancelled
/// event, reclaimed weak listener) appear in neither count.
#[derive(Debug, Clone)]
pub struct PostResult<E> {
    event: E,
    successful_calls: usize,
    failed_calls: usize,
    execution_times: HashMap<SubscriptionId, Duration>,
}

impl<E> PostResult<E> {
    /// Assemble a result. Used by dispatch engines.
    pub fn new(
        event: E,
        successful_calls: usize,
        failed_calls: usize,
        execution_times: HashMap<SubscriptionId, Duration>,
    ) -> Self {
        Self {
            event,
            successful_calls,
            failed_calls,
            execution_times,
        }
    }

    /// The posted event, in its state after the pass.
    pub fn event(&self) -> &E {
        &self.event
    }

    /// Take back ownership of the posted event.
    pub fn into_event(self) -> E {
        self.event
    }

    /// Number of listeners that returned normally.
    pub fn successful_calls(&self) -> usize {
        self.successful_calls
    }

    /// Number of listeners that raised a fault.
    pub fn failed_calls(&self) -> usize {
        self.failed_calls
    }

    /// Number of listeners invoked, successful or not.
    pub fn total_calls(&self) -> usize {
        self.successful_calls + self.failed_calls
    }

    /// Measured duration per successfully invoked subscription.
    pub fn execution_times(&self) -> &HashMap<SubscriptionId, Duration> {
        &self.execution_times
    }

    /// Measured duration of one subscription, if it ran successfully.
    pub fn execution_time(&self, id: SubscriptionId) -> Option<Duration> {
        self.execution_times.get(&id).copied()
    }

    /// Sum of all measured durations.
    pub fn total_execution_time(&self) -> Duration {
        self.execution_times.values().sum()
    }
}
