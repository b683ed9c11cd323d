//! The dispatch pass.
//!
//! Every post, whatever its execution mode, ends up in
//! [`DispatchEngine::dispatch`]: one ordered walk over the cached dispatch list
//! for the event's type.
//!
//! For each subscription, in order:
//!
//! 1. A weak subscription whose listener is gone is removed from the registry
//!    and skipped.
//! 2. If the event is cancelled and the subscription does not ignore
//!    cancellation, it is skipped. The flag is re-read for every subscription,
//!    so a cancellation by one listener affects all later ones.
//! 3. The listener runs under a monotonic timer. A normal return counts as a
//!    success and records the elapsed time; an `Err` or a panic counts as a
//!    failure and is handed to the exception handler.
//!
//! Dropping the future returned by `dispatch` stops the pass at its current
//! await point. Nothing is reported in that case.

use crate::{
    registry::SubscriptionRegistry,
    subscription::{Binding, Subscription},
};
use futures::FutureExt;
use herald_core::{Event, ExceptionHandler, ListenerFault, PostResult, SubscriptionId};
use std::{
    collections::HashMap,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::{Duration, Instant},
};

/// Runs dispatch passes against a registry.
pub struct DispatchEngine {
    registry: Arc<SubscriptionRegistry>,
    exception_handler: Arc<dyn ExceptionHandler>,
    hierarchical: bool,
}

impl DispatchEngine {
    /// Create an engine over `registry`.
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        exception_handler: Arc<dyn ExceptionHandler>,
        hierarchical: bool,
    ) -> Self {
        Self {
            registry,
            exception_handler,
            hierarchical,
        }
    }

    /// Deliver `event` to every eligible listener and summarize the pass.
    pub async fn dispatch<E: Event>(&self, event: E) -> PostResult<E> {
        let list = self.registry.dispatch_list::<E>(self.hierarchical);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            event = herald_core::EventType::of::<E>().short_name(),
            listeners = list.len(),
            "Dispatching event"
        );

        let mut successful_calls = 0;
        let mut failed_calls = 0;
        let mut execution_times: HashMap<SubscriptionId, Duration> = HashMap::new();

        for subscription in list.iter() {
            let erased: &dyn Event = &event;

            let invocation = match subscription.bind(erased) {
                Binding::Ready(invocation) => invocation,
                Binding::Gone => {
                    self.reclaim(subscription);
                    continue;
                }
                Binding::Mismatch => {
                    failed_calls += 1;
                    let fault = ListenerFault::TypeMismatch {
                        expected: subscription.event_type().name(),
                    };
                    self.report(subscription, erased, &fault);
                    continue;
                }
            };

            if !subscription.ignore_cancelled() && erased.is_cancelled() {
                continue;
            }

            let started = Instant::now();
            match AssertUnwindSafe(invocation).catch_unwind().await {
                Ok(Ok(())) => {
                    execution_times.insert(subscription.id(), started.elapsed());
                    successful_calls += 1;
                }
                Ok(Err(err)) => {
                    failed_calls += 1;
                    self.report(subscription, erased, &ListenerFault::Failed(err));
                }
                Err(payload) => {
                    failed_calls += 1;
                    self.report(subscription, erased, &ListenerFault::from_panic(payload));
                }
            }
        }

        PostResult::new(event, successful_calls, failed_calls, execution_times)
    }

    fn reclaim(&self, subscription: &Subscription) {
        let removed = self.registry.remove(subscription);

        #[cfg(feature = "tracing")]
        {
            if removed {
                tracing::debug!(
                    id = %subscription.id(),
                    listener = subscription.name(),
                    "Reclaimed dead weak subscription"
                );
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = removed;
    }

    /// Hand a fault to the exception handler. A panicking handler never
    /// aborts the pass.
    fn report(&self, subscription: &Subscription, event: &dyn Event, fault: &ListenerFault) {
        let handler = &self.exception_handler;
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            handler.handle_exception(subscription.info(), event, fault)
        }));

        if let Err(payload) = outcome {
            let message = herald_core::panic_message(payload.as_ref());
            #[cfg(feature = "tracing")]
            tracing::warn!(
                subscription = %subscription.info(),
                panic = %message,
                "Exception handler panicked"
            );
            #[cfg(not(feature = "tracing"))]
            eprintln!(
                "[herald] exception handler panicked while reporting {}: {message}",
                subscription.info()
            );
        }
    }

    /// The registry this engine dispatches from.
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// The handler receiving listener faults.
    pub fn exception_handler(&self) -> &Arc<dyn ExceptionHandler> {
        &self.exception_handler
    }

    /// Whether supertype listeners receive subtype events.
    pub fn is_hierarchical(&self) -> bool {
        self.hierarchical
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("registry", &self.registry)
            .field("hierarchical", &self.hierarchical)
            .finish_non_exhaustive()
    }
}
