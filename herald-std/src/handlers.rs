//! Stock exception handlers.

use herald_core::{Event, ExceptionHandler, ListenerFault, SubscriptionInfo};

/// Logs every listener fault. This is the bus default.
///
/// With the `tracing` feature faults are emitted as `error!` events;
/// otherwise they are written to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogExceptionHandler;

impl ExceptionHandler for LogExceptionHandler {
    fn handle_exception(&self, info: &SubscriptionInfo, event: &dyn Event, fault: &ListenerFault) {
        #[cfg(feature = "tracing")]
        {
            tracing::error!(
                subscription = %info,
                event = event.event_type().short_name(),
                error = %fault,
                "Listener raised a fault"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            eprintln!(
                "[herald] {info} failed on {}: {fault}",
                event.event_type().short_name()
            );
        }
    }
}

/// Discards every listener fault. Failures are still counted in the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreExceptionHandler;

impl ExceptionHandler for IgnoreExceptionHandler {
    fn handle_exception(&self, _: &SubscriptionInfo, _: &dyn Event, _: &ListenerFault) {}
}
