//! Exception reporting for listener faults.

use crate::{error::ListenerFault, event::Event, subscription::SubscriptionInfo};

/// Receives every fault raised by a listener during a dispatch pass.
///
/// The handler runs synchronously, inline with the pass, once per fault. A
/// panic inside the handler is contained by the engine and never aborts the
/// pass.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `ExceptionHandler`",
    label = "missing `ExceptionHandler` implementation",
    note = "Implement `handle_exception`, or pass a closure `Fn(&SubscriptionInfo, &dyn Event, &ListenerFault)`."
)]
pub trait ExceptionHandler: Send + Sync + 'static {
    /// Called with the failing subscription, the posted event and the fault.
    fn handle_exception(&self, info: &SubscriptionInfo, event: &dyn Event, fault: &ListenerFault);
}

impl<F> ExceptionHandler for F
where
    F: Fn(&SubscriptionInfo, &dyn Event, &ListenerFault) + Send + Sync + 'static,
{
    fn handle_exception(&self, info: &SubscriptionInfo, event: &dyn Event, fault: &ListenerFault) {
        (self)(info, event, fault)
    }
}
