//! # Listeners
//!
//! A [`Listener`] is the unit of work the bus invokes for every matching
//! event. Listeners are async so they may suspend (await I/O, timers, other
//! tasks); a listener that never awaits behaves like a plain blocking
//! callback. Both flavours go through the same dispatch pass.
//!
//! # Usage Patterns
//!
//! 1. **Struct implementation**: `impl Listener<MyEvent> for MyListener`
//! 2. **Synchronous closure**: `from_fn(|event: &MyEvent| { ...; Ok(()) })`
//! 3. **Attribute macro**: `#[herald::listener] async fn on_my_event(event: &MyEvent) -> ...`
//!
//! A listener reports failure by returning `Err`. Panics are caught by the
//! engine and treated the same way: the fault is reported, counted, and the
//! pass moves on.

use crate::{error::BoxError, event::Event};
use std::{fmt, future::Future, marker::PhantomData, pin::Pin};

/// A callback invoked for each event of type `E`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener` for `{E}`",
    label = "missing `Listener` implementation",
    note = "Listeners must implement the `handle` method to process `{E}`."
)]
pub trait Listener<E: Event>: Send + Sync + 'static {
    /// Handle one event.
    fn handle(&self, event: &E) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`Listener`].
pub trait DynListener<E: Event>: Send + Sync + 'static {
    /// Handle one event (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        event: &'a E,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

// Blanket implementation: Any type implementing Listener implements DynListener automatically.
impl<E: Event, L: Listener<E>> DynListener<E> for L {
    fn handle_dyn<'a>(
        &'a self,
        event: &'a E,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.handle(event))
    }
}

// Allow Box<dyn DynListener> to be used where Listener is expected.
impl<E: Event> Listener<E> for Box<dyn DynListener<E>> {
    async fn handle(&self, event: &E) -> Result<(), BoxError> {
        // Deref to the trait object; `self.handle_dyn` would pick the blanket
        // impl for the `Box` and recurse.
        (**self).handle_dyn(event).await
    }
}

/// A listener built from a synchronous closure. See [`from_fn`].
pub struct FnListener<F, E> {
    f: F,
    _event: PhantomData<fn(&E)>,
}

/// Build a listener from a synchronous closure.
///
/// # Example
///
/// ```rust
/// use herald_core::{Event, Listener, from_fn};
///
/// struct Ping;
/// impl Event for Ping {}
///
/// let listener = from_fn(|_: &Ping| Ok(()));
/// # let _ = listener;
/// ```
pub fn from_fn<E, F>(f: F) -> FnListener<F, E>
where
    E: Event,
    F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    FnListener {
        f,
        _event: PhantomData,
    }
}

impl<E, F> Listener<E> for FnListener<F, E>
where
    E: Event,
    F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn handle(&self, event: &E) -> Result<(), BoxError> {
        (self.f)(event)
    }
}

impl<F, E> fmt::Debug for FnListener<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
            .field("f", &std::any::type_name::<F>())
            .finish()
    }
}
