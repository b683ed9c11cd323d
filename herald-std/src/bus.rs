//! The event bus: registration plus the three execution modes.
//!
//! | method            | caller        | returns                            |
//! |-------------------|---------------|------------------------------------|
//! | [`post_async`]    | async task    | `PostResult<E>` once the pass ends |
//! | [`post`]          | async or sync | [`PostHandle`] to a spawned pass   |
//! | [`post_future`]   | sync          | [`PostFuture`] completion handle   |
//! | [`post_blocking`] | sync          | `PostResult<E>`                    |
//!
//! All of them run the same [`DispatchEngine::dispatch`] pass.
//!
//! [`post_async`]: EventBus::post_async
//! [`post`]: EventBus::post
//! [`post_future`]: EventBus::post_future
//! [`post_blocking`]: EventBus::post_blocking

use crate::{
    config::EventBusBuilder,
    engine::DispatchEngine,
    post::{PostFuture, PostHandle},
    registry::SubscriptionRegistry,
    subscription::Subscription,
};
use futures::{FutureExt, channel::oneshot};
use herald_core::{
    BoxError, DispatchError, Event, ExceptionHandler, Listener, PostResult, Priority, from_fn,
};
use std::{panic::AssertUnwindSafe, sync::Arc};
use tokio::runtime::Handle;

/// A typed, in-process publish/subscribe dispatcher.
///
/// Cloning is cheap; clones share the same registry.
///
/// # Example
///
/// ```rust,ignore
/// let bus = EventBus::new();
/// bus.subscribe_fn(Priority::Normal, false, |event: &PlayerJoin| {
///     println!("{} joined", event.name);
///     Ok(())
/// });
///
/// let result = bus.post_async(PlayerJoin::new("alice")).await;
/// assert_eq!(result.successful_calls(), 1);
/// ```
#[derive(Clone)]
pub struct EventBus {
    engine: Arc<DispatchEngine>,
    runtime: Option<Handle>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// A hierarchical bus with the logging exception handler.
    ///
    /// Scheduled posts run on the tokio runtime this is called from, or
    /// inline when there is none.
    pub fn new() -> Self {
        EventBusBuilder::new().assemble(Handle::try_current().ok())
    }

    /// Start configuring a bus.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    pub(crate) fn from_parts(engine: Arc<DispatchEngine>, runtime: Option<Handle>) -> Self {
        Self { engine, runtime }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register `listener` for events of type `E`. The bus owns the listener.
    pub fn subscribe<E, L>(
        &self,
        priority: Priority,
        ignore_cancelled: bool,
        listener: L,
    ) -> Subscription
    where
        E: Event,
        L: Listener<E>,
    {
        let registry = self.registry();
        let subscription =
            Subscription::strong::<E, L>(registry.next_id(), priority, ignore_cancelled, listener);
        registry.add(subscription.clone());
        subscription
    }

    /// Register a listener the caller keeps alive.
    ///
    /// Once every `Arc` to `listener` is dropped, it stops receiving events
    /// and the subscription is removed by the next post that reaches it.
    pub fn subscribe_weak<E, L>(
        &self,
        priority: Priority,
        ignore_cancelled: bool,
        listener: &Arc<L>,
    ) -> Subscription
    where
        E: Event,
        L: Listener<E>,
    {
        let registry = self.registry();
        let subscription =
            Subscription::weak::<E, L>(registry.next_id(), priority, ignore_cancelled, listener);
        registry.add(subscription.clone());
        subscription
    }

    /// Register a synchronous closure.
    pub fn subscribe_fn<E, F>(
        &self,
        priority: Priority,
        ignore_cancelled: bool,
        f: F,
    ) -> Subscription
    where
        E: Event,
        F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe::<E, _>(priority, ignore_cancelled, from_fn::<E, F>(f))
    }

    /// Register several listeners at once.
    ///
    /// ```rust,ignore
    /// let subs = bus.register(|r| {
    ///     r.strong(Priority::High, false, Audit);
    ///     r.weak(Priority::Monitor, true, &stats);
    /// });
    /// ```
    pub fn register<F>(&self, f: F) -> Vec<Subscription>
    where
        F: FnOnce(&mut Registrar<'_>),
    {
        let mut registrar = Registrar {
            bus: self,
            created: Vec::new(),
        };
        f(&mut registrar);
        registrar.created
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unregister(&self, subscription: &Subscription) -> bool {
        self.registry().remove(subscription)
    }

    // ========================================================================
    // Posting
    // ========================================================================

    /// Run the dispatch pass on the current task and wait for it.
    ///
    /// Suspending listeners suspend this call cooperatively. Dropping the
    /// returned future abandons the pass.
    pub async fn post_async<E: Event>(&self, event: E) -> PostResult<E> {
        self.engine.dispatch(event).await
    }

    /// Schedule the dispatch pass on the bus runtime.
    ///
    /// Without a runtime the pass runs inline and the returned handle is
    /// already complete.
    pub fn post<E: Event>(&self, event: E) -> PostHandle<E> {
        match &self.runtime {
            Some(runtime) => {
                let engine = Arc::clone(&self.engine);
                PostHandle::spawned(runtime.spawn(async move { engine.dispatch(event).await }))
            }
            None => PostHandle::ready(self.post_blocking(event)),
        }
    }

    /// Schedule the dispatch pass and return a completion handle.
    ///
    /// Without a runtime the pass runs inline before this returns.
    pub fn post_future<E: Event>(&self, event: E) -> PostFuture<E> {
        let (tx, rx) = oneshot::channel();
        let engine = Arc::clone(&self.engine);
        let pass = async move {
            let outcome = AssertUnwindSafe(engine.dispatch(event))
                .catch_unwind()
                .await
                .map_err(DispatchError::from_panic);
            // The receiver may already be gone; nobody is waiting then.
            let _ = tx.send(outcome);
        };

        match &self.runtime {
            Some(runtime) => {
                runtime.spawn(pass);
            }
            None => futures::executor::block_on(pass),
        }
        PostFuture::new(rx, self.runtime.clone())
    }

    /// Run the dispatch pass on the calling thread.
    ///
    /// Suspending listeners block the thread while they wait. Do not call
    /// from inside an async task.
    pub fn post_blocking<E: Event>(&self, event: E) -> PostResult<E> {
        futures::executor::block_on(self.engine.dispatch(event))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Whether supertype listeners receive subtype events.
    pub fn is_hierarchical(&self) -> bool {
        self.engine.is_hierarchical()
    }

    /// The handler receiving listener faults.
    pub fn exception_handler(&self) -> &Arc<dyn ExceptionHandler> {
        self.engine.exception_handler()
    }

    /// The subscription registry.
    pub fn registry(&self) -> &SubscriptionRegistry {
        self.engine.registry()
    }

    /// The runtime scheduled posts run on, if any.
    pub fn runtime(&self) -> Option<&Handle> {
        self.runtime.as_ref()
    }

    /// The dispatch engine.
    pub fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("engine", &self.engine)
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}

/// Batch registration helper passed to [`EventBus::register`].
pub struct Registrar<'a> {
    bus: &'a EventBus,
    created: Vec<Subscription>,
}

impl Registrar<'_> {
    /// Register an owned listener.
    pub fn strong<E, L>(
        &mut self,
        priority: Priority,
        ignore_cancelled: bool,
        listener: L,
    ) -> &mut Self
    where
        E: Event,
        L: Listener<E>,
    {
        let subscription = self.bus.subscribe::<E, L>(priority, ignore_cancelled, listener);
        self.created.push(subscription);
        self
    }

    /// Register a listener the caller keeps alive.
    pub fn weak<E, L>(
        &mut self,
        priority: Priority,
        ignore_cancelled: bool,
        listener: &Arc<L>,
    ) -> &mut Self
    where
        E: Event,
        L: Listener<E>,
    {
        let subscription = self.bus.subscribe_weak::<E, L>(priority, ignore_cancelled, listener);
        self.created.push(subscription);
        self
    }

    /// Register a synchronous closure.
    pub fn function<E, F>(
        &mut self,
        priority: Priority,
        ignore_cancelled: bool,
        f: F,
    ) -> &mut Self
    where
        E: Event,
        F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let subscription = self.bus.subscribe_fn::<E, F>(priority, ignore_cancelled, f);
        self.created.push(subscription);
        self
    }
}
