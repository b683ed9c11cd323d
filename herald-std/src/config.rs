//! Bus configuration and builder.

use crate::{
    bus::EventBus, engine::DispatchEngine, handlers::LogExceptionHandler,
    registry::SubscriptionRegistry,
};
use herald_core::{BuildError, ExceptionHandler};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Plain configuration values for an [`EventBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// Deliver events to listeners registered for their supertypes too.
    pub hierarchical: bool,
    /// Fail [`EventBusBuilder::build`] when no tokio runtime is available.
    pub require_runtime: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            hierarchical: true,
            require_runtime: false,
        }
    }
}

/// Builder for an [`EventBus`].
///
/// # Example
///
/// ```rust,ignore
/// let bus = EventBusBuilder::new()
///     .hierarchical(false)
///     .exception_handler(IgnoreExceptionHandler)
///     .build()?;
/// ```
#[derive(Default)]
pub struct EventBusBuilder {
    config: BusConfig,
    exception_handler: Option<Arc<dyn ExceptionHandler>>,
    runtime: Option<Handle>,
}

impl EventBusBuilder {
    /// A builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder starting from `config`.
    pub fn from_config(config: BusConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Toggle hierarchical matching. Defaults to `true`.
    pub fn hierarchical(mut self, hierarchical: bool) -> Self {
        self.config.hierarchical = hierarchical;
        self
    }

    /// Set the handler receiving listener faults.
    /// Defaults to [`LogExceptionHandler`].
    pub fn exception_handler<H: ExceptionHandler>(mut self, handler: H) -> Self {
        self.exception_handler = Some(Arc::new(handler));
        self
    }

    /// Run scheduled posts on `runtime`.
    ///
    /// Without this, `build` captures the runtime it is called from, if any.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Make a missing runtime a build error instead of falling back to
    /// inline dispatch.
    pub fn require_runtime(mut self, require: bool) -> Self {
        self.config.require_runtime = require;
        self
    }

    /// The configuration assembled so far.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Build the bus.
    pub fn build(mut self) -> Result<EventBus, BuildError> {
        let runtime = self.runtime.take().or_else(|| Handle::try_current().ok());
        if runtime.is_none() && self.config.require_runtime {
            return Err(BuildError::MissingRuntime);
        }
        Ok(self.assemble(runtime))
    }

    pub(crate) fn assemble(self, runtime: Option<Handle>) -> EventBus {
        let exception_handler = self
            .exception_handler
            .unwrap_or_else(|| Arc::new(LogExceptionHandler));
        let engine = DispatchEngine::new(
            Arc::new(SubscriptionRegistry::new()),
            exception_handler,
            self.config.hierarchical,
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(
            hierarchical = self.config.hierarchical,
            runtime = runtime.is_some(),
            "Event bus built"
        );

        EventBus::from_parts(Arc::new(engine), runtime)
    }
}

impl std::fmt::Debug for EventBusBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBusBuilder")
            .field("config", &self.config)
            .field("custom_handler", &self.exception_handler.is_some())
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}
