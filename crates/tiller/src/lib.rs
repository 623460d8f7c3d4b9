//! # tiller - Runtime substrate for declarative UI controllers
//!
//! Discovers nothing by itself: the metadata-scanning collaborator feeds
//! controller types into the builder, markup loading sits behind the view
//! factory seam. What Tiller owns is everything in between — bean
//! construction confined to the UI dispatcher thread, interception of
//! declared actions with post-invocation navigation, nested view
//! attachment, a priority-ordered event bus and debounced change listeners.
//!
//! The [`Tiller`] struct is an explicit context handle passed to entry
//! points. Only the outermost bootstrap layer should pin one process-wide
//! default via [`Tiller::install_global`].

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;

pub mod builder;
pub mod config;

pub use builder::TillerBuilder;
pub use config::{ConfigError, TillerConfig};

pub use tiller_container::{
    BeanContainer, BeanDefinition, ContainerError, DefaultContainer, SharedBean,
};
pub use tiller_core::prelude::*;
pub use tiller_dispatch::{DebouncedAccumulator, DebouncedListener, DispatchError, Dispatcher};
pub use tiller_enhance::{
    dispatch_action, ActionOutcome, EnhancedComponent, EnhancementStrategy, Enhancer,
    InterceptionError, InterceptionTable, NavContext, NavigationError,
};
pub use tiller_event::{Event, EventBus, SubscriberError};
pub use tiller_view::{NodeRef, StaticViewFactory, View, ViewError, ViewFactory, WindowManager};

static GLOBAL: OnceLock<Arc<Tiller>> = OnceLock::new();

/// Errors surfaced by the context facade
#[derive(Debug, Error)]
pub enum TillerError {
    /// `fire` named a component id nobody registered
    #[error("no component registered under id '{0}'")]
    UnknownComponent(ComponentId),

    /// Bean lookup or construction failed
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// An intercepted invocation failed
    #[error(transparent)]
    Interception(#[from] InterceptionError),

    /// The dispatcher is no longer running
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// The assembled runtime context
pub struct Tiller {
    config: TillerConfig,
    dispatcher: Dispatcher,
    container: DefaultContainer,
    events: Arc<EventBus>,
    views: Arc<dyn ViewFactory>,
    windows: Arc<WindowManager>,
    table: Arc<InterceptionTable>,
    enhancer: Arc<dyn Enhancer>,
}

impl Tiller {
    /// Start building a context
    pub fn builder() -> TillerBuilder {
        TillerBuilder::new()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        config: TillerConfig,
        dispatcher: Dispatcher,
        container: DefaultContainer,
        events: Arc<EventBus>,
        views: Arc<dyn ViewFactory>,
        windows: Arc<WindowManager>,
        table: Arc<InterceptionTable>,
        enhancer: Arc<dyn Enhancer>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            container,
            events,
            views,
            windows,
            table,
            enhancer,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &TillerConfig {
        &self.config
    }

    /// The bean container
    pub fn container(&self) -> &DefaultContainer {
        &self.container
    }

    /// The event bus
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// The UI dispatcher
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The window manager
    pub fn windows(&self) -> &Arc<WindowManager> {
        &self.windows
    }

    /// The configured enhancer
    pub fn enhancer(&self) -> &Arc<dyn Enhancer> {
        &self.enhancer
    }

    /// Resolve a view by id
    pub fn view(&self, id: &ViewId) -> Option<Arc<View>> {
        self.views.resolve(id)
    }

    /// Get a controller by component id
    pub fn controller_by_id(
        &self,
        id: &ComponentId,
    ) -> Result<Option<Arc<EnhancedComponent>>, ContainerError> {
        self.container.controller_by_id(id)
    }

    /// Get a controller by its declared type
    pub fn controller<C: Controller>(
        &self,
    ) -> Result<Option<Arc<EnhancedComponent>>, ContainerError> {
        self.container.controller::<C>()
    }

    /// Invoke an intercepted action on a registered controller
    ///
    /// The invocation (business behavior plus any navigation) runs on the
    /// dispatcher thread; the calling thread blocks until it completed.
    pub fn fire(
        &self,
        id: &ComponentId,
        action: &ActionId,
    ) -> Result<ActionOutcome, TillerError> {
        let controller = self
            .controller_by_id(id)?
            .ok_or_else(|| TillerError::UnknownComponent(id.clone()))?;
        let views = Arc::clone(&self.views);
        let windows = Arc::clone(&self.windows);
        let table = Arc::clone(&self.table);
        let action = action.clone();
        let outcome = self.dispatcher.invoke(move || {
            let ctx = NavContext {
                views: views.as_ref(),
                windows: &windows,
                table: &table,
            };
            controller.invoke(&action, &ctx)
        })??;
        Ok(outcome)
    }

    /// Invoke an action on an arbitrary component instance
    ///
    /// This is the call site that never changes: under the
    /// global-registration strategy the instance is intercepted no matter
    /// where it came from, under wrapping only the original behavior runs.
    pub fn fire_on(
        &self,
        component: Arc<dyn Component>,
        action: &ActionId,
    ) -> Result<ActionOutcome, TillerError> {
        let views = Arc::clone(&self.views);
        let windows = Arc::clone(&self.windows);
        let table = Arc::clone(&self.table);
        let action = action.clone();
        let outcome = self.dispatcher.invoke(move || {
            let ctx = NavContext {
                views: views.as_ref(),
                windows: &windows,
                table: &table,
            };
            dispatch_action(component.as_ref(), &action, &ctx)
        })??;
        Ok(outcome)
    }

    /// Create a debounced listener using the configured default delay
    pub fn debounced<T, F>(&self, delay: Option<Duration>, callback: F) -> DebouncedListener<T>
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let delay =
            delay.unwrap_or_else(|| Duration::from_millis(self.config.debounce_delay_ms));
        DebouncedListener::new(&self.dispatcher, delay, callback)
    }

    /// Stop the dispatcher after draining queued work
    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }

    /// Pin a process-wide default context; fails after the first call
    pub fn install_global(tiller: Arc<Tiller>) -> Result<(), Arc<Tiller>> {
        GLOBAL.set(tiller)
    }

    /// The process-wide default context, if one was installed
    pub fn global() -> Option<&'static Arc<Tiller>> {
        GLOBAL.get()
    }
}

impl std::fmt::Debug for Tiller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tiller")
            .field("strategy", &self.config.strategy)
            .field("beans", &self.container.definition_ids().len())
            .finish()
    }
}
