//! Bootstrap builder
//!
//! Wires dispatcher, enhancer, view factory, container and event bus into
//! one [`Tiller`](crate::Tiller) context. Controller registrations are
//! collected first and applied against the container once the enhancement
//! strategy is installed, then non-lazy beans are instantiated.

use std::sync::Arc;

use tiller_container::{BeanContainer, ContainerError, DefaultContainer, SharedBean};
use tiller_core::Controller;
use tiller_dispatch::Dispatcher;
use tiller_enhance::{
    EnhancementStrategy, Enhancer, GlobalEnhancer, InterceptionTable, WrappingEnhancer,
};
use tiller_event::EventBus;
use tiller_view::{StaticViewFactory, ViewFactory, WindowManager};

use crate::config::TillerConfig;
use crate::Tiller;

type Registration = Box<dyn FnOnce(&DefaultContainer) -> Result<(), ContainerError>>;

/// Builds a [`Tiller`] context
pub struct TillerBuilder {
    config: TillerConfig,
    dispatcher: Option<Dispatcher>,
    views: Option<Arc<dyn ViewFactory>>,
    windows: Option<Arc<WindowManager>>,
    registrations: Vec<Registration>,
    post_processors: Vec<Arc<dyn Fn(&SharedBean) + Send + Sync>>,
}

impl TillerBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: TillerConfig::default(),
            dispatcher: None,
            views: None,
            windows: None,
            registrations: Vec::new(),
            post_processors: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: TillerConfig) -> Self {
        self.config = config;
        self
    }

    /// Select the enhancement strategy
    pub fn strategy(mut self, strategy: EnhancementStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Use an existing dispatcher instead of spawning one
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Install the view factory collaborator
    pub fn view_factory(mut self, views: Arc<dyn ViewFactory>) -> Self {
        self.views = Some(views);
        self
    }

    /// Share a window manager with the view factory collaborator
    ///
    /// Views navigate through the manager they were built against, so a
    /// custom view factory and the context must agree on one.
    pub fn window_manager(mut self, windows: Arc<WindowManager>) -> Self {
        self.windows = Some(windows);
        self
    }

    /// Register a controller type
    pub fn controller<C: Controller>(mut self) -> Self {
        self.registrations
            .push(Box::new(|container| container.add_controller_definition::<C>()));
        self
    }

    /// Register a container-level post-processor
    pub fn post_processor<F>(mut self, post_processor: F) -> Self
    where
        F: Fn(&SharedBean) + Send + Sync + 'static,
    {
        self.post_processors.push(Arc::new(post_processor));
        self
    }

    /// Assemble the context
    ///
    /// Installs the enhancement strategy, registers every controller and,
    /// unless configured otherwise, instantiates all non-lazy beans.
    pub fn build(self) -> Result<Tiller, ContainerError> {
        let dispatcher = self.dispatcher.unwrap_or_else(Dispatcher::spawn);
        let windows = self
            .windows
            .unwrap_or_else(|| Arc::new(WindowManager::new()));
        let table = Arc::new(InterceptionTable::new());
        let enhancer: Arc<dyn Enhancer> = match self.config.strategy {
            EnhancementStrategy::GlobalRegistration => {
                Arc::new(GlobalEnhancer::new(Arc::clone(&table)))
            }
            EnhancementStrategy::Wrapping => Arc::new(WrappingEnhancer::new()),
        };
        enhancer.install();

        let views = self
            .views
            .unwrap_or_else(|| Arc::new(StaticViewFactory::new()));
        let container = DefaultContainer::new(
            dispatcher.clone(),
            Arc::clone(&enhancer),
            Arc::clone(&views),
            Arc::clone(&windows),
            Arc::clone(&table),
        );
        for post_processor in self.post_processors {
            container.add_post_processor(move |bean| post_processor(bean));
        }
        for registration in self.registrations {
            registration(&container)?;
        }
        log::info!(
            "tiller bootstrapped with strategy {:?}, {} bean definition(s)",
            self.config.strategy,
            container.definition_ids().len()
        );

        let tiller = Tiller::assemble(
            self.config,
            dispatcher,
            container,
            Arc::new(EventBus::new()),
            views,
            windows,
            table,
            enhancer,
        );
        if tiller.config().eager_init {
            tiller.container().instantiate_eager()?;
        }
        Ok(tiller)
    }
}

impl Default for TillerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
