//! Default bean container
//!
//! Definitions are kept in registration order; singleton instances are
//! cached per definition and constructed at most once. Every construction
//! runs on the UI dispatcher thread: the factory, container-level
//! post-processors and the component's own post-construct hook all complete
//! before the instance becomes visible to any caller.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use tiller_core::{BeanId, ComponentId, Component, Controller};
use tiller_dispatch::Dispatcher;
use tiller_enhance::{
    interceptor, EnhancedComponent, Enhancer, InterceptionTable, NavContext,
};
use tiller_view::{View, ViewFactory, WindowManager};

use crate::definition::{BeanContainer, BeanDefinition, ContainerError, SharedBean};

type PostProcessor = Arc<dyn Fn(&SharedBean) + Send + Sync>;

#[derive(Default)]
struct DefinitionSet {
    /// Definitions in registration order, drives type-based lookup
    order: Vec<Arc<BeanDefinition>>,
    by_id: HashMap<BeanId, Arc<BeanDefinition>>,
}

struct ContainerInner {
    dispatcher: Dispatcher,
    enhancer: Arc<dyn Enhancer>,
    views: Arc<dyn ViewFactory>,
    windows: Arc<WindowManager>,
    table: Arc<InterceptionTable>,
    definitions: RwLock<DefinitionSet>,
    singletons: RwLock<HashMap<BeanId, SharedBean>>,
    post_processors: RwLock<Vec<PostProcessor>>,
}

impl ContainerInner {
    fn definition(&self, id: &BeanId) -> Option<Arc<BeanDefinition>> {
        self.definitions.read().by_id.get(id).cloned()
    }

    fn get_by_definition(
        self: &Arc<Self>,
        definition: &Arc<BeanDefinition>,
    ) -> Result<SharedBean, ContainerError> {
        if definition.singleton {
            if let Some(bean) = self.singletons.read().get(&definition.id) {
                return Ok(Arc::clone(bean));
            }
        }
        let inner = Arc::clone(self);
        let definition_on_thread = Arc::clone(definition);
        self.dispatcher
            .invoke(move || inner.construct(&definition_on_thread))
            .map_err(|err| ContainerError::construction(&definition.id, err.to_string()))?
    }

    // Runs on the dispatcher thread only. The dispatcher serializes all
    // construction, so the cache re-check below closes the race between two
    // callers requesting the same singleton.
    fn construct(
        self: &Arc<Self>,
        definition: &Arc<BeanDefinition>,
    ) -> Result<SharedBean, ContainerError> {
        if definition.singleton {
            if let Some(bean) = self.singletons.read().get(&definition.id) {
                return Ok(Arc::clone(bean));
            }
        }
        log::debug!(
            "constructing bean '{}' ({})",
            definition.id,
            definition.type_name
        );
        let bean = (definition.factory())()?;

        let post_processors: Vec<PostProcessor> = self.post_processors.read().clone();
        for post_processor in &post_processors {
            post_processor(&bean);
        }
        if let Some(component) = bean.downcast_ref::<EnhancedComponent>() {
            component
                .post_construct()
                .map_err(|err| ContainerError::construction(&definition.id, err.to_string()))?;
        }

        if definition.singleton {
            self.singletons
                .write()
                .insert(definition.id.clone(), Arc::clone(&bean));
        }
        Ok(bean)
    }
}

/// The default [`BeanContainer`] implementation
#[derive(Clone)]
pub struct DefaultContainer {
    inner: Arc<ContainerInner>,
}

impl DefaultContainer {
    /// Create a container wired to its collaborators
    pub fn new(
        dispatcher: Dispatcher,
        enhancer: Arc<dyn Enhancer>,
        views: Arc<dyn ViewFactory>,
        windows: Arc<WindowManager>,
        table: Arc<InterceptionTable>,
    ) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                dispatcher,
                enhancer,
                views,
                windows,
                table,
                definitions: RwLock::new(DefinitionSet::default()),
                singletons: RwLock::new(HashMap::new()),
                post_processors: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Register a post-processor applied to every bean after its factory
    /// ran and before the component's own post-construct hook
    pub fn add_post_processor<F>(&self, post_processor: F)
    where
        F: Fn(&SharedBean) + Send + Sync + 'static,
    {
        self.inner
            .post_processors
            .write()
            .push(Arc::new(post_processor));
    }

    /// Register a controller and its paired view bean
    ///
    /// The controller bean is enhanced per the configured strategy; its
    /// factory constructs the instance, resolves the declared view into the
    /// back-reference slot and applies the nested views declared in the
    /// metadata. The view bean pulls the view back out of the constructed
    /// controller.
    pub fn add_controller_definition<C: Controller>(&self) -> Result<(), ContainerError> {
        let descriptor = C::descriptor();
        let class = self.inner.enhancer.enhance(&descriptor);
        let descriptor = Arc::clone(class.descriptor());
        let controller_bean: BeanId = descriptor.id.clone().into();
        let view_bean: BeanId = descriptor.view.clone().into();

        let controller_factory = {
            let weak = Arc::downgrade(&self.inner);
            let class = Arc::clone(&class);
            let descriptor = Arc::clone(&descriptor);
            let bean_id = controller_bean.clone();
            move || -> Result<SharedBean, ContainerError> {
                let inner = upgrade(&weak, &bean_id)?;
                let instance: Arc<dyn Component> = Arc::new(C::construct());
                let enhanced = class.instantiate(instance).ok_or_else(|| {
                    ContainerError::construction(&bean_id, "type mismatch during enhancement")
                })?;
                let view = inner
                    .views
                    .resolve(&descriptor.view)
                    .ok_or_else(|| ContainerError::UnresolvedView(descriptor.view.clone()))?;
                enhanced.attach_view(Arc::clone(&view));
                if !descriptor.nested.is_empty() {
                    let ctx = NavContext {
                        views: inner.views.as_ref(),
                        windows: &inner.windows,
                        table: &inner.table,
                    };
                    interceptor::attach_nested_views(
                        &descriptor,
                        Some(Arc::clone(&view)),
                        &descriptor.nested,
                        &ctx,
                    )
                    .map_err(|err| ContainerError::construction(&bean_id, err.to_string()))?;
                }
                Ok(Arc::new(enhanced) as SharedBean)
            }
        };
        self.add_definition(BeanDefinition::with_factory::<C, _>(
            controller_bean.clone(),
            descriptor.singleton,
            descriptor.lazy,
            controller_factory,
        ))?;

        let view_factory = {
            let weak = Arc::downgrade(&self.inner);
            let controller_bean = controller_bean.clone();
            let bean_id = view_bean.clone();
            move || -> Result<Arc<View>, ContainerError> {
                let inner = upgrade(&weak, &bean_id)?;
                let definition = inner.definition(&controller_bean).ok_or_else(|| {
                    ContainerError::construction(&bean_id, "controller definition vanished")
                })?;
                let bean = inner.get_by_definition(&definition)?;
                let enhanced = bean.downcast::<EnhancedComponent>().map_err(|_| {
                    ContainerError::construction(&bean_id, "controller bean is not enhanced")
                })?;
                enhanced.view().ok_or_else(|| {
                    ContainerError::construction(&bean_id, "controller has no view attached")
                })
            }
        };
        self.add_definition(BeanDefinition::new::<View, _>(
            view_bean,
            descriptor.singleton,
            descriptor.lazy,
            view_factory,
        ))
    }

    /// Construct every non-lazy definition, in registration order
    pub fn instantiate_eager(&self) -> Result<(), ContainerError> {
        let eager: Vec<Arc<BeanDefinition>> = self
            .inner
            .definitions
            .read()
            .order
            .iter()
            .filter(|definition| !definition.lazy)
            .cloned()
            .collect();
        for definition in eager {
            self.inner.get_by_definition(&definition)?;
        }
        Ok(())
    }

    /// Get a controller by its component id
    pub fn controller_by_id(
        &self,
        id: &ComponentId,
    ) -> Result<Option<Arc<EnhancedComponent>>, ContainerError> {
        Ok(self
            .get_by_id(&id.clone().into())?
            .and_then(|bean| bean.downcast::<EnhancedComponent>().ok()))
    }

    /// Get a controller by its declared type
    pub fn controller<C: Controller>(
        &self,
    ) -> Result<Option<Arc<EnhancedComponent>>, ContainerError> {
        self.controller_by_id(&C::descriptor().id)
    }

    /// Get a typed bean by id
    pub fn get<T: Send + Sync + 'static>(
        &self,
        id: &BeanId,
    ) -> Result<Option<Arc<T>>, ContainerError> {
        Ok(self
            .get_by_id(id)?
            .and_then(|bean| bean.downcast::<T>().ok()))
    }
}

fn upgrade(weak: &Weak<ContainerInner>, bean: &BeanId) -> Result<Arc<ContainerInner>, ContainerError> {
    weak.upgrade()
        .ok_or_else(|| ContainerError::construction(bean, "container was dropped"))
}

impl BeanContainer for DefaultContainer {
    fn add_definition(&self, definition: BeanDefinition) -> Result<(), ContainerError> {
        let mut definitions = self.inner.definitions.write();
        if definitions.by_id.contains_key(&definition.id) {
            return Err(ContainerError::DuplicateId(definition.id));
        }
        log::debug!(
            "registered bean '{}' ({})",
            definition.id,
            definition.type_name
        );
        let definition = Arc::new(definition);
        definitions
            .by_id
            .insert(definition.id.clone(), Arc::clone(&definition));
        definitions.order.push(definition);
        Ok(())
    }

    fn get_by_id(&self, id: &BeanId) -> Result<Option<SharedBean>, ContainerError> {
        match self.inner.definition(id) {
            Some(definition) => self.inner.get_by_definition(&definition).map(Some),
            None => Ok(None),
        }
    }

    fn get_by_type(&self, type_id: TypeId) -> Result<Option<SharedBean>, ContainerError> {
        let definition = self
            .inner
            .definitions
            .read()
            .order
            .iter()
            .find(|definition| definition.type_id == type_id)
            .cloned();
        match definition {
            Some(definition) => self.inner.get_by_definition(&definition).map(Some),
            None => Ok(None),
        }
    }

    fn contains(&self, id: &BeanId) -> bool {
        self.inner.definitions.read().by_id.contains_key(id)
    }

    fn definition_ids(&self) -> Vec<BeanId> {
        self.inner
            .definitions
            .read()
            .order
            .iter()
            .map(|definition| definition.id.clone())
            .collect()
    }
}
