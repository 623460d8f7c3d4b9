//! Enhanced components
//!
//! An [`EnhancedClass`] is the per-type interception artifact; instantiating
//! it wraps a component instance into an [`EnhancedComponent`] that routes
//! action invocations through the interception protocol. The wrapper holds
//! the single back-reference slot to the component's owning view; ownership
//! flows the other way, the view never points at its component.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;

use tiller_core::{ActionId, Component, ComponentDescriptor, ComponentError};
use tiller_view::View;

use crate::interceptor::{self, ActionOutcome, InterceptionError, NavContext};

/// Interception artifact synthesized once per component type
pub struct EnhancedClass {
    descriptor: Arc<ComponentDescriptor>,
}

impl EnhancedClass {
    /// Create the artifact for `descriptor`
    pub fn new(descriptor: ComponentDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
        }
    }

    /// The component metadata this artifact intercepts for
    pub fn descriptor(&self) -> &Arc<ComponentDescriptor> {
        &self.descriptor
    }

    /// Wrap a freshly constructed instance of the enhanced type
    ///
    /// Returns `None` when `inner` is not an instance of the type this
    /// artifact was synthesized for.
    pub fn instantiate(&self, inner: Arc<dyn Component>) -> Option<EnhancedComponent> {
        if inner.as_ref().as_any().type_id() != self.descriptor.type_id {
            return None;
        }
        Some(EnhancedComponent {
            inner,
            descriptor: Arc::clone(&self.descriptor),
            view: RwLock::new(None),
        })
    }
}

/// A component instance augmented with action interception
pub struct EnhancedComponent {
    inner: Arc<dyn Component>,
    descriptor: Arc<ComponentDescriptor>,
    /// Back-reference to the owning view, set during construction
    view: RwLock<Option<Arc<View>>>,
}

impl EnhancedComponent {
    /// The wrapped instance
    pub fn inner(&self) -> &Arc<dyn Component> {
        &self.inner
    }

    /// The component's declared metadata
    pub fn descriptor(&self) -> &Arc<ComponentDescriptor> {
        &self.descriptor
    }

    /// Downcast the wrapped instance to its concrete type
    pub fn downcast<C: Component>(&self) -> Option<&C> {
        self.inner.as_ref().as_any().downcast_ref::<C>()
    }

    /// Fill the back-reference slot to the owning view
    pub fn attach_view(&self, view: Arc<View>) {
        *self.view.write() = Some(view);
    }

    /// The owning view, if the slot has been filled
    pub fn view(&self) -> Option<Arc<View>> {
        self.view.read().clone()
    }

    /// Invoke an action through the interception protocol
    ///
    /// The original behavior runs unchanged; only when it completes without
    /// error does the declared navigation run. On failure no navigation of
    /// any kind is attempted.
    pub fn invoke(
        &self,
        action: &ActionId,
        ctx: &NavContext<'_>,
    ) -> Result<ActionOutcome, InterceptionError> {
        self.inner.on_action(action)?;
        let directive = match self.descriptor.directive_for(action) {
            Some(directive) => directive,
            None => return Ok(ActionOutcome::NoNavigation),
        };
        let current = self
            .view()
            .or_else(|| ctx.views.resolve(&self.descriptor.view));
        interceptor::apply_directive(&self.descriptor, current, directive, ctx)
            .map_err(InterceptionError::from)
    }
}

impl Component for EnhancedComponent {
    fn on_action(&self, action: &ActionId) -> Result<(), ComponentError> {
        self.inner.on_action(action)
    }

    fn post_construct(&self) -> Result<(), ComponentError> {
        self.inner.post_construct()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for EnhancedComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancedComponent")
            .field("id", &self.descriptor.id)
            .field("type", &self.descriptor.type_name)
            .field("view_attached", &self.view.read().is_some())
            .finish()
    }
}
