//! Enhancement strategies
//!
//! Enhancing a component type yields an [`EnhancedClass`] artifact, cached
//! by type identity; re-enhancing returns the identical artifact. The
//! global-registration strategy additionally publishes the type's metadata
//! into an interception table so that any instance, however obtained, is
//! intercepted when routed through `dispatch_action`.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use tiller_core::ComponentDescriptor;

use crate::enhanced::EnhancedClass;

/// How component types gain interception behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementStrategy {
    /// Register every marked type process-visibly; any instance routed
    /// through the dispatch entry point is intercepted
    GlobalRegistration,
    /// Wrap instances at construction time; only container-created
    /// instances are intercepted
    #[default]
    Wrapping,
}

/// Table of component types whose actions are intercepted globally
pub struct InterceptionTable {
    entries: RwLock<HashMap<TypeId, Arc<ComponentDescriptor>>>,
}

impl InterceptionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Record a component type for global interception
    pub fn register(&self, descriptor: Arc<ComponentDescriptor>) {
        self.entries.write().insert(descriptor.type_id, descriptor);
    }

    /// Look up the interception metadata of a concrete type
    pub fn lookup(&self, type_id: TypeId) -> Option<Arc<ComponentDescriptor>> {
        self.entries.read().get(&type_id).cloned()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for InterceptionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability producing intercepting variants of component types
pub trait Enhancer: Send + Sync {
    /// The strategy this enhancer implements
    fn strategy(&self) -> EnhancementStrategy;

    /// Activate the strategy; must run before component registration and is
    /// idempotent
    fn install(&self);

    /// Whether global interception is active
    fn installed(&self) -> bool;

    /// Produce the intercepting artifact for a component type
    ///
    /// Cached by type identity: enhancing an already-enhanced type returns
    /// the same artifact.
    fn enhance(&self, descriptor: &ComponentDescriptor) -> Arc<EnhancedClass>;
}

struct ClassCache {
    classes: RwLock<HashMap<TypeId, Arc<EnhancedClass>>>,
}

impl ClassCache {
    fn new() -> Self {
        Self {
            classes: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_insert(&self, descriptor: &ComponentDescriptor) -> Arc<EnhancedClass> {
        if let Some(class) = self.classes.read().get(&descriptor.type_id) {
            return Arc::clone(class);
        }
        let mut classes = self.classes.write();
        Arc::clone(
            classes
                .entry(descriptor.type_id)
                .or_insert_with(|| Arc::new(EnhancedClass::new(descriptor.clone()))),
        )
    }
}

/// Enhancer wrapping instances at construction time
pub struct WrappingEnhancer {
    cache: ClassCache,
}

impl WrappingEnhancer {
    /// Create a wrapping enhancer
    pub fn new() -> Self {
        Self {
            cache: ClassCache::new(),
        }
    }
}

impl Default for WrappingEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl Enhancer for WrappingEnhancer {
    fn strategy(&self) -> EnhancementStrategy {
        EnhancementStrategy::Wrapping
    }

    fn install(&self) {
        // nothing to activate; wrappers intercept by construction
    }

    fn installed(&self) -> bool {
        false
    }

    fn enhance(&self, descriptor: &ComponentDescriptor) -> Arc<EnhancedClass> {
        self.cache.get_or_insert(descriptor)
    }
}

/// Enhancer registering every enhanced type in an interception table
pub struct GlobalEnhancer {
    table: Arc<InterceptionTable>,
    installed: AtomicBool,
    cache: ClassCache,
}

impl GlobalEnhancer {
    /// Create a global enhancer publishing into `table`
    pub fn new(table: Arc<InterceptionTable>) -> Self {
        Self {
            table,
            installed: AtomicBool::new(false),
            cache: ClassCache::new(),
        }
    }

    /// The table this enhancer publishes into
    pub fn table(&self) -> &Arc<InterceptionTable> {
        &self.table
    }
}

impl Enhancer for GlobalEnhancer {
    fn strategy(&self) -> EnhancementStrategy {
        EnhancementStrategy::GlobalRegistration
    }

    fn install(&self) {
        if !self.installed.swap(true, Ordering::SeqCst) {
            log::info!("global interception installed");
        }
    }

    fn installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn enhance(&self, descriptor: &ComponentDescriptor) -> Arc<EnhancedClass> {
        let class = self.cache.get_or_insert(descriptor);
        if self.installed() {
            self.table.register(Arc::clone(class.descriptor()));
            log::debug!(
                "registered '{}' ({}) for global interception",
                descriptor.id,
                descriptor.type_name
            );
        }
        class
    }
}
