//! View factory seam
//!
//! The markup-loading collaborator sits behind [`ViewFactory`]; the runtime
//! only resolves view ids to handles. [`StaticViewFactory`] serves prebuilt
//! views from a map and backs the bootstrap and the test suites.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use tiller_core::ViewId;

use crate::view::{View, ViewError};

/// Resolves view ids to view handles
pub trait ViewFactory: Send + Sync {
    /// Resolve `id`, or `None` when no such view exists
    fn resolve(&self, id: &ViewId) -> Option<Arc<View>>;
}

/// A factory serving prebuilt views
pub struct StaticViewFactory {
    views: RwLock<HashMap<ViewId, Arc<View>>>,
}

impl StaticViewFactory {
    /// Create an empty factory
    pub fn new() -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
        }
    }

    /// Register a prebuilt view under its own id
    pub fn register(&self, view: Arc<View>) -> Result<(), ViewError> {
        let mut views = self.views.write();
        let id = view.id().clone();
        if views.contains_key(&id) {
            return Err(ViewError::DuplicateView(id));
        }
        views.insert(id, view);
        Ok(())
    }

    /// Number of registered views
    pub fn len(&self) -> usize {
        self.views.read().len()
    }

    /// Whether no view is registered
    pub fn is_empty(&self) -> bool {
        self.views.read().is_empty()
    }
}

impl Default for StaticViewFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewFactory for StaticViewFactory {
    fn resolve(&self, id: &ViewId) -> Option<Arc<View>> {
        self.views.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRef;
    use crate::window::WindowManager;

    #[test]
    fn test_register_and_resolve() {
        let windows = Arc::new(WindowManager::new());
        let factory = StaticViewFactory::new();
        let view = Arc::new(View::new("main", NodeRef::new("root"), windows));

        factory.register(Arc::clone(&view)).unwrap();
        assert!(Arc::ptr_eq(&factory.resolve(&"main".into()).unwrap(), &view));
        assert!(factory.resolve(&"other".into()).is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let windows = Arc::new(WindowManager::new());
        let factory = StaticViewFactory::new();
        let view = Arc::new(View::new("main", NodeRef::new("root"), Arc::clone(&windows)));
        let twin = Arc::new(View::new("main", NodeRef::new("root"), windows));

        factory.register(view).unwrap();
        assert!(matches!(
            factory.register(twin),
            Err(ViewError::DuplicateView(_))
        ));
    }
}
