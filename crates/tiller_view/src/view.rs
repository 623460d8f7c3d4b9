//! The view facade
//!
//! A view pairs a view id with a content tree and knows which window, if
//! any, currently hosts it. Each view is associated 1:1 with a component
//! instance; the component holds the back-reference, the view does not
//! point at its component.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use tiller_core::{AnchorId, ViewId, WindowId};

use crate::node::NodeRef;
use crate::window::WindowManager;

/// View and window errors
#[derive(Debug, Clone, Error)]
pub enum ViewError {
    /// Operation against a window id that is not open
    #[error("unknown window: {0}")]
    UnknownWindow(WindowId),

    /// A view id was registered twice with the same factory
    #[error("view '{0}' is already registered")]
    DuplicateView(ViewId),
}

/// Abstraction over a renderable content tree
pub struct View {
    id: ViewId,
    root: NodeRef,
    windows: Arc<WindowManager>,
    owner: RwLock<Option<WindowId>>,
}

impl View {
    /// Create a view over `root`, managed by `windows`
    pub fn new(id: impl Into<ViewId>, root: NodeRef, windows: Arc<WindowManager>) -> Self {
        Self {
            id: id.into(),
            root,
            windows,
            owner: RwLock::new(None),
        }
    }

    /// The view's id
    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Root of the content tree
    pub fn content_root(&self) -> NodeRef {
        self.root.clone()
    }

    /// Find the anchor `id` in this view's content tree
    pub fn lookup_anchor(&self, id: &AnchorId) -> Option<NodeRef> {
        self.root.find_anchor(id)
    }

    /// Display this view in an existing window
    pub fn show(&self, window: WindowId) -> Result<(), ViewError> {
        self.windows.host(window, self.id.clone())?;
        *self.owner.write() = Some(window);
        log::debug!("view '{}' shown in {}", self.id, window);
        Ok(())
    }

    /// Display this view in a freshly created window
    pub fn show_in_new_window(&self) -> WindowId {
        let window = self.windows.open_window();
        // the window was just created, hosting cannot fail
        let _ = self.windows.host(window, self.id.clone());
        *self.owner.write() = Some(window);
        log::debug!("view '{}' shown in new {}", self.id, window);
        window
    }

    /// The window currently hosting this view, if any
    ///
    /// Returns `None` once another view displaced this one from the window
    /// it was last shown in.
    pub fn owning_window(&self) -> Option<WindowId> {
        let owner = *self.owner.read();
        owner.filter(|window| self.windows.hosted_view(*window) == Some(self.id.clone()))
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("owner", &*self.owner.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRef;

    fn view(id: &str, windows: &Arc<WindowManager>) -> View {
        let root = NodeRef::new("root");
        root.add_child(NodeRef::with_anchor("content", "contentArea"));
        View::new(id, root, Arc::clone(windows))
    }

    #[test]
    fn test_show_in_new_window() {
        let windows = Arc::new(WindowManager::new());
        let view = view("main", &windows);

        assert!(view.owning_window().is_none());
        let window = view.show_in_new_window();
        assert_eq!(view.owning_window(), Some(window));
        assert_eq!(windows.hosted_view(window), Some(ViewId::new("main")));
    }

    #[test]
    fn test_show_in_existing_window() {
        let windows = Arc::new(WindowManager::new());
        let view = view("main", &windows);
        let window = windows.open_window();

        view.show(window).unwrap();
        assert_eq!(view.owning_window(), Some(window));
    }

    #[test]
    fn test_displaced_view_loses_its_window() {
        let windows = Arc::new(WindowManager::new());
        let first = view("first", &windows);
        let second = view("second", &windows);

        let window = first.show_in_new_window();
        second.show(window).unwrap();

        assert!(first.owning_window().is_none());
        assert_eq!(second.owning_window(), Some(window));
    }

    #[test]
    fn test_lookup_anchor() {
        let windows = Arc::new(WindowManager::new());
        let view = view("main", &windows);
        assert!(view.lookup_anchor(&"contentArea".into()).is_some());
        assert!(view.lookup_anchor(&"nope".into()).is_none());
    }
}
