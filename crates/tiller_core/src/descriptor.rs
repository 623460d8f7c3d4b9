//! Component metadata model
//!
//! Descriptors capture the metadata a component declares: its id, the view
//! resource it drives, nested views attached at construction time and the
//! actions whose completion triggers navigation.

use std::any::TypeId;

use serde::{Deserialize, Serialize};

use crate::id::{ActionId, AnchorId, ComponentId, ViewId};

/// Where a nested view is grafted into the anchor's children list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachPosition {
    /// Append after the existing children
    #[default]
    Append,
    /// Insert at the given index, shifting later children
    At(usize),
}

/// Declaration of a view nested beneath an anchor of another view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedViewSpec {
    /// The view to attach
    pub view: ViewId,
    /// Anchor node in the hosting view's content tree
    pub anchor: AnchorId,
    /// Position within the anchor's children
    #[serde(default)]
    pub position: AttachPosition,
}

impl NestedViewSpec {
    /// Create a spec attaching `view` beneath `anchor`, appended
    pub fn new(view: impl Into<ViewId>, anchor: impl Into<AnchorId>) -> Self {
        Self {
            view: view.into(),
            anchor: anchor.into(),
            position: AttachPosition::Append,
        }
    }

    /// Set the attachment position
    pub fn at(mut self, index: usize) -> Self {
        self.position = AttachPosition::At(index);
        self
    }
}

/// Navigation performed after an intercepted action completes successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationDirective {
    /// Show a single view, in the current window or a fresh one
    ShowView {
        /// The view to display
        view: ViewId,
        /// Display in a freshly created window instead of the current one
        new_window: bool,
    },
    /// Attach one or more views into the invoking component's own view
    AttachNestedViews(Vec<NestedViewSpec>),
}

/// An interceptable action declared by a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// The action this spec applies to
    pub action: ActionId,
    /// Navigation to perform once the action succeeds
    pub directive: NavigationDirective,
}

impl ActionSpec {
    /// Declare an action that shows `view` after completion
    pub fn show_view(action: impl Into<ActionId>, view: impl Into<ViewId>) -> Self {
        Self {
            action: action.into(),
            directive: NavigationDirective::ShowView {
                view: view.into(),
                new_window: false,
            },
        }
    }

    /// Declare an action that shows `view` in a new window after completion
    pub fn show_in_new_window(action: impl Into<ActionId>, view: impl Into<ViewId>) -> Self {
        Self {
            action: action.into(),
            directive: NavigationDirective::ShowView {
                view: view.into(),
                new_window: true,
            },
        }
    }

    /// Declare an action that attaches nested views after completion
    pub fn attach_nested(action: impl Into<ActionId>, specs: Vec<NestedViewSpec>) -> Self {
        Self {
            action: action.into(),
            directive: NavigationDirective::AttachNestedViews(specs),
        }
    }
}

/// Metadata extracted from a component's declaration
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// Unique component id
    pub id: ComponentId,
    /// Concrete component type
    pub type_id: TypeId,
    /// Human-readable type name
    pub type_name: &'static str,
    /// Whether the container caches a single instance
    pub singleton: bool,
    /// Whether instantiation is deferred until first lookup
    pub lazy: bool,
    /// The view resource driven by this component
    pub view: ViewId,
    /// Views attached into this component's view at construction time
    pub nested: Vec<NestedViewSpec>,
    /// Actions routed through the interception protocol
    pub actions: Vec<ActionSpec>,
}

impl ComponentDescriptor {
    /// Create a descriptor for a concrete component type
    ///
    /// Components are singleton and lazily instantiated by default.
    pub fn of<C: 'static>(id: impl Into<ComponentId>, view: impl Into<ViewId>) -> Self {
        Self {
            id: id.into(),
            type_id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
            singleton: true,
            lazy: true,
            view: view.into(),
            nested: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Set the singleton flag
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// Set the lazy-instantiation flag
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Declare a nested view attached at construction time
    pub fn with_nested(mut self, spec: NestedViewSpec) -> Self {
        self.nested.push(spec);
        self
    }

    /// Declare an interceptable action
    pub fn with_action(mut self, spec: ActionSpec) -> Self {
        self.actions.push(spec);
        self
    }

    /// Look up the navigation directive declared for `action`
    pub fn directive_for(&self, action: &ActionId) -> Option<&NavigationDirective> {
        self.actions
            .iter()
            .find(|spec| &spec.action == action)
            .map(|spec| &spec.directive)
    }
}
