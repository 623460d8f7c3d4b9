//! Content tree nodes
//!
//! A view's content is a tree of named nodes. Nodes carrying an anchor id
//! are eligible attachment targets for nested views.

use std::sync::Arc;

use parking_lot::RwLock;

use tiller_core::{AnchorId, AttachPosition};

struct Node {
    name: String,
    anchor: Option<AnchorId>,
    children: Vec<NodeRef>,
}

/// Shared handle to a node in a view's content tree
#[derive(Clone)]
pub struct NodeRef(Arc<RwLock<Node>>);

impl NodeRef {
    /// Create a plain node
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(Node {
            name: name.into(),
            anchor: None,
            children: Vec::new(),
        })))
    }

    /// Create a node that is an attachment anchor
    pub fn with_anchor(name: impl Into<String>, anchor: impl Into<AnchorId>) -> Self {
        Self(Arc::new(RwLock::new(Node {
            name: name.into(),
            anchor: Some(anchor.into()),
            children: Vec::new(),
        })))
    }

    /// The node's name
    pub fn name(&self) -> String {
        self.0.read().name.clone()
    }

    /// The node's anchor id, if it is an anchor
    pub fn anchor_id(&self) -> Option<AnchorId> {
        self.0.read().anchor.clone()
    }

    /// Append a child node
    pub fn add_child(&self, child: NodeRef) -> &Self {
        self.0.write().children.push(child);
        self
    }

    /// Graft a child at the given position
    ///
    /// An index past the end appends.
    pub fn attach_child(&self, child: NodeRef, position: AttachPosition) {
        let mut node = self.0.write();
        match position {
            AttachPosition::Append => node.children.push(child),
            AttachPosition::At(index) => {
                let index = index.min(node.children.len());
                node.children.insert(index, child);
            }
        }
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.0.read().children.len()
    }

    /// Snapshot of the direct children
    pub fn children(&self) -> Vec<NodeRef> {
        self.0.read().children.clone()
    }

    /// Depth-first search for the anchor `id`, including this node
    pub fn find_anchor(&self, id: &AnchorId) -> Option<NodeRef> {
        if self.0.read().anchor.as_ref() == Some(id) {
            return Some(self.clone());
        }
        let children = self.children();
        for child in children {
            if let Some(found) = child.find_anchor(id) {
                return Some(found);
            }
        }
        None
    }

    /// Whether two handles refer to the same node
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.0.read();
        f.debug_struct("Node")
            .field("name", &node.name)
            .field("anchor", &node.anchor)
            .field("children", &node.children.len())
            .finish()
    }
}
