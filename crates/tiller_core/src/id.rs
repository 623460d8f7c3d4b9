//! Identifier newtypes used across the runtime

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new id
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Get the id as a string slice
            pub fn name(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a managed component (controller)
    ComponentId
);

string_id!(
    /// Identifier of a bean definition inside the container
    BeanId
);

string_id!(
    /// Identifier of a view resource
    ViewId
);

string_id!(
    /// Identifier of an anchor node inside a view's content tree
    AnchorId
);

string_id!(
    /// Identifier of an interceptable action on a component
    ActionId
);

impl From<ComponentId> for BeanId {
    fn from(id: ComponentId) -> Self {
        Self::new(id.0)
    }
}

impl From<ViewId> for BeanId {
    fn from(id: ViewId) -> Self {
        Self::new(id.0)
    }
}

/// Identifier of a window managed by the window manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    /// Create a window id from its raw value
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_ids() {
        let id = ComponentId::new("main-controller");
        assert_eq!(id.name(), "main-controller");
        assert_eq!(id.to_string(), "main-controller");
        assert_eq!(id, ComponentId::from("main-controller"));
    }

    #[test]
    fn test_bean_id_conversions() {
        let component = ComponentId::new("details");
        let view = ViewId::new("detailsView");
        assert_eq!(BeanId::from(component).name(), "details");
        assert_eq!(BeanId::from(view).name(), "detailsView");
    }

    #[test]
    fn test_window_id() {
        let id = WindowId::from_raw(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(id.to_string(), "window-7");
    }

    #[test]
    fn test_id_serde_roundtrip() {
        let id = ViewId::new("mainView");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"mainView\"");
        let back: ViewId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
