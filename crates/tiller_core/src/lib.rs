//! # tiller_core - Core types for the Tiller runtime
//!
//! Ids, the component metadata model and the component traits shared by
//! every other Tiller crate.

pub mod component;
pub mod descriptor;
pub mod error;
pub mod id;

pub use component::{Component, Controller};
pub use descriptor::{
    ActionSpec, AttachPosition, ComponentDescriptor, NavigationDirective, NestedViewSpec,
};
pub use error::ComponentError;
pub use id::{ActionId, AnchorId, BeanId, ComponentId, ViewId, WindowId};

/// Prelude
pub mod prelude {
    pub use crate::component::{Component, Controller};
    pub use crate::descriptor::{
        ActionSpec, AttachPosition, ComponentDescriptor, NavigationDirective, NestedViewSpec,
    };
    pub use crate::error::ComponentError;
    pub use crate::id::{ActionId, AnchorId, BeanId, ComponentId, ViewId, WindowId};
}
