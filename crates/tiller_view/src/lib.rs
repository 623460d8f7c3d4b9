//! # tiller_view - View facade and window management
//!
//! Views abstract over a renderable content tree; markup loading and the
//! concrete rendering primitives stay external. The runtime only needs
//! named anchor nodes, child grafting and the window a view is hosted in.

pub mod factory;
pub mod node;
pub mod view;
pub mod window;

pub use factory::{StaticViewFactory, ViewFactory};
pub use node::NodeRef;
pub use view::{View, ViewError};
pub use window::WindowManager;
