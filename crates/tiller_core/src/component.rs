//! Component traits
//!
//! `Component` is the object-safe surface the runtime drives; `Controller`
//! is the declared-metadata entry point consumed by the container.

use std::any::Any;

use crate::descriptor::ComponentDescriptor;
use crate::error::ComponentError;
use crate::id::ActionId;

/// A controller-like unit managed by the container
///
/// `on_action` carries the original business behavior of an action. The
/// interception layer calls it unchanged and only runs the navigation
/// protocol once it returns `Ok`.
pub trait Component: Any + Send + Sync {
    /// Run the business behavior of `action`
    fn on_action(&self, action: &ActionId) -> Result<(), ComponentError>;

    /// Hook invoked synchronously after construction, before the instance
    /// becomes visible to any other caller
    fn post_construct(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Type erasure for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// A component with declared metadata and a no-argument constructor
pub trait Controller: Component {
    /// The metadata this component declares
    fn descriptor() -> ComponentDescriptor
    where
        Self: Sized;

    /// Construct a fresh instance
    fn construct() -> Self
    where
        Self: Sized;
}
