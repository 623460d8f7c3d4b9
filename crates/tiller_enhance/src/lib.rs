//! # tiller_enhance - Interception layer
//!
//! Produces intercepting variants of component types. Two interchangeable
//! strategies sit behind one [`Enhancer`] capability: global registration
//! intercepts any instance routed through the common dispatch entry point,
//! wrapping intercepts the instances the container creates. Either way the
//! original action behavior runs unchanged; only a successful completion
//! triggers the post-invocation navigation protocol.

pub mod enhanced;
pub mod enhancer;
pub mod interceptor;

pub use enhanced::{EnhancedClass, EnhancedComponent};
pub use enhancer::{
    EnhancementStrategy, Enhancer, GlobalEnhancer, InterceptionTable, WrappingEnhancer,
};
pub use interceptor::{
    dispatch_action, ActionOutcome, InterceptionError, NavContext, NavigationError,
};
