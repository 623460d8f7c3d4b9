//! # tiller_container - Bean container
//!
//! Construction, caching and lifecycle of managed components. Bean
//! construction is confined to the UI dispatcher thread: callers on other
//! threads block until the factory and post-construction hooks complete,
//! and because the dispatcher serializes all work a singleton can never be
//! constructed twice.

pub mod container;
pub mod definition;

pub use container::DefaultContainer;
pub use definition::{
    BeanContainer, BeanDefinition, BeanFactory, ContainerError, SharedBean,
};
