//! Bean definitions and the container facade
//!
//! A definition carries the id, declared type, lifecycle flags and the
//! instantiation factory of one bean. The facade is the surface consumed by
//! the metadata-scanning collaborator; alternate container backends are
//! drop-in implementations of the same trait.

use std::any::{Any, TypeId};
use std::sync::Arc;

use thiserror::Error;

use tiller_core::{BeanId, ViewId};

/// A cached or freshly constructed bean instance
pub type SharedBean = Arc<dyn Any + Send + Sync>;

/// Instantiation closure of a bean definition
pub type BeanFactory = Arc<dyn Fn() -> Result<SharedBean, ContainerError> + Send + Sync>;

/// Container errors
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    /// A bean id was registered twice
    #[error("bean id '{0}' is already registered")]
    DuplicateId(BeanId),

    /// A factory or post-construction hook failed; propagated to the caller
    /// that requested the bean
    #[error("construction of bean '{bean}' failed: {message}")]
    Construction {
        /// The bean under construction
        bean: BeanId,
        /// What went wrong
        message: String,
    },

    /// A controller's declared view resource could not be resolved
    #[error("view '{0}' could not be resolved during controller construction")]
    UnresolvedView(ViewId),
}

impl ContainerError {
    /// Convenience constructor for a construction failure
    pub fn construction(bean: &BeanId, message: impl Into<String>) -> Self {
        Self::Construction {
            bean: bean.clone(),
            message: message.into(),
        }
    }
}

/// Definition of a single bean
#[derive(Clone)]
pub struct BeanDefinition {
    /// Unique bean id
    pub id: BeanId,
    /// Declared bean type, used for type-based lookup
    pub type_id: TypeId,
    /// Human-readable type name
    pub type_name: &'static str,
    /// Whether the container caches a single instance
    pub singleton: bool,
    /// Whether instantiation is deferred until first lookup
    pub lazy: bool,
    factory: BeanFactory,
}

impl BeanDefinition {
    /// Define a bean whose factory produces the declared type directly
    pub fn new<T, F>(id: impl Into<BeanId>, singleton: bool, lazy: bool, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            singleton,
            lazy,
            factory: Arc::new(move || factory().map(|bean| bean as SharedBean)),
        }
    }

    /// Define a bean declared as type `T` with a type-erased factory
    ///
    /// Used where the produced instance wraps the declared type, e.g. an
    /// enhanced controller registered under its original component type.
    pub fn with_factory<T, F>(id: impl Into<BeanId>, singleton: bool, lazy: bool, factory: F) -> Self
    where
        T: 'static,
        F: Fn() -> Result<SharedBean, ContainerError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            singleton,
            lazy,
            factory: Arc::new(factory),
        }
    }

    /// The instantiation factory
    pub fn factory(&self) -> &BeanFactory {
        &self.factory
    }
}

impl std::fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("singleton", &self.singleton)
            .field("lazy", &self.lazy)
            .finish()
    }
}

/// Facade of a bean container
///
/// `get_by_id`/`get_by_type` return `Ok(None)` for unknown keys; errors are
/// reserved for failed construction. Type-based lookup matches the declared
/// bean type exactly and the first definition in registration order wins.
pub trait BeanContainer: Send + Sync {
    /// Register a definition; a duplicate id is rejected
    fn add_definition(&self, definition: BeanDefinition) -> Result<(), ContainerError>;

    /// Get (constructing if needed) the bean registered under `id`
    fn get_by_id(&self, id: &BeanId) -> Result<Option<SharedBean>, ContainerError>;

    /// Get the first bean whose declared type is `type_id`
    fn get_by_type(&self, type_id: TypeId) -> Result<Option<SharedBean>, ContainerError>;

    /// Resolve by id first, falling back to the declared type
    fn resolve(&self, id: &BeanId, type_id: TypeId) -> Result<Option<SharedBean>, ContainerError> {
        match self.get_by_id(id)? {
            Some(bean) => Ok(Some(bean)),
            None => self.get_by_type(type_id),
        }
    }

    /// Whether a definition exists for `id`
    fn contains(&self, id: &BeanId) -> bool;

    /// Ids of all registered definitions, in registration order
    fn definition_ids(&self) -> Vec<BeanId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_definition_records_type() {
        let definition = BeanDefinition::new::<String, _>("greeting", true, true, || {
            Ok(Arc::new("hello".to_string()))
        });
        assert_eq!(definition.type_id, TypeId::of::<String>());
        assert!(definition.type_name.contains("String"));

        let bean = (definition.factory())().unwrap();
        assert_eq!(bean.downcast::<String>().unwrap().as_str(), "hello");
    }

    #[test]
    fn test_erased_factory_keeps_declared_type() {
        struct Marker;
        let definition = BeanDefinition::with_factory::<Marker, _>("m", true, true, || {
            Ok(Arc::new(7_u32) as SharedBean)
        });
        assert_eq!(definition.type_id, TypeId::of::<Marker>());
    }

    #[test]
    fn test_error_display() {
        let err = ContainerError::construction(&BeanId::new("main"), "factory exploded");
        assert_eq!(
            err.to_string(),
            "construction of bean 'main' failed: factory exploded"
        );
    }
}
