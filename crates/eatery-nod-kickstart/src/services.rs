//! Cross-feature service registry.
//!
//! Features publish shared services (backend handles, the signed-in user)
//! keyed by type so other features can resolve them without knowing who
//! registered them.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type ServiceMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Type-keyed map of shared services.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    inner: Arc<RwLock<ServiceMap>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service`, replacing any previous service of the same type.
    pub fn insert<T>(&self, service: T)
    where
        T: Any + Send + Sync,
    {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Arc::new(service));
    }

    /// Resolve the service registered for `T`.
    #[must_use]
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let entry = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()?;
        entry.downcast::<T>().ok()
    }

    /// Whether a service of type `T` is registered.
    #[must_use]
    pub fn contains<T>(&self) -> bool
    where
        T: Any + Send + Sync,
    {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }
}
