//! Bean registry
//!
//! Uses DashMap for lock-free concurrent lookups by name, plus an
//! append-only list that keeps registration order for dependency scans.

use crate::metadata::{ComponentType, SharedInstance, TypeKey, View};
use crate::{DiError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// A singleton instance held by the registry.
///
/// Cloning a `Bean` clones the handle, never the instance.
#[derive(Clone)]
pub struct Bean {
    name: Arc<str>,
    type_key: TypeKey,
    instance: SharedInstance,
    views: Arc<[View]>,
}

impl Bean {
    /// Wrap an instance of `ty`
    pub fn new(name: impl Into<Arc<str>>, ty: &ComponentType, instance: SharedInstance) -> Self {
        Self {
            name: name.into(),
            type_key: ty.type_key(),
            instance,
            views: Arc::clone(ty.views()),
        }
    }

    /// Wrap a plain value that is only assignable to its own type
    pub fn from_value<T: Send + Sync + 'static>(name: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            name: name.into(),
            type_key: TypeKey::of::<T>(),
            instance: Arc::new(value),
            views: Arc::new([View::identity::<T>()]),
        }
    }

    /// Bean name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runtime (concrete) type of the instance
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Runtime type name of the instance
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_key.name()
    }

    /// Whether the instance can be used where `target` is declared
    #[inline]
    pub fn is_assignable_to(&self, target: &TypeKey) -> bool {
        self.views.iter().any(|view| view.key() == *target)
    }

    /// Get the instance as `T`, which may be the concrete type or a provided
    /// trait object.
    pub fn get<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        let target = TypeKey::of::<T>();
        let view = self.views.iter().find(|view| view.key() == target)?;
        view.cast(&self.instance)?
            .downcast::<Arc<T>>()
            .ok()
            .map(|typed| *typed)
    }

    /// Type-erased instance
    #[inline]
    pub fn instance(&self) -> &SharedInstance {
        &self.instance
    }

    /// Whether both handles point at the same instance
    #[inline]
    pub fn ptr_eq(&self, other: &Bean) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl std::fmt::Debug for Bean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bean")
            .field("name", &self.name)
            .field("type", &self.type_key)
            .finish()
    }
}

/// Thread-safe name → bean mapping.
///
/// Append-only: a name is never replaced or removed once registered.
pub struct BeanRegistry {
    /// Lookup by bean name
    beans: DashMap<Arc<str>, Bean, RandomState>,
    /// Registration order, used for assignability scans
    order: RwLock<Vec<Bean>>,
}

impl BeanRegistry {
    /// Create an empty registry.
    ///
    /// Uses 8 shards; a container rarely holds more than a few dozen beans.
    #[inline]
    pub fn new() -> Self {
        Self {
            beans: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Insert `bean` under its name.
    ///
    /// If the name is taken the new bean is dropped, a warning is logged and
    /// `DiError::DuplicateBean` is returned. The first registration wins.
    pub fn register(&self, bean: Bean) -> Result<()> {
        match self.beans.entry(Arc::clone(&bean.name)) {
            Entry::Occupied(existing) => {
                #[cfg(feature = "logging")]
                warn!(
                    target: "simple_ioc",
                    bean = %bean.name,
                    existing = existing.get().type_name(),
                    skipped = bean.type_name(),
                    "Bean with this name already exists, skipping"
                );
                #[cfg(not(feature = "logging"))]
                let _ = existing;

                Err(DiError::DuplicateBean {
                    name: bean.name.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                // Pushed while the shard lock is held so the two views stay in step.
                // Must not call self.beans.len() here: it would wait on our own shard.
                let mut order = self.order.write().unwrap_or_else(PoisonError::into_inner);
                order.push(bean.clone());

                #[cfg(feature = "logging")]
                debug!(
                    target: "simple_ioc",
                    bean = %bean.name,
                    service = bean.type_name(),
                    bean_count = order.len(),
                    "Registering bean"
                );

                drop(order);
                slot.insert(bean);
                Ok(())
            }
        }
    }

    /// Look up a bean by name
    #[inline]
    pub fn get(&self, name: &str) -> Option<Bean> {
        let bean = self.beans.get(name).map(|entry| entry.value().clone());

        #[cfg(feature = "logging")]
        if bean.is_none() {
            trace!(target: "simple_ioc", bean = name, "Bean not found");
        }

        bean
    }

    /// Look up a bean by name and view it as `T`
    #[inline]
    pub fn get_as<T: ?Sized + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(|bean| bean.get::<T>())
    }

    /// Check if a name is registered
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.beans.contains_key(name)
    }

    /// Snapshot of all beans in registration order
    pub fn values(&self) -> Vec<Bean> {
        self.order
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.order
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|bean| bean.name().to_string())
            .collect()
    }

    /// First bean, in registration order, assignable to `target`
    pub fn find_assignable(&self, target: &TypeKey) -> Option<Bean> {
        self.order
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|bean| bean.is_assignable_to(target))
            .cloned()
    }

    /// Number of registered beans
    #[inline]
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BeanRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanRegistry")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct TestService {
        value: i32,
    }

    #[test]
    fn test_register_and_get_same_instance() {
        let registry = BeanRegistry::new();
        let bean = Bean::from_value("X", TestService { value: 42 });
        registry.register(bean.clone()).unwrap();

        let found = registry.get("X").unwrap();
        assert!(found.ptr_eq(&bean));
        assert_eq!(registry.get_as::<TestService>("X").unwrap().value, 42);
        assert!(registry.get("Y").is_none());
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let registry = BeanRegistry::new();
        let first = Bean::from_value("Service", TestService { value: 1 });
        registry.register(first.clone()).unwrap();

        let result = registry.register(Bean::from_value("Service", TestService { value: 2 }));
        assert!(matches!(result, Err(DiError::DuplicateBean { ref name }) if name == "Service"));

        assert_eq!(registry.len(), 1);
        assert!(registry.get("Service").unwrap().ptr_eq(&first));
        assert_eq!(registry.get_as::<TestService>("Service").unwrap().value, 1);
    }

    #[test]
    fn test_values_follow_registration_order() {
        let registry = BeanRegistry::new();
        for (i, name) in ["C", "A", "B"].into_iter().enumerate() {
            registry
                .register(Bean::from_value(name, TestService { value: i as i32 }))
                .unwrap();
        }

        assert_eq!(registry.names(), vec!["C", "A", "B"]);
        let first = registry
            .find_assignable(&TypeKey::of::<TestService>())
            .unwrap();
        assert_eq!(first.name(), "C");
        assert!(registry.find_assignable(&TypeKey::of::<String>()).is_none());
    }

    #[test]
    fn test_get_with_wrong_type_is_none() {
        let registry = BeanRegistry::new();
        registry
            .register(Bean::from_value("X", TestService { value: 0 }))
            .unwrap();
        assert!(registry.get_as::<String>("X").is_none());
    }

    #[test]
    fn test_concurrent_register_and_get() {
        let registry = Arc::new(BeanRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .register(Bean::from_value(format!("bean-{i}"), TestService { value: i }))
                        .unwrap();
                    // Everyone also races for the same name
                    let _ = registry.register(Bean::from_value("shared", TestService { value: i }));
                    assert!(registry.get(&format!("bean-{i}")).is_some());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 9);
        assert_eq!(registry.values().len(), 9);
    }
}
