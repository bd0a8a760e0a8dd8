//! Request-scoped service resolution: turns a persistence type identity into an instance.

use crate::dispatch::TypeKey;
use crate::error::ResolveError;
use axum::http::request::Parts;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved persistence service, downcast by the bound method that uses it.
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

pub trait ServiceProvider: Send + Sync {
    /// Called once per request with that request's head.
    fn resolve(&self, key: &TypeKey, parts: &Parts) -> Result<ServiceInstance, ResolveError>;
}

type Factory = Arc<dyn Fn(&Parts) -> Result<ServiceInstance, ResolveError> + Send + Sync>;

/// Map-backed provider with singletons and per-request factories.
#[derive(Clone, Default)]
pub struct ServiceCollection {
    factories: HashMap<TypeKey, Factory>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The same instance for every request.
    pub fn add_singleton<R>(mut self, key: TypeKey, instance: Arc<R>) -> Self
    where
        R: Send + Sync + 'static,
    {
        let instance: ServiceInstance = instance;
        self.factories
            .insert(key, Arc::new(move |_: &Parts| -> Result<ServiceInstance, ResolveError> {
                Ok(Arc::clone(&instance))
            }));
        self
    }

    /// A fresh instance per request.
    pub fn add_scoped<R, F>(mut self, key: TypeKey, factory: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&Parts) -> R + Send + Sync + 'static,
    {
        self.factories.insert(
            key,
            Arc::new(move |parts: &Parts| -> Result<ServiceInstance, ResolveError> {
                Ok(Arc::new(factory(parts)))
            }),
        );
        self
    }

    /// A per-request factory that may fail, e.g. when a connection cannot be checked out.
    pub fn add_fallible<R, F>(mut self, key: TypeKey, factory: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&Parts) -> Result<R, String> + Send + Sync + 'static,
    {
        let name = key.to_string();
        self.factories.insert(
            key,
            Arc::new(move |parts: &Parts| {
                factory(parts)
                    .map(|r| Arc::new(r) as ServiceInstance)
                    .map_err(|message| ResolveError::Factory {
                        key: name.clone(),
                        message,
                    })
            }),
        );
        self
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.factories.contains_key(key)
    }
}

impl ServiceProvider for ServiceCollection {
    fn resolve(&self, key: &TypeKey, parts: &Parts) -> Result<ServiceInstance, ResolveError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| ResolveError::NotRegistered(key.to_string()))?;
        factory(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn parts() -> Parts {
        Request::builder()
            .uri("/Product/GetListAsync")
            .body(())
            .expect("request")
            .into_parts()
            .0
    }

    struct Store(usize);

    #[test]
    fn scoped_factories_run_per_request() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let key = TypeKey::new("Repository", "Product");
        let services = ServiceCollection::new().add_scoped(key.clone(), move |_| {
            Store(counter.fetch_add(1, Ordering::SeqCst))
        });
        let a = services.resolve(&key, &parts()).expect("a");
        let b = services.resolve(&key, &parts()).expect("b");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(a.downcast::<Store>().expect("store").0, 0);
    }

    #[test]
    fn singletons_share_one_instance() {
        let key = TypeKey::new("Repository", "Product");
        let services = ServiceCollection::new().add_singleton(key.clone(), Arc::new(Store(7)));
        let a = services.resolve(&key, &parts()).expect("a");
        let b = services.resolve(&key, &parts()).expect("b");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_keys_and_failing_factories_are_errors() {
        let key = TypeKey::new("Repository", "Product");
        let services = ServiceCollection::new()
            .add_fallible::<Store, _>(key.clone(), |_| Err("pool exhausted".into()));
        assert!(matches!(
            services.resolve(&TypeKey::new("Repository", "Order"), &parts()),
            Err(ResolveError::NotRegistered(_))
        ));
        assert!(matches!(services.resolve(&key, &parts()), Err(ResolveError::Factory { .. })));
    }
}
