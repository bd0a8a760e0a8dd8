//! Capability-keyed method tables: per persistence type, named methods erased to three call
//! shapes over JSON. Built once at startup; dispatch binding looks methods up here.

use crate::dispatch::TypeKey;
use crate::error::PersistenceError;
use crate::provider::ServiceInstance;
use crate::repository::Repository;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

pub type MethodFuture = BoxFuture<'static, Result<Value, PersistenceError>>;
pub type NullaryMethod = Arc<dyn Fn(ServiceInstance) -> MethodFuture + Send + Sync>;
pub type IdMethod = Arc<dyn Fn(ServiceInstance, Uuid) -> MethodFuture + Send + Sync>;
pub type PayloadMethod = Arc<dyn Fn(ServiceInstance, Value) -> MethodFuture + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodShape {
    Nullary,
    WithId,
    WithPayload,
}

impl fmt::Display for MethodShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MethodShape::Nullary => "a method without arguments",
            MethodShape::WithId => "a method taking an id",
            MethodShape::WithPayload => "a method taking a payload",
        })
    }
}

#[derive(Clone)]
pub enum ErasedMethod {
    Nullary(NullaryMethod),
    WithId(IdMethod),
    WithPayload(PayloadMethod),
}

impl ErasedMethod {
    pub fn shape(&self) -> MethodShape {
        match self {
            ErasedMethod::Nullary(_) => MethodShape::Nullary,
            ErasedMethod::WithId(_) => MethodShape::WithId,
            ErasedMethod::WithPayload(_) => MethodShape::WithPayload,
        }
    }
}

impl fmt::Debug for ErasedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErasedMethod({:?})", self.shape())
    }
}

fn downcast<R: Send + Sync + 'static>(instance: ServiceInstance) -> Result<Arc<R>, PersistenceError> {
    instance.downcast::<R>().map_err(|_| PersistenceError::ServiceMismatch {
        expected: std::any::type_name::<R>(),
    })
}

fn to_value<O: Serialize>(out: O) -> Result<Value, PersistenceError> {
    serde_json::to_value(out).map_err(|e| PersistenceError::Backend(e.to_string()))
}

/// Methods of one persistence type, by name.
#[derive(Clone, Debug, Default)]
pub struct MethodTable {
    methods: HashMap<String, ErasedMethod>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nullary<R, F, Fut, O>(mut self, name: impl Into<String>, f: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(Arc<R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, PersistenceError>> + Send + 'static,
        O: Serialize,
    {
        let method: NullaryMethod = Arc::new(move |svc: ServiceInstance| -> MethodFuture {
            let call = downcast::<R>(svc).map(&f);
            Box::pin(async move { to_value(call?.await?) })
        });
        self.methods.insert(name.into(), ErasedMethod::Nullary(method));
        self
    }

    pub fn with_id<R, F, Fut, O>(mut self, name: impl Into<String>, f: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(Arc<R>, Uuid) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, PersistenceError>> + Send + 'static,
        O: Serialize,
    {
        let method: IdMethod = Arc::new(move |svc: ServiceInstance, id: Uuid| -> MethodFuture {
            let call = downcast::<R>(svc).map(|r| f(r, id));
            Box::pin(async move { to_value(call?.await?) })
        });
        self.methods.insert(name.into(), ErasedMethod::WithId(method));
        self
    }

    pub fn with_payload<R, P, F, Fut, O>(mut self, name: impl Into<String>, f: F) -> Self
    where
        R: Send + Sync + 'static,
        P: DeserializeOwned,
        F: Fn(Arc<R>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, PersistenceError>> + Send + 'static,
        O: Serialize,
    {
        let method: PayloadMethod = Arc::new(move |svc: ServiceInstance, payload: Value| -> MethodFuture {
            let call = downcast::<R>(svc).and_then(|r| {
                let p = serde_json::from_value::<P>(payload)
                    .map_err(|e| PersistenceError::InvalidPayload(e.to_string()))?;
                Ok(f(r, p))
            });
            Box::pin(async move { to_value(call?.await?) })
        });
        self.methods.insert(name.into(), ErasedMethod::WithPayload(method));
        self
    }

    /// The five `Repository<T>` methods under their conventional names.
    pub fn repository<T, R>() -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        R: Repository<T>,
    {
        MethodTable::new()
            .nullary("GetListAsync", |r: Arc<R>| async move { r.get_list().await })
            .with_id("GetAsync", |r: Arc<R>, id| async move { r.get(id).await })
            .with_payload("CreateAsync", |r: Arc<R>, entity: T| async move { r.create(entity).await })
            .with_payload("UpdateAsync", |r: Arc<R>, entity: T| async move { r.update(entity).await })
            .with_id("DeleteAsync", |r: Arc<R>, id| async move { r.delete(id).await })
    }

    /// Registers `existing` under an additional name.
    pub fn alias(mut self, existing: &str, name: impl Into<String>) -> Self {
        if let Some(method) = self.methods.get(existing).cloned() {
            self.methods.insert(name.into(), method);
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&ErasedMethod> {
        self.methods.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

/// Method tables of every persistence type the application registered.
#[derive(Clone, Debug, Default)]
pub struct MethodCatalog {
    tables: HashMap<TypeKey, MethodTable>,
}

impl MethodCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, key: TypeKey, table: MethodTable) -> Self {
        self.tables.insert(key, table);
        self
    }

    pub fn table(&self, key: &TypeKey) -> Option<&MethodTable> {
        self.tables.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Echo {
        text: String,
    }

    struct Loud;

    struct Quiet;

    fn table() -> MethodTable {
        MethodTable::new()
            .nullary("Ping", |_: Arc<Loud>| async { Ok::<_, PersistenceError>("pong") })
            .with_payload("Shout", |_: Arc<Loud>, e: Echo| async move {
                Ok::<_, PersistenceError>(Echo {
                    text: e.text.to_uppercase(),
                })
            })
            .alias("Ping", "Hello")
    }

    #[tokio::test]
    async fn erased_methods_round_trip_through_json() {
        let table = table();
        let Some(ErasedMethod::WithPayload(shout)) = table.lookup("Shout") else {
            panic!("missing Shout");
        };
        let out = shout(Arc::new(Loud), serde_json::json!({ "text": "hi" }))
            .await
            .expect("shout");
        assert_eq!(out, serde_json::json!({ "text": "HI" }));
        assert_eq!(table.lookup("Hello").map(ErasedMethod::shape), Some(MethodShape::Nullary));
    }

    #[tokio::test]
    async fn wrong_service_or_payload_is_an_error() {
        let table = table();
        let Some(ErasedMethod::Nullary(ping)) = table.lookup("Ping") else {
            panic!("missing Ping");
        };
        assert!(matches!(
            ping(Arc::new(Quiet)).await,
            Err(PersistenceError::ServiceMismatch { .. })
        ));
        let Some(ErasedMethod::WithPayload(shout)) = table.lookup("Shout") else {
            panic!("missing Shout");
        };
        assert!(matches!(
            shout(Arc::new(Loud), serde_json::json!({ "words": 1 })).await,
            Err(PersistenceError::InvalidPayload(_))
        ));
    }
}
