#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use crud_scaffold::{
    app_router, prepare, AppState, Authorizer, CrudOptions, DispatchRegistry, MethodCatalog, MethodTable, Module,
    PersistenceError, PolicyAuthorizer, Prepared, Primitive, PropertyType, Reflect, Repository, ServiceCollection,
    TypeDef, TypeKey, TypeUniverse,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Active,
    Retired,
}

impl Reflect for Status {
    fn type_def() -> TypeDef {
        TypeDef::enumeration("Status", ["Active", "Retired"])
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub status: Status,
}

impl Reflect for Product {
    fn type_def() -> TypeDef {
        TypeDef::structure("Product")
            .implements("IEntity")
            .optional("id", Primitive::Uuid)
            .property("name", Primitive::String)
            .property("age", Primitive::Int32)
            .property("status", PropertyType::enumeration("Status"))
            .build()
    }
}

pub fn universe() -> TypeUniverse {
    TypeUniverse::new()
        .with_module(
            Module::new("shop.domain")
                .with_type(TypeDef::marker("IEntity"))
                .register::<Status>()
                .register::<Product>(),
        )
        .with_module(Module::new("shop.view_models"))
        .with_module(Module::new("shop.persistence").with_type(TypeDef::contract(
            "Repository<T>",
            ["T"],
            ["GetListAsync", "GetAsync", "CreateAsync", "UpdateAsync", "DeleteAsync"],
        )))
}

pub fn options(output: &Path) -> CrudOptions {
    CrudOptions::default()
        .with_domain_module("shop.domain")
        .with_view_model_module("shop.view_models")
        .with_repository_module("shop.persistence")
        .with_repository_name("Repository")
        .with_marker_name("IEntity")
        .with_view_model_suffix("ViewModel")
        .with_view_model_output(output)
}

pub fn product_key() -> TypeKey {
    TypeKey::new("Repository", "Product")
}

#[derive(Default)]
pub struct Calls {
    pub list: AtomicUsize,
    pub get: AtomicUsize,
    pub create: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        [&self.list, &self.get, &self.create, &self.update, &self.delete]
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    rows: Mutex<Vec<Product>>,
    pub calls: Calls,
}

impl MemoryRepository {
    pub fn seed(&self, product: Product) {
        self.rows.lock().expect("rows").push(product);
    }

    pub fn rows(&self) -> Vec<Product> {
        self.rows.lock().expect("rows").clone()
    }
}

#[async_trait]
impl Repository<Product> for MemoryRepository {
    async fn get_list(&self) -> Result<Vec<Product>, PersistenceError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows())
    }

    async fn get(&self, id: Uuid) -> Result<Product, PersistenceError> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.rows()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn create(&self, mut entity: Product) -> Result<Product, PersistenceError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        if entity.id.is_nil() {
            entity.id = Uuid::new_v4();
        }
        self.seed(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Product) -> Result<(), PersistenceError> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().expect("rows");
        let row = rows
            .iter_mut()
            .find(|p| p.id == entity.id)
            .ok_or_else(|| PersistenceError::NotFound(entity.id.to_string()))?;
        *row = entity;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().expect("rows");
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }
}

pub fn product(name: &str) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        age: 2,
        status: Status::Active,
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub state: AppState,
    pub prepared: Prepared,
    pub dir: TempDir,
}

pub fn state_for(options: CrudOptions, repo: Arc<MemoryRepository>, authorizer: Arc<dyn Authorizer>) -> AppState {
    let catalog = MethodCatalog::new().with_table(product_key(), MethodTable::repository::<Product, MemoryRepository>());
    let dispatch = DispatchRegistry::from_options(catalog, &options);
    let services = ServiceCollection::new().add_singleton(product_key(), repo);
    AppState::new(options, dispatch, Arc::new(services), authorizer)
}

pub fn app_with(configure: impl FnOnce(CrudOptions) -> CrudOptions, authorizer: PolicyAuthorizer) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = configure(options(dir.path()));
    let prepared = prepare(&options, &universe()).expect("prepare");
    let repo = Arc::new(MemoryRepository::default());
    let state = state_for(options, Arc::clone(&repo), Arc::new(authorizer));
    let router = app_router(&prepared, &state).expect("router");
    TestApp {
        router,
        repo,
        state,
        prepared,
        dir,
    }
}

pub fn app() -> TestApp {
    app_with(|o| o, PolicyAuthorizer::new())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: Uuid,
    pub unit_price: f64,
}

impl Reflect for Item {
    fn type_def() -> TypeDef {
        TypeDef::structure("Item")
            .implements("IEntity")
            .optional("id", Primitive::Uuid)
            .property("unit_price", Primitive::Float64)
            .build()
    }
}

#[derive(Default)]
pub struct ItemRepository {
    rows: Mutex<Vec<Item>>,
}

impl ItemRepository {
    pub fn seed(&self, item: Item) {
        self.rows.lock().expect("rows").push(item);
    }

    pub fn rows(&self) -> Vec<Item> {
        self.rows.lock().expect("rows").clone()
    }
}

#[async_trait]
impl Repository<Item> for ItemRepository {
    async fn get_list(&self) -> Result<Vec<Item>, PersistenceError> {
        Ok(self.rows())
    }

    async fn get(&self, id: Uuid) -> Result<Item, PersistenceError> {
        self.rows()
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn create(&self, mut entity: Item) -> Result<Item, PersistenceError> {
        if entity.id.is_nil() {
            entity.id = Uuid::new_v4();
        }
        self.seed(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Item) -> Result<(), PersistenceError> {
        let mut rows = self.rows.lock().expect("rows");
        let row = rows
            .iter_mut()
            .find(|i| i.id == entity.id)
            .ok_or_else(|| PersistenceError::NotFound(entity.id.to_string()))?;
        *row = entity;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows");
        let before = rows.len();
        rows.retain(|i| i.id != id);
        Ok(rows.len() != before)
    }
}

pub struct ItemApp {
    pub router: Router,
    pub repo: Arc<ItemRepository>,
    pub dir: TempDir,
}

/// A domain holding only `Item`, whose `unit_price` is a multi-word property.
pub fn item_app(camel_case_json: bool) -> ItemApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = options(dir.path()).with_camel_case_json(camel_case_json);
    let universe = TypeUniverse::new()
        .with_module(
            Module::new("shop.domain")
                .with_type(TypeDef::marker("IEntity"))
                .register::<Item>(),
        )
        .with_module(Module::new("shop.view_models"))
        .with_module(Module::new("shop.persistence").with_type(TypeDef::contract(
            "Repository<T>",
            ["T"],
            ["GetListAsync", "GetAsync", "CreateAsync", "UpdateAsync", "DeleteAsync"],
        )));
    let prepared = prepare(&options, &universe).expect("prepare");

    let key = TypeKey::new("Repository", "Item");
    let repo = Arc::new(ItemRepository::default());
    let catalog = MethodCatalog::new().with_table(key.clone(), MethodTable::repository::<Item, ItemRepository>());
    let dispatch = DispatchRegistry::from_options(catalog, &options);
    let services = ServiceCollection::new().add_singleton(key, Arc::clone(&repo));
    let state = AppState::new(options, dispatch, Arc::new(services), Arc::new(PolicyAuthorizer::new()));
    let router = app_router(&prepared, &state).expect("router");
    ItemApp { router, repo, dir }
}

pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.expect("infallible")
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}
