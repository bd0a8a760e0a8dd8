//! Example server: registers a small shop domain, generates its view models, and serves the
//! synthesized CRUD routes backed by in-memory repositories.
//!
//! Options come from `CRUD_*` environment variables (a `.env` file is read when present);
//! unset required options fall back to the demo's own.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use crud_scaffold::{
    app_router, prepare, AppState, CrudOptions, DispatchRegistry, MethodCatalog, MethodTable, Module,
    PersistenceError, PolicyAuthorizer, Primitive, Principal, PropertyType, Reflect, Repository,
    ServiceCollection, TypeDef, TypeKey, TypeUniverse,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
}

#[derive(Clone, Debug, Serialize, Deserialize)]
enum Status {
    Active,
    Retired,
}

impl Reflect for Status {
    fn type_def() -> TypeDef {
        TypeDef::enumeration("Status", ["Active", "Retired"])
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Product {
    #[serde(default)]
    id: Uuid,
    name: String,
    unit_price: f64,
    status: Status,
    category_id: Option<Uuid>,
}

impl Reflect for Product {
    fn type_def() -> TypeDef {
        TypeDef::structure("Product")
            .implements("IEntity")
            .optional("id", Primitive::Uuid)
            .property("name", Primitive::String)
            .property("unit_price", Primitive::Float64)
            .property("status", PropertyType::enumeration("Status"))
            .optional("category_id", Primitive::Uuid)
            .property("category", PropertyType::reference("Category"))
            .build()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Category {
    #[serde(default)]
    id: Uuid,
    title: String,
}

impl Reflect for Category {
    fn type_def() -> TypeDef {
        TypeDef::structure("Category")
            .implements("IEntity")
            .optional("id", Primitive::Uuid)
            .property("title", Primitive::String)
            .build()
    }
}

macro_rules! entity_ids {
    ($($t:ty),*) => {$(
        impl Entity for $t {
            fn id(&self) -> Uuid {
                self.id
            }

            fn set_id(&mut self, id: Uuid) {
                self.id = id;
            }
        }
    )*};
}

entity_ids!(Product, Category);

struct MemoryRepository<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        MemoryRepository {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Entity> MemoryRepository<T> {
    fn rows(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Uuid, T>>, PersistenceError> {
        self.rows.read().map_err(|e| PersistenceError::Backend(e.to_string()))
    }

    fn rows_mut(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<Uuid, T>>, PersistenceError> {
        self.rows.write().map_err(|e| PersistenceError::Backend(e.to_string()))
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn get_list(&self) -> Result<Vec<T>, PersistenceError> {
        Ok(self.rows()?.values().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<T, PersistenceError> {
        self.rows()?
            .get(&id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn create(&self, mut entity: T) -> Result<T, PersistenceError> {
        if entity.id().is_nil() {
            entity.set_id(Uuid::new_v4());
        }
        self.rows_mut()?.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<(), PersistenceError> {
        let mut rows = self.rows_mut()?;
        match rows.get_mut(&entity.id()) {
            Some(row) => {
                *row = entity;
                Ok(())
            }
            None => Err(PersistenceError::NotFound(entity.id().to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError> {
        Ok(self.rows_mut()?.remove(&id).is_some())
    }
}

fn universe() -> TypeUniverse {
    TypeUniverse::new()
        .with_module(
            Module::new("shop.domain")
                .with_type(TypeDef::marker("IEntity"))
                .register::<Status>()
                .register::<Product>()
                .register::<Category>(),
        )
        .with_module(Module::new("shop.view_models"))
        .with_module(Module::new("shop.persistence").with_type(TypeDef::contract(
            "Repository<T>",
            ["T"],
            ["GetListAsync", "GetAsync", "CreateAsync", "UpdateAsync", "DeleteAsync"],
        )))
}

fn demo_options() -> CrudOptions {
    CrudOptions::default()
        .with_domain_module("shop.domain")
        .with_view_model_module("shop.view_models")
        .with_repository_module("shop.persistence")
        .with_repository_name("Repository")
        .with_marker_name("IEntity")
        .with_view_model_suffix("ViewModel")
        .with_view_model_output("generated")
}

fn register<T>(
    catalog: MethodCatalog,
    services: ServiceCollection,
    entity: &str,
) -> (MethodCatalog, ServiceCollection)
where
    T: Entity + Serialize + DeserializeOwned,
{
    let key = TypeKey::new("Repository", entity);
    (
        catalog.with_table(key.clone(), MethodTable::repository::<T, MemoryRepository<T>>()),
        services.add_singleton(key, Arc::new(MemoryRepository::<T>::default())),
    )
}

/// `X-User: name[,role...]` becomes the request's principal.
async fn demo_principal(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get("x-user")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').map(|part| part.trim().to_string()).collect::<Vec<_>>());
    if let Some([subject, roles @ ..]) = user.as_deref() {
        let principal = roles
            .iter()
            .fold(Principal::new(subject.as_str()), |p, role| p.with_role(role.as_str()));
        request.extensions_mut().insert(principal);
    }
    next.run(request).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("crud_scaffold=info".parse()?))
        .init();

    let options = match CrudOptions::from_env() {
        Ok(options) => options,
        Err(e) => {
            tracing::info!(reason = %e, "using demo options");
            demo_options()
        }
    };
    let universe = universe();
    let prepared = prepare(&options, &universe)?;

    let (catalog, services) = register::<Product>(MethodCatalog::new(), ServiceCollection::new(), "Product");
    let (catalog, services) = register::<Category>(catalog, services, "Category");
    let authorizer = PolicyAuthorizer::new().require_role("Admins", "admin");

    let dispatch = DispatchRegistry::from_options(catalog, &options);
    let state = AppState::new(options, dispatch, Arc::new(services), Arc::new(authorizer));
    let app = Router::new()
        .merge(app_router(&prepared, &state)?)
        .layer(axum::middleware::from_fn(demo_principal));

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
