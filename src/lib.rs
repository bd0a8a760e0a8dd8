//! crud-scaffold: generic CRUD HTTP endpoints synthesized from a registered type universe.
//!
//! Startup runs [`prepare`] (discovery, view model generation and compilation), then
//! [`app_router`] binds every route to a cached dispatch adapter.

pub mod auth;
pub mod case;
pub mod compiler;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod operation;
pub mod pipeline;
pub mod provider;
pub mod reflect;
pub mod repository;
pub mod response;
pub mod routes;
pub mod state;
pub mod viewmodel;

pub use auth::{Authorizer, PolicyAuthorizer, Principal};
pub use config::{CrudOptions, DiscoveryMode, MethodNames, ReferenceScope};
pub use dispatch::{DispatchRegistry, MethodCatalog, MethodTable, TypeKey};
pub use error::{AppError, CompilationError, ConfigError, PersistenceError, StartupError};
pub use operation::CrudOperation;
pub use pipeline::{prepare, Prepared};
pub use provider::{ServiceCollection, ServiceInstance, ServiceProvider};
pub use reflect::{Module, Primitive, PropertyType, Reflect, TypeDef, TypeUniverse};
pub use repository::Repository;
pub use routes::{app_router, common_routes, entity_routes, RouteRegistration};
pub use state::AppState;
