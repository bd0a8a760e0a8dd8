pub mod common;
pub mod entity;

pub use common::common_routes;
pub use entity::{entity_routes, RouteRegistration};

use crate::error::ConfigError;
use crate::pipeline::Prepared;
use crate::state::AppState;
use axum::Router;

/// Entity routes plus the common routes, ready to serve.
pub fn app_router(prepared: &Prepared, state: &AppState) -> Result<Router, ConfigError> {
    let (entities, registrations) = entity_routes(prepared, state)?;
    Ok(Router::new().merge(common_routes(registrations)).merge(entities))
}
