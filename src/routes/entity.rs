//! Entity CRUD routes synthesized from the prepared pipeline output.
//! Per entity `E`: POST /E/CreateAsync, PUT /E/UpdateAsync, DELETE /E/DeleteAsync,
//! GET /E/GetListAsync, GET /E/GetAsync/:id.

use crate::auth::{authorize_request, RouteGuard};
use crate::error::ConfigError;
use crate::handlers::entity::{self, EntityRoute};
use crate::operation::CrudOperation;
use crate::pipeline::Prepared;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteRegistration {
    pub entity: String,
    pub verb: String,
    pub path: String,
    pub operation: CrudOperation,
    /// View model the request body binds to; set for the operations that read one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    pub requires_auth: bool,
}

fn route_path(entity: &str, op: CrudOperation) -> String {
    match op {
        CrudOperation::Get => format!("/{}/{}/:id", entity, op.route_segment()),
        _ => format!("/{}/{}", entity, op.route_segment()),
    }
}

fn method_router(route: Arc<EntityRoute>) -> MethodRouter {
    match route.operation {
        CrudOperation::List => get(entity::list).with_state(route),
        CrudOperation::Get => get(entity::get).with_state(route),
        CrudOperation::Create => post(entity::write).with_state(route),
        CrudOperation::Update => put(entity::write).with_state(route),
        CrudOperation::Delete => delete(entity::delete).with_state(route),
    }
}

/// Registers the five routes of every prepared entity. Each dispatch adapter is bound here, so
/// a missing or mis-shaped method fails startup instead of the first request.
pub fn entity_routes(prepared: &Prepared, state: &AppState) -> Result<(Router, Vec<RouteRegistration>), ConfigError> {
    let options = &state.options;
    let guard = if options.authentication_required {
        if let Some(policy) = &options.authorization_policy {
            if !state.authorizer.has_policy(policy) {
                return Err(ConfigError::UnknownPolicy(policy.clone()));
            }
        }
        Some(RouteGuard {
            authorizer: Arc::clone(&state.authorizer),
            policy: options.authorization_policy.clone(),
        })
    } else {
        None
    };

    let mut router = Router::new();
    let mut registrations = Vec::new();
    for entity in prepared.entities() {
        let key = prepared.key_for(&entity.name);
        let view_models = prepared
            .view_models_for(&entity.name)
            .ok_or_else(|| ConfigError::MissingViewModel {
                entity: entity.name.clone(),
                operation: CrudOperation::Create,
                name: options.view_model_name(&entity.name, CrudOperation::Create),
            })?;

        for op in CrudOperation::ALL {
            state.register_route(&entity.name, op)?;
            let view_model = view_models.get(op).cloned().ok_or_else(|| ConfigError::MissingViewModel {
                entity: entity.name.clone(),
                operation: op,
                name: options.view_model_name(&entity.name, op),
            })?;
            let adapter = state.dispatch.adapter(&key, op)?;

            let path = route_path(&entity.name, op);
            let accepts = op.reads_body().then(|| view_model.name().to_string());
            let mut method = method_router(Arc::new(EntityRoute {
                state: state.clone(),
                key: key.clone(),
                operation: op,
                view_model,
            }));
            if let Some(guard) = &guard {
                method = method.route_layer(middleware::from_fn_with_state(guard.clone(), authorize_request));
            }
            router = router.route(&path, method);

            tracing::info!(
                entity = %entity.name,
                verb = %op.http_method(),
                path = %path,
                method = adapter.method(),
                "route registered"
            );
            registrations.push(RouteRegistration {
                entity: entity.name.clone(),
                verb: op.http_method().to_string(),
                path,
                operation: op,
                accepts,
                policy: guard.as_ref().and_then(|g| g.policy.clone()),
                requires_auth: guard.is_some(),
            });
        }
    }

    let router = router.layer(RequestBodyLimitLayer::new(options.body_limit));
    Ok((router, registrations))
}
