//! Entity CRUD handlers: list, get, create, update, delete. One handler instance per route,
//! carrying the entity's persistence type key and the operation's view model.

use crate::case::align_keys_to_fields;
use crate::dispatch::{DispatchInput, TypeKey};
use crate::error::AppError;
use crate::extractors::{parse_id, DeleteQuery, EntityId};
use crate::operation::CrudOperation;
use crate::response::render;
use crate::state::AppState;
use crate::viewmodel::ViewModelDescriptor;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::request::Parts,
    response::Response,
};
use serde_json::Value;
use std::sync::Arc;

pub struct EntityRoute {
    pub state: AppState,
    pub key: TypeKey,
    pub operation: CrudOperation,
    pub view_model: ViewModelDescriptor,
}

impl EntityRoute {
    async fn dispatch(&self, parts: &Parts, input: DispatchInput) -> Result<Response, AppError> {
        let service = self.state.services.resolve(&self.key, parts)?;
        let adapter = self.state.dispatch.adapter(&self.key, self.operation)?;
        let output = adapter.invoke(service, input).await?;
        Ok(render(output, self.state.options.camel_case_json))
    }

    async fn read_bytes(&self, body: Body) -> Result<axum::body::Bytes, AppError> {
        to_bytes(body, self.state.options.body_limit)
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read body: {}", e)))
    }

    /// Body as the operation's view model. `require` rejects absent non-null fields.
    fn bind_body(&self, bytes: &[u8], require: bool) -> Result<Value, AppError> {
        let mut value: Value = serde_json::from_slice(bytes)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
        if self.state.options.camel_case_json {
            if let Value::Object(map) = &mut value {
                align_keys_to_fields(map, self.view_model.fields().iter().map(|f| f.name.as_str()));
            }
        }
        if require {
            self.view_model.bind(value)
        } else {
            self.view_model.bind_present(value)
        }
    }
}

pub async fn list(State(route): State<Arc<EntityRoute>>, request: Request) -> Result<Response, AppError> {
    let (parts, _) = request.into_parts();
    route.dispatch(&parts, DispatchInput::None).await
}

pub async fn get(
    State(route): State<Arc<EntityRoute>>,
    EntityId(id): EntityId,
    request: Request,
) -> Result<Response, AppError> {
    let (parts, _) = request.into_parts();
    route.dispatch(&parts, DispatchInput::Id(id)).await
}

/// Create and Update: body bound to the view model, forwarded as the payload.
pub async fn write(State(route): State<Arc<EntityRoute>>, request: Request) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let bytes = route.read_bytes(body).await?;
    let payload = route.bind_body(&bytes, true)?;
    route.dispatch(&parts, DispatchInput::Payload(payload)).await
}

/// Id from `?id=`, else from the Delete view model's `id` field. A body, when sent, is checked
/// against the view model for the fields it carries.
pub async fn delete(State(route): State<Arc<EntityRoute>>, request: Request) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let query = DeleteQuery::from_uri(&parts.uri)?;
    let bytes = route.read_bytes(body).await?;
    let has_body = bytes.iter().any(|b| !b.is_ascii_whitespace());
    let dto = if has_body { Some(route.bind_body(&bytes, false)?) } else { None };

    let id = match (query.id.as_deref(), &dto) {
        (Some(raw), _) => parse_id(raw)?,
        (None, Some(dto)) => match dto.get("id").and_then(Value::as_str) {
            Some(raw) => parse_id(raw)?,
            None => return Err(AppError::BadRequest(format!("{} carries no id", route.view_model.name()))),
        },
        (None, None) => return Err(AppError::BadRequest("id is required".into())),
    };
    route.dispatch(&parts, DispatchInput::Id(id)).await
}
