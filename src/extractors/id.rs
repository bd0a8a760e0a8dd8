//! Entity id from the path (`/E/GetAsync/{id}`) or the delete query (`?id=`).

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, Query},
    http::{request::Parts, Uri},
};
use serde::Deserialize;
use uuid::Uuid;

pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("invalid id '{}'", raw)))
}

/// Path segment parsed as a UUID.
#[derive(Clone, Copy, Debug)]
pub struct EntityId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        parse_id(&raw).map(EntityId)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

impl DeleteQuery {
    /// Query string rejections become the JSON 400 envelope.
    pub fn from_uri(uri: &Uri) -> Result<Self, AppError> {
        Query::<DeleteQuery>::try_from_uri(uri)
            .map(|Query(query)| query)
            .map_err(|e| AppError::BadRequest(e.body_text()))
    }
}
