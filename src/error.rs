//! Typed errors and HTTP mapping.

use crate::dispatch::MethodShape;
use crate::operation::CrudOperation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Startup wiring failures. Every variant is fatal: the API is never served partially wired.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{role} module '{id}' is not loaded")]
    ModuleNotFound { role: &'static str, id: String },
    #[error("marker capability '{marker}' not found in module '{module}'")]
    MarkerNotFound { marker: String, module: String },
    #[error("no entities found in module '{module}'")]
    NoEntities { module: String },
    #[error("repository contract '{name}' not found in module '{module}'")]
    RepositoryNotFound { name: String, module: String },
    #[error("method '{method}' not found on '{contract}'")]
    MethodNotFound { contract: String, method: String },
    #[error("method '{method}' cannot serve {operation}: expected {expected}, found {found}")]
    MethodShape {
        method: String,
        operation: CrudOperation,
        expected: MethodShape,
        found: MethodShape,
    },
    #[error("view model '{name}' for {operation} of '{entity}' was not found")]
    MissingViewModel {
        entity: String,
        operation: CrudOperation,
        name: String,
    },
    #[error("view model '{view_model}' declares '{field}', which is not a property of '{entity}'")]
    ViewModelMismatch {
        view_model: String,
        field: String,
        entity: String,
    },
    #[error("view model '{view_model}' declares '{field}' as {found}, but '{entity}' has it as {expected}")]
    ViewModelFieldType {
        view_model: String,
        field: String,
        entity: String,
        expected: String,
        found: String,
    },
    #[error("route {operation} for '{entity}' is already registered")]
    DuplicateRoute { entity: String, operation: CrudOperation },
    #[error("authorization policy '{0}' is not known to the authorizer")]
    UnknownPolicy(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// A single view model file could not be written. Recorded and skipped; never aborts the run.
#[derive(Error, Debug)]
#[error("failed to write {}: {source}", path.display())]
pub struct GenerationError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// One compiler error, positioned in a view model source file. Lines are 1-based, columns 0-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: error: {}",
            self.file.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

#[derive(Error, Debug)]
#[error("view model compilation failed with {} error(s)", diagnostics.len())]
pub struct CompilationError {
    pub diagnostics: Vec<Diagnostic>,
}

/// Anything that stops the startup pipeline.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

/// Failures raised by persistence implementations and the adapters around them.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("resolved service is not a {expected}")]
    ServiceMismatch { expected: &'static str },
    #[error("persistence: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no service registered for {0}")]
    NotRegistered(String),
    #[error("service factory for {key} failed: {message}")]
    Factory { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("authentication required")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Resolve(_) => (StatusCode::INTERNAL_SERVER_ERROR, "resolve_error"),
            AppError::Persistence(e) => match e {
                PersistenceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                PersistenceError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                PersistenceError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "bad_request"),
                PersistenceError::ServiceMismatch { .. } | PersistenceError::Backend(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error")
                }
            },
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
