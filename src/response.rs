//! Success responses for dispatched calls.

use crate::case::value_keys_to_camel_case_recursive;
use crate::dispatch::DispatchOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

pub fn ok_json(mut value: Value, camel_case: bool) -> Response {
    if camel_case {
        value_keys_to_camel_case_recursive(&mut value);
    }
    (StatusCode::OK, Json(value)).into_response()
}

/// Bare `200 OK` with an empty body.
pub fn acknowledged() -> Response {
    StatusCode::OK.into_response()
}

pub fn render(output: DispatchOutput, camel_case: bool) -> Response {
    match output {
        DispatchOutput::Value(value) => ok_json(value, camel_case),
        DispatchOutput::Acknowledged => acknowledged(),
    }
}
