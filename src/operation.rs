//! The five CRUD operations, shared by view model naming, dispatch keys and routes.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrudOperation {
    Create,
    Update,
    Delete,
    Get,
    List,
}

impl CrudOperation {
    /// Registration order for view models and routes.
    pub const ALL: [CrudOperation; 5] = [
        CrudOperation::Create,
        CrudOperation::Update,
        CrudOperation::Delete,
        CrudOperation::Get,
        CrudOperation::List,
    ];

    /// Name used inside view model type names: `{Entity}{name}{Suffix}`.
    pub fn as_str(self) -> &'static str {
        match self {
            CrudOperation::Create => "Create",
            CrudOperation::Update => "Update",
            CrudOperation::Delete => "Delete",
            CrudOperation::Get => "Get",
            CrudOperation::List => "List",
        }
    }

    /// Route segment under the entity prefix.
    pub fn route_segment(self) -> &'static str {
        match self {
            CrudOperation::Create => "CreateAsync",
            CrudOperation::Update => "UpdateAsync",
            CrudOperation::Delete => "DeleteAsync",
            CrudOperation::Get => "GetAsync",
            CrudOperation::List => "GetListAsync",
        }
    }

    pub fn http_method(self) -> Method {
        match self {
            CrudOperation::Create => Method::POST,
            CrudOperation::Update => Method::PUT,
            CrudOperation::Delete => Method::DELETE,
            CrudOperation::Get | CrudOperation::List => Method::GET,
        }
    }

    /// Whether the handler reads the operation's view model from the request body.
    pub fn reads_body(self) -> bool {
        matches!(
            self,
            CrudOperation::Create | CrudOperation::Update | CrudOperation::Delete
        )
    }

    /// View model type name for `entity` under the configured suffix.
    pub fn view_model_name(self, entity: &str, suffix: &str) -> String {
        format!("{}{}{}", entity, self.as_str(), suffix)
    }
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
