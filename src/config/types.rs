//! Raw option types; deserialized from JSON or assembled with the `with_*` builder.

use crate::operation::CrudOperation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How entities are found in the domain module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Every concrete struct implementing the marker capability.
    #[default]
    Marker,
    /// Entities named by existing `{Entity}{Operation}{Suffix}` view models.
    NameInference,
}

/// Which types generated view model source may reference besides primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceScope {
    /// Enums from every module in the universe.
    #[default]
    AllLoaded,
    Primitives,
}

/// Persistence method names bound per operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNames {
    pub get_list: String,
    pub get: String,
    pub create: String,
    pub update: String,
    pub delete: String,
}

impl MethodNames {
    pub fn for_operation(&self, op: CrudOperation) -> &str {
        match op {
            CrudOperation::List => &self.get_list,
            CrudOperation::Get => &self.get,
            CrudOperation::Create => &self.create,
            CrudOperation::Update => &self.update,
            CrudOperation::Delete => &self.delete,
        }
    }
}

impl Default for MethodNames {
    fn default() -> Self {
        MethodNames {
            get_list: "GetListAsync".into(),
            get: "GetAsync".into(),
            create: "CreateAsync".into(),
            update: "UpdateAsync".into(),
            delete: "DeleteAsync".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrudOptions {
    /// Module holding the domain entities.
    pub domain_module: String,
    /// Module holding hand-written view models.
    pub view_model_module: String,
    /// Module declaring the repository contract.
    pub repository_module: String,
    /// Repository contract name, e.g. `Repository` or `Repository<T>`.
    pub repository_name: String,
    /// Capability that marks a struct as an entity.
    pub marker_name: String,
    /// View model name suffix: `Product` + `Create` + suffix.
    pub view_model_suffix: String,
    /// Where missing view models are generated, one directory per entity.
    pub view_model_output: PathBuf,
    pub methods: MethodNames,
    #[serde(default)]
    pub authentication_required: bool,
    #[serde(default)]
    pub authorization_policy: Option<String>,
    /// Member of the persistence result holding the payload, e.g. `data` in `{ "status", "data" }`.
    #[serde(default)]
    pub response_data_member: Option<String>,
    #[serde(default)]
    pub discovery: DiscoveryMode,
    #[serde(default)]
    pub reference_scope: ReferenceScope,
    /// camelCase response keys and accept camelCase spellings of declared view model fields.
    #[serde(default)]
    pub camel_case_json: bool,
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for CrudOptions {
    fn default() -> Self {
        CrudOptions {
            domain_module: String::new(),
            view_model_module: String::new(),
            repository_module: String::new(),
            repository_name: String::new(),
            marker_name: String::new(),
            view_model_suffix: String::new(),
            view_model_output: PathBuf::new(),
            methods: MethodNames::default(),
            authentication_required: false,
            authorization_policy: None,
            response_data_member: None,
            discovery: DiscoveryMode::default(),
            reference_scope: ReferenceScope::default(),
            camel_case_json: false,
            body_limit: default_body_limit(),
        }
    }
}

impl CrudOptions {
    pub fn with_domain_module(mut self, id: impl Into<String>) -> Self {
        self.domain_module = id.into();
        self
    }

    pub fn with_view_model_module(mut self, id: impl Into<String>) -> Self {
        self.view_model_module = id.into();
        self
    }

    pub fn with_repository_module(mut self, id: impl Into<String>) -> Self {
        self.repository_module = id.into();
        self
    }

    pub fn with_repository_name(mut self, name: impl Into<String>) -> Self {
        self.repository_name = name.into();
        self
    }

    pub fn with_marker_name(mut self, name: impl Into<String>) -> Self {
        self.marker_name = name.into();
        self
    }

    pub fn with_view_model_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.view_model_suffix = suffix.into();
        self
    }

    pub fn with_view_model_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.view_model_output = dir.into();
        self
    }

    pub fn with_authentication_required(mut self, required: bool) -> Self {
        self.authentication_required = required;
        self
    }

    pub fn with_authorization_policy(mut self, policy: impl Into<String>) -> Self {
        self.authorization_policy = Some(policy.into());
        self
    }

    pub fn with_response_data_member(mut self, member: impl Into<String>) -> Self {
        self.response_data_member = Some(member.into());
        self
    }

    pub fn with_get_list_method(mut self, name: impl Into<String>) -> Self {
        self.methods.get_list = name.into();
        self
    }

    pub fn with_get_method(mut self, name: impl Into<String>) -> Self {
        self.methods.get = name.into();
        self
    }

    pub fn with_create_method(mut self, name: impl Into<String>) -> Self {
        self.methods.create = name.into();
        self
    }

    pub fn with_update_method(mut self, name: impl Into<String>) -> Self {
        self.methods.update = name.into();
        self
    }

    pub fn with_delete_method(mut self, name: impl Into<String>) -> Self {
        self.methods.delete = name.into();
        self
    }

    pub fn with_discovery(mut self, mode: DiscoveryMode) -> Self {
        self.discovery = mode;
        self
    }

    pub fn with_reference_scope(mut self, scope: ReferenceScope) -> Self {
        self.reference_scope = scope;
        self
    }

    pub fn with_camel_case_json(mut self, enabled: bool) -> Self {
        self.camel_case_json = enabled;
        self
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// View model type name for one entity and operation.
    pub fn view_model_name(&self, entity: &str, op: CrudOperation) -> String {
        op.view_model_name(entity, &self.view_model_suffix)
    }
}
