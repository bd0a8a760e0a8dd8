//! Load options from a JSON file or from `CRUD_*` environment variables.

use crate::config::types::{CrudOptions, DiscoveryMode, MethodNames, ReferenceScope};
use crate::config::validate_options;
use crate::error::ConfigError;
use std::path::Path;

/// Parse and validate options from JSON text.
pub fn options_from_json(text: &str) -> Result<CrudOptions, ConfigError> {
    let options: CrudOptions =
        serde_json::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
    validate_options(&options)?;
    Ok(options)
}

impl CrudOptions {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        options_from_json(&text)
    }

    /// Read options from `CRUD_*` variables. Call `dotenvy::dotenv()` first to honour a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| ConfigError::Load(format!("{} is not set", key)))
        };
        let flag = |key: &str, default: bool| -> Result<bool, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(v) => v
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| ConfigError::Load(format!("{} must be true or false", key))),
            }
        };

        let defaults = MethodNames::default();
        let mut options = CrudOptions {
            domain_module: required("CRUD_DOMAIN_MODULE")?,
            view_model_module: required("CRUD_VIEW_MODEL_MODULE")?,
            repository_module: required("CRUD_REPOSITORY_MODULE")?,
            repository_name: required("CRUD_REPOSITORY_NAME")?,
            marker_name: required("CRUD_MARKER_NAME")?,
            view_model_suffix: required("CRUD_VIEW_MODEL_SUFFIX")?,
            view_model_output: required("CRUD_VIEW_MODEL_OUTPUT")?.into(),
            methods: MethodNames {
                get_list: lookup("CRUD_GET_LIST_METHOD").unwrap_or(defaults.get_list),
                get: lookup("CRUD_GET_METHOD").unwrap_or(defaults.get),
                create: lookup("CRUD_CREATE_METHOD").unwrap_or(defaults.create),
                update: lookup("CRUD_UPDATE_METHOD").unwrap_or(defaults.update),
                delete: lookup("CRUD_DELETE_METHOD").unwrap_or(defaults.delete),
            },
            authentication_required: flag("CRUD_AUTHENTICATION_REQUIRED", false)?,
            authorization_policy: lookup("CRUD_AUTHORIZATION_POLICY").filter(|s| !s.is_empty()),
            response_data_member: lookup("CRUD_RESPONSE_DATA_MEMBER").filter(|s| !s.is_empty()),
            camel_case_json: flag("CRUD_CAMEL_CASE_JSON", false)?,
            ..CrudOptions::default()
        };
        if let Some(mode) = lookup("CRUD_DISCOVERY") {
            options.discovery = match mode.as_str() {
                "marker" => DiscoveryMode::Marker,
                "name_inference" => DiscoveryMode::NameInference,
                other => return Err(ConfigError::Load(format!("unknown CRUD_DISCOVERY '{}'", other))),
            };
        }
        if let Some(scope) = lookup("CRUD_REFERENCE_SCOPE") {
            options.reference_scope = match scope.as_str() {
                "all_loaded" => ReferenceScope::AllLoaded,
                "primitives" => ReferenceScope::Primitives,
                other => {
                    return Err(ConfigError::Load(format!("unknown CRUD_REFERENCE_SCOPE '{}'", other)))
                }
            };
        }
        if let Some(limit) = lookup("CRUD_BODY_LIMIT") {
            options.body_limit = limit
                .parse()
                .map_err(|_| ConfigError::Load("CRUD_BODY_LIMIT must be a byte count".into()))?;
        }
        validate_options(&options)?;
        Ok(options)
    }
}
