//! Option validation: required fields present and names usable as type or method identifiers.

use crate::config::CrudOptions;
use crate::error::ConfigError;
use regex::Regex;

const IDENT_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";
/// Contract names may carry generic arity: `Repository`, `Repository<T>`, ``Repository`1``.
const CONTRACT_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*(<[A-Za-z_][A-Za-z0-9_, ]*>|`[0-9]+)?$";

fn require(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_ident(re: &Regex, field: &str, value: &str) -> Result<(), ConfigError> {
    require(field, value)?;
    if !re.is_match(value) {
        return Err(ConfigError::Validation(format!(
            "{} '{}' is not a valid identifier",
            field, value
        )));
    }
    Ok(())
}

pub fn validate_options(options: &CrudOptions) -> Result<(), ConfigError> {
    let ident = Regex::new(IDENT_PATTERN).map_err(|e| ConfigError::Validation(e.to_string()))?;
    let contract = Regex::new(CONTRACT_PATTERN).map_err(|e| ConfigError::Validation(e.to_string()))?;

    require("domain_module", &options.domain_module)?;
    require("view_model_module", &options.view_model_module)?;
    require("repository_module", &options.repository_module)?;
    require_ident(&contract, "repository_name", &options.repository_name)?;
    require_ident(&ident, "marker_name", &options.marker_name)?;
    require_ident(&ident, "view_model_suffix", &options.view_model_suffix)?;
    if options.view_model_output.as_os_str().is_empty() {
        return Err(ConfigError::Validation("view_model_output is required".into()));
    }

    let m = &options.methods;
    for (field, value) in [
        ("get_list_method", &m.get_list),
        ("get_method", &m.get),
        ("create_method", &m.create),
        ("update_method", &m.update),
        ("delete_method", &m.delete),
    ] {
        require_ident(&ident, field, value)?;
    }

    if let Some(policy) = &options.authorization_policy {
        require("authorization_policy", policy)?;
    }
    if let Some(member) = &options.response_data_member {
        require_ident(&ident, "response_data_member", member)?;
    }
    if options.body_limit == 0 {
        return Err(ConfigError::Validation("body_limit must be greater than zero".into()));
    }
    Ok(())
}
