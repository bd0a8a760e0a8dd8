//! Repository contract resolution: exact name first, then generic-name prefix.

use crate::config::MethodNames;
use crate::dispatch::TypeKey;
use crate::error::ConfigError;
use crate::operation::CrudOperation;
use crate::reflect::{Module, TraitDef, TypeDef};

/// The generic persistence interface, with the method bound to each operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryContract {
    pub name: String,
    pub qualified_name: String,
    pub generic_params: Vec<String>,
    pub methods: MethodNames,
}

impl RepositoryContract {
    /// Identity of the contract closed over one entity, e.g. `Repository<Product>`.
    pub fn key_for(&self, entity: &str) -> TypeKey {
        TypeKey::new(self.base_name(), entity)
    }

    pub fn base_name(&self) -> &str {
        self.name.split(['<', '`']).next().unwrap_or(self.name.as_str())
    }

    pub fn method_for(&self, op: CrudOperation) -> &str {
        self.methods.for_operation(op)
    }
}

fn find_contract<'m>(module: &'m Module, name: &str) -> Option<(&'m TypeDef, &'m TraitDef)> {
    let traits = || {
        module
            .types
            .iter()
            .filter_map(|t| t.as_trait().map(|tr| (t, tr)))
    };
    traits()
        .find(|(t, _)| t.name == name || module.qualified_name(t) == name)
        .or_else(|| {
            let wanted = name.split(['<', '`']).next().unwrap_or(name);
            traits().find(|(t, tr)| !tr.generic_params.is_empty() && t.generic_base_name() == wanted)
        })
}

pub fn resolve_contract(
    module: &Module,
    name: &str,
    methods: &MethodNames,
) -> Result<RepositoryContract, ConfigError> {
    let (def, tr) = find_contract(module, name).ok_or_else(|| ConfigError::RepositoryNotFound {
        name: name.to_string(),
        module: module.id.clone(),
    })?;

    for op in CrudOperation::ALL {
        let method = methods.for_operation(op);
        if !tr.has_method(method) {
            return Err(ConfigError::MethodNotFound {
                contract: def.name.clone(),
                method: method.to_string(),
            });
        }
    }

    tracing::debug!(contract = %def.name, module = %module.id, "repository contract resolved");
    Ok(RepositoryContract {
        name: def.name.clone(),
        qualified_name: module.qualified_name(def),
        generic_params: tr.generic_params.clone(),
        methods: methods.clone(),
    })
}
