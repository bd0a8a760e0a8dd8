//! Schema discovery: entities from the domain module and the repository contract from the
//! persistence module. Read-only over the type universe.

mod contract;
mod inferred;
mod marker;

pub use contract::{resolve_contract, RepositoryContract};
pub use inferred::NameInferenceStrategy;
pub use marker::MarkerStrategy;

use crate::config::{CrudOptions, DiscoveryMode};
use crate::error::ConfigError;
use crate::reflect::{Module, PropertyDescriptor, StructDef, TypeUniverse};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub name: String,
    pub properties: Vec<PropertyDescriptor>,
    /// Whether the struct implements the configured marker capability.
    pub implements_marker: bool,
}

impl EntityDescriptor {
    pub(crate) fn from_struct(name: &str, def: &StructDef, marker: &str) -> Self {
        EntityDescriptor {
            name: name.to_string(),
            properties: def.properties.clone(),
            implements_marker: def.implements(marker),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Modules and conventions a strategy reads from.
pub struct DiscoveryContext<'a> {
    pub domain: &'a Module,
    pub view_models: &'a Module,
    pub options: &'a CrudOptions,
}

/// One way of deciding which domain types are entities.
pub trait DiscoveryStrategy {
    fn name(&self) -> &'static str;

    /// Entities in declaration order, one per distinct type name. May be empty; the caller
    /// turns an empty result into `ConfigError::NoEntities`.
    fn discover_entities(&self, ctx: &DiscoveryContext<'_>) -> Result<Vec<EntityDescriptor>, ConfigError>;
}

pub fn strategy_for(mode: DiscoveryMode) -> Box<dyn DiscoveryStrategy> {
    match mode {
        DiscoveryMode::Marker => Box::new(MarkerStrategy),
        DiscoveryMode::NameInference => Box::new(NameInferenceStrategy),
    }
}

#[derive(Clone, Debug)]
pub struct Discovery {
    pub entities: Vec<EntityDescriptor>,
    pub contract: RepositoryContract,
}

pub(crate) fn module<'a>(
    universe: &'a TypeUniverse,
    role: &'static str,
    id: &str,
) -> Result<&'a Module, ConfigError> {
    universe.module(id).ok_or_else(|| ConfigError::ModuleNotFound {
        role,
        id: id.to_string(),
    })
}

/// Resolve entities with the configured strategy and the repository contract.
pub fn discover(options: &CrudOptions, universe: &TypeUniverse) -> Result<Discovery, ConfigError> {
    let domain = module(universe, "domain", &options.domain_module)?;
    let view_models = module(universe, "view model", &options.view_model_module)?;
    let persistence = module(universe, "repository", &options.repository_module)?;

    let strategy = strategy_for(options.discovery);
    let ctx = DiscoveryContext {
        domain,
        view_models,
        options,
    };
    let entities = strategy.discover_entities(&ctx)?;
    if entities.is_empty() {
        return Err(ConfigError::NoEntities {
            module: domain.id.clone(),
        });
    }
    tracing::info!(
        strategy = strategy.name(),
        count = entities.len(),
        module = %domain.id,
        "entities discovered"
    );

    let contract = resolve_contract(persistence, &options.repository_name, &options.methods)?;
    Ok(Discovery { entities, contract })
}
