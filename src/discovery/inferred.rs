//! Entities inferred from view model names: `ProductCreateViewModel` names `Product`, kept when the
//! domain module declares a concrete `Product` struct.

use crate::discovery::{DiscoveryContext, DiscoveryStrategy, EntityDescriptor};
use crate::error::ConfigError;
use crate::operation::CrudOperation;
use std::collections::HashSet;

pub struct NameInferenceStrategy;

impl NameInferenceStrategy {
    fn entity_prefix<'n>(name: &'n str, suffix: &str) -> Option<&'n str> {
        CrudOperation::ALL.into_iter().find_map(|op| {
            let tail = format!("{}{}", op.as_str(), suffix);
            name.strip_suffix(tail.as_str()).filter(|p| !p.is_empty())
        })
    }
}

impl DiscoveryStrategy for NameInferenceStrategy {
    fn name(&self) -> &'static str {
        "name_inference"
    }

    fn discover_entities(&self, ctx: &DiscoveryContext<'_>) -> Result<Vec<EntityDescriptor>, ConfigError> {
        let suffix = ctx.options.view_model_suffix.as_str();
        let marker = ctx.options.marker_name.as_str();
        let mut seen = HashSet::new();
        let mut entities = Vec::new();
        for vm in &ctx.view_models.types {
            if vm.as_struct().is_none() {
                continue;
            }
            let Some(prefix) = Self::entity_prefix(&vm.name, suffix) else { continue };
            if seen.contains(prefix) {
                continue;
            }
            let Some(def) = ctx.domain.find(prefix).and_then(|t| t.as_struct()) else {
                tracing::debug!(view_model = %vm.name, entity = prefix, "no domain struct for view model");
                continue;
            };
            if def.is_abstract {
                continue;
            }
            seen.insert(prefix.to_string());
            entities.push(EntityDescriptor::from_struct(prefix, def, marker));
        }
        Ok(entities)
    }
}
