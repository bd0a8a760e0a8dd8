//! Entities are the concrete structs implementing the marker capability.

use crate::discovery::{DiscoveryContext, DiscoveryStrategy, EntityDescriptor};
use crate::error::ConfigError;
use std::collections::HashSet;

pub struct MarkerStrategy;

impl DiscoveryStrategy for MarkerStrategy {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn discover_entities(&self, ctx: &DiscoveryContext<'_>) -> Result<Vec<EntityDescriptor>, ConfigError> {
        let marker = ctx.options.marker_name.as_str();
        let declared = ctx
            .domain
            .find(marker)
            .and_then(|t| t.as_trait())
            .is_some();
        if !declared {
            return Err(ConfigError::MarkerNotFound {
                marker: marker.to_string(),
                module: ctx.domain.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        let mut entities = Vec::new();
        for def in &ctx.domain.types {
            let Some(s) = def.as_struct() else { continue };
            if s.is_abstract || !s.implements(marker) {
                continue;
            }
            if seen.insert(def.name.as_str()) {
                entities.push(EntityDescriptor::from_struct(&def.name, s, marker));
            }
        }
        Ok(entities)
    }
}
