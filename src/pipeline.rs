//! Startup pipeline: discover, ensure view models, compile what was generated, and bind one
//! view model per entity and operation. Runs once, synchronously, before any route exists.

use crate::compiler::{compile_view_models, CompiledUnit};
use crate::config::{validate_options, CrudOptions};
use crate::discovery::{self, discover, Discovery, EntityDescriptor};
use crate::dispatch::TypeKey;
use crate::error::StartupError;
use crate::reflect::TypeUniverse;
use crate::viewmodel::{ensure_view_models, resolve_view_models, EnsureReport, EntityViewModels, ViewModelSet};

#[derive(Debug)]
pub struct Prepared {
    pub discovery: Discovery,
    /// In entity order.
    pub view_models: Vec<EntityViewModels>,
    pub report: EnsureReport,
    /// Present when a view model was missing and the output directory was compiled.
    pub compiled: Option<CompiledUnit>,
}

impl Prepared {
    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.discovery.entities
    }

    pub fn view_models_for(&self, entity: &str) -> Option<&EntityViewModels> {
        self.view_models.iter().find(|v| v.entity == entity)
    }

    pub fn key_for(&self, entity: &str) -> TypeKey {
        self.discovery.contract.key_for(entity)
    }
}

pub fn prepare(options: &CrudOptions, universe: &TypeUniverse) -> Result<Prepared, StartupError> {
    validate_options(options)?;
    let discovery = discover(options, universe)?;

    let module = discovery::module(universe, "view model", &options.view_model_module)?;
    let mut set = ViewModelSet::from_module(module, universe);
    let report = ensure_view_models(&discovery.entities, &set, options, universe);
    tracing::info!(
        missing = report.missing.len(),
        written = report.written.len(),
        failed = report.failures.len(),
        "view models ensured"
    );

    let compiled = if report.needs_compilation() {
        let unit = compile_view_models(&options.view_model_output, universe, options.reference_scope)?;
        let added = set.merge(unit.types.iter().cloned());
        tracing::info!(unit = %unit.name, added, "compiled view models merged");
        Some(unit)
    } else {
        None
    };

    let view_models = discovery
        .entities
        .iter()
        .map(|entity| resolve_view_models(entity, &set, options, universe))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Prepared {
        discovery,
        view_models,
        report,
        compiled,
    })
}
