//! Writes missing view models as Rust struct source, one file per entity and operation.

use crate::config::CrudOptions;
use crate::discovery::EntityDescriptor;
use crate::error::GenerationError;
use crate::operation::CrudOperation;
use crate::reflect::TypeUniverse;
use crate::viewmodel::{project_entity, FieldDescriptor, ViewModelSet};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

/// Keywords that cannot be written as raw identifiers either.
const NOT_RAW: &[&str] = &["self", "Self", "super", "crate", "_"];

/// The field name as it must appear in source: plain, raw (`r#final`), or `None` when no Rust
/// identifier can spell it.
fn field_ident(name: &str) -> Option<String> {
    if syn::parse_str::<syn::Ident>(name).is_ok() {
        return Some(name.to_string());
    }
    if NOT_RAW.contains(&name) {
        return None;
    }
    let raw = format!("r#{}", name);
    syn::parse_str::<syn::Ident>(&raw).is_ok().then_some(raw)
}

/// `{output}/{Entity}ViewModels/{name}.rs`
pub fn view_model_path(output: &Path, entity: &str, name: &str) -> PathBuf {
    output
        .join(format!("{}ViewModels", entity))
        .join(format!("{}.rs", name))
}

pub fn render_view_model(
    entity: &str,
    op: CrudOperation,
    name: &str,
    fields: &[FieldDescriptor],
) -> String {
    let mut src = String::new();
    let _ = writeln!(src, "// {} view model for `{}`. Written once; edits are kept.", op, entity);
    let _ = writeln!(src, "use serde::{{Deserialize, Serialize}};");
    let _ = writeln!(src);
    let _ = writeln!(src, "#[derive(Debug, Clone, Serialize, Deserialize)]");
    let _ = writeln!(src, "pub struct {} {{", name);
    for f in fields {
        let Some(ident) = field_ident(&f.name) else {
            tracing::warn!(view_model = name, field = %f.name, "field name is not an identifier; skipped");
            continue;
        };
        let ty = if f.nullable {
            format!("Option<{}>", f.ty.type_name())
        } else {
            f.ty.type_name().to_string()
        };
        let _ = writeln!(src, "    pub {}: {},", ident, ty);
    }
    let _ = writeln!(src, "}}");
    src
}

/// Creates the file only if absent. Returns false when it already existed.
fn write_if_absent(path: &Path, source: &str) -> io::Result<bool> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(source.as_bytes())?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Default)]
pub struct EnsureReport {
    /// View model names absent from the set when ensuring started.
    pub missing: Vec<String>,
    pub written: Vec<PathBuf>,
    /// Files already on disk for missing view models; left untouched.
    pub existing: Vec<PathBuf>,
    pub failures: Vec<GenerationError>,
}

impl EnsureReport {
    pub fn needs_compilation(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// For every entity and operation, generate the view model source when the set lacks it.
/// Write failures are collected, never fatal here.
pub fn ensure_view_models(
    entities: &[EntityDescriptor],
    set: &ViewModelSet,
    options: &CrudOptions,
    universe: &TypeUniverse,
) -> EnsureReport {
    let mut report = EnsureReport::default();
    for entity in entities {
        let fields = project_entity(entity, universe);
        for op in CrudOperation::ALL {
            let name = options.view_model_name(&entity.name, op);
            if set.contains(&name) {
                continue;
            }
            report.missing.push(name.clone());
            let path = view_model_path(&options.view_model_output, &entity.name, &name);
            let source = render_view_model(&entity.name, op, &name, &fields);
            match write_if_absent(&path, &source) {
                Ok(true) => {
                    tracing::info!(view_model = %name, path = %path.display(), "view model generated");
                    report.written.push(path);
                }
                Ok(false) => {
                    tracing::debug!(view_model = %name, path = %path.display(), "view model file exists");
                    report.existing.push(path);
                }
                Err(source) => {
                    let err = GenerationError { path, source };
                    tracing::warn!(error = %err, "view model generation failed");
                    report.failures.push(err);
                }
            }
        }
    }
    report
}
