//! Compiles the view model sources under the output directory into one unit of field-list shapes.
//!
//! Every `.rs` file under the directory is re-read, parsed with `syn`, and its struct
//! declarations are resolved against the loaded type universe. Any error fails the whole unit.

mod resolve;

use crate::config::ReferenceScope;
use crate::error::{CompilationError, Diagnostic};
use crate::reflect::TypeUniverse;
use crate::viewmodel::{FieldDescriptor, ViewModelOrigin, ViewModelShape};
use proc_macro2::Span;
use resolve::{resolve_field_type, TypeScope};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Fields, Item};

/// Name given to units produced by [`compile_view_models`].
pub const UNIT_NAME: &str = "generated_view_models";

#[derive(Clone, Debug)]
pub struct CompiledUnit {
    pub name: String,
    pub sources: Vec<PathBuf>,
    pub types: Vec<ViewModelShape>,
}

/// All `.rs` files below `dir`, sorted by path. A missing directory yields no files.
pub fn collect_sources(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if !dir.exists() {
        return Ok(out);
    }
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

pub(crate) fn diagnostic(file: &Path, span: Span, message: impl Into<String>) -> Diagnostic {
    let start = span.start();
    Diagnostic {
        file: file.to_path_buf(),
        line: start.line,
        column: start.column,
        message: message.into(),
    }
}

struct UnitBuilder<'u> {
    scope: TypeScope<'u>,
    types: Vec<ViewModelShape>,
    declared: HashMap<String, PathBuf>,
    diagnostics: Vec<Diagnostic>,
}

impl UnitBuilder<'_> {
    fn compile_file(&mut self, path: &Path, text: &str) {
        let file = match syn::parse_file(text) {
            Ok(file) => file,
            Err(err) => {
                for e in err {
                    self.diagnostics.push(diagnostic(path, e.span(), e.to_string()));
                }
                return;
            }
        };
        for item in &file.items {
            match item {
                Item::Use(_) => {}
                Item::Struct(s) => self.compile_struct(path, s),
                other => self.diagnostics.push(diagnostic(
                    path,
                    other.span(),
                    "only struct and `use` items are allowed in view model sources",
                )),
            }
        }
    }

    fn compile_struct(&mut self, path: &Path, s: &syn::ItemStruct) {
        let name = s.ident.unraw().to_string();
        if !s.generics.params.is_empty() {
            self.diagnostics.push(diagnostic(
                path,
                s.generics.span(),
                format!("view model `{}` cannot be generic", name),
            ));
            return;
        }
        if let Some(first) = self.declared.get(&name) {
            self.diagnostics.push(diagnostic(
                path,
                s.ident.span(),
                format!("view model `{}` is already defined in {}", name, first.display()),
            ));
            return;
        }

        let mut fields = Vec::new();
        let mut failed = false;
        match &s.fields {
            Fields::Named(named) => {
                for field in &named.named {
                    let Some(ident) = &field.ident else { continue };
                    match resolve_field_type(&field.ty, &self.scope) {
                        Ok((ty, nullable)) => fields.push(FieldDescriptor {
                            name: ident.unraw().to_string(),
                            ty,
                            nullable,
                        }),
                        Err((span, message)) => {
                            failed = true;
                            self.diagnostics.push(diagnostic(path, span, message));
                        }
                    }
                }
            }
            Fields::Unit => {}
            Fields::Unnamed(unnamed) => {
                self.diagnostics.push(diagnostic(
                    path,
                    unnamed.span(),
                    format!("view model `{}` must use named fields", name),
                ));
                return;
            }
        }
        self.declared.insert(name.clone(), path.to_path_buf());
        if !failed {
            self.types.push(ViewModelShape {
                name,
                fields,
                origin: ViewModelOrigin::Generated,
            });
        }
    }
}

/// Compile every view model source under `dir` as one unit.
pub fn compile_view_models(
    dir: &Path,
    universe: &TypeUniverse,
    scope: ReferenceScope,
) -> Result<CompiledUnit, CompilationError> {
    let sources = collect_sources(dir).map_err(|e| CompilationError {
        diagnostics: vec![Diagnostic {
            file: dir.to_path_buf(),
            line: 0,
            column: 0,
            message: format!("cannot read view model directory: {}", e),
        }],
    })?;

    let mut unit = UnitBuilder {
        scope: TypeScope::new(universe, scope),
        types: Vec::new(),
        declared: HashMap::new(),
        diagnostics: Vec::new(),
    };
    for path in &sources {
        match std::fs::read_to_string(path) {
            Ok(text) => unit.compile_file(path, &text),
            Err(e) => unit.diagnostics.push(Diagnostic {
                file: path.clone(),
                line: 0,
                column: 0,
                message: format!("cannot read source: {}", e),
            }),
        }
    }

    if !unit.diagnostics.is_empty() {
        for d in &unit.diagnostics {
            tracing::error!("{}", d);
        }
        return Err(CompilationError {
            diagnostics: unit.diagnostics,
        });
    }

    tracing::info!(files = sources.len(), types = unit.types.len(), "view models compiled");
    Ok(CompiledUnit {
        name: UNIT_NAME.to_string(),
        sources,
        types: unit.types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{Module, Primitive, TypeDef};
    use crate::viewmodel::FieldType;

    fn universe() -> TypeUniverse {
        TypeUniverse::new()
            .with_module(Module::new("shop.domain").with_type(TypeDef::enumeration("Status", ["Active", "Retired"])))
    }

    fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, text).expect("write");
        path
    }

    #[test]
    fn compiles_every_file_under_the_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "ProductViewModels/ProductCreateViewModel.rs",
            "use serde::{Deserialize, Serialize};\n\
             #[derive(Debug, Clone, Serialize, Deserialize)]\n\
             pub struct ProductCreateViewModel {\n    pub name: String,\n    pub status: Status,\n    pub note: Option<String>,\n}\n",
        );
        write(
            dir.path(),
            "CategoryViewModels/CategoryGetViewModel.rs",
            "pub struct CategoryGetViewModel { pub r#type: i64 }\n",
        );

        let unit = compile_view_models(dir.path(), &universe(), ReferenceScope::AllLoaded).expect("unit");
        assert_eq!(unit.sources.len(), 2);
        let names: Vec<_> = unit.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["CategoryGetViewModel", "ProductCreateViewModel"]);

        let product = &unit.types[1];
        assert_eq!(product.fields[0].ty, FieldType::Primitive(Primitive::String));
        assert!(matches!(product.fields[1].ty, FieldType::Enum { ref name, .. } if name == "Status"));
        assert!(product.fields[2].nullable);
        assert_eq!(unit.types[0].fields[0].name, "type");
    }

    #[test]
    fn unknown_types_produce_positioned_diagnostics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "ProductViewModels/ProductGetViewModel.rs",
            "pub struct ProductGetViewModel {\n    pub name: String,\n    pub category: Category,\n}\n",
        );
        let err = compile_view_models(dir.path(), &universe(), ReferenceScope::AllLoaded).unwrap_err();
        assert_eq!(err.diagnostics.len(), 1);
        let d = &err.diagnostics[0];
        assert_eq!(d.file, path);
        assert_eq!(d.line, 3);
        assert!(d.message.contains("Category"));
    }

    #[test]
    fn primitive_scope_rejects_enums() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "A/ProductGetViewModel.rs", "pub struct ProductGetViewModel { pub status: Status }\n");
        assert!(compile_view_models(dir.path(), &universe(), ReferenceScope::Primitives).is_err());
        assert!(compile_view_models(dir.path(), &universe(), ReferenceScope::AllLoaded).is_ok());
    }

    #[test]
    fn syntax_errors_and_logic_items_fail_the_unit() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "A/Broken.rs", "pub struct Broken {\n");
        write(dir.path(), "B/Logic.rs", "fn helper() {}\n");
        let err = compile_view_models(dir.path(), &universe(), ReferenceScope::AllLoaded).unwrap_err();
        assert_eq!(err.diagnostics.len(), 2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "A/One.rs", "pub struct ProductGetViewModel { pub name: String }\n");
        write(dir.path(), "B/Two.rs", "pub struct ProductGetViewModel { pub name: String }\n");
        let err = compile_view_models(dir.path(), &universe(), ReferenceScope::AllLoaded).unwrap_err();
        assert!(err.diagnostics[0].message.contains("already defined"));
    }

    #[test]
    fn missing_directory_compiles_to_an_empty_unit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = compile_view_models(&dir.path().join("absent"), &universe(), ReferenceScope::AllLoaded)
            .expect("unit");
        assert!(unit.types.is_empty());
    }
}
