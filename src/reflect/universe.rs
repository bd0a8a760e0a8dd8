//! The loaded type universe: named modules of type definitions, registered once at startup.

use crate::reflect::types::{EnumDef, Reflect, TypeDef};

#[derive(Clone, Debug)]
pub struct Module {
    pub id: String,
    pub types: Vec<TypeDef>,
}

impl Module {
    pub fn new(id: impl Into<String>) -> Self {
        Module {
            id: id.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.types.push(def);
        self
    }

    pub fn register<T: Reflect>(self) -> Self {
        self.with_type(T::type_def())
    }

    pub fn find(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Fully qualified type name, `module.Type`.
    pub fn qualified_name(&self, def: &TypeDef) -> String {
        format!("{}.{}", self.id, def.name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TypeUniverse {
    modules: Vec<Module>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.add_module(module);
        self
    }

    /// Adds a module; a module with the same id is extended rather than duplicated.
    pub fn add_module(&mut self, module: Module) {
        match self.modules.iter_mut().find(|m| m.id == module.id) {
            Some(existing) => existing.types.extend(module.types),
            None => self.modules.push(module),
        }
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// First enum with this name across all loaded modules.
    pub fn find_enum(&self, name: &str) -> Option<&EnumDef> {
        self.modules
            .iter()
            .flat_map(|m| m.types.iter())
            .filter(|t| t.name == name)
            .find_map(TypeDef::as_enum)
    }
}
