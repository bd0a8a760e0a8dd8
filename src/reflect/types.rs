//! Type definitions held by the universe: structs, enums and traits, plus the primitive set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scalar types a view model field may carry directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    String,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Uuid,
    DateTime,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::String,
        Primitive::Bool,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::Uuid,
        Primitive::DateTime,
    ];

    /// Type name written into generated view model source.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "String",
            Primitive::Bool => "bool",
            Primitive::Int32 => "i32",
            Primitive::Int64 => "i64",
            Primitive::Float32 => "f32",
            Primitive::Float64 => "f64",
            Primitive::Uuid => "Uuid",
            Primitive::DateTime => "DateTime",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Structural check of a JSON value against this primitive.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Primitive::String => value.is_string(),
            Primitive::Bool => value.is_boolean(),
            Primitive::Int32 => value
                .as_i64()
                .map(|n| i32::try_from(n).is_ok())
                .unwrap_or(false),
            Primitive::Int64 => value.as_i64().is_some(),
            Primitive::Float32 | Primitive::Float64 => value.is_number(),
            Primitive::Uuid => value
                .as_str()
                .map(|s| uuid::Uuid::parse_str(s).is_ok())
                .unwrap_or(false),
            Primitive::DateTime => value
                .as_str()
                .map(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
                .unwrap_or(false),
        }
    }
}

/// Semantic type tag of an entity property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Primitive(Primitive),
    /// Enum declared somewhere in the universe, by type name.
    Enum(String),
    /// Any other named type (nested entity, collection, ...).
    Reference(String),
}

impl PropertyType {
    pub fn enumeration(name: impl Into<String>) -> Self {
        PropertyType::Enum(name.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        PropertyType::Reference(name.into())
    }
}

impl From<Primitive> for PropertyType {
    fn from(p: Primitive) -> Self {
        PropertyType::Primitive(p)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: PropertyType,
    pub nullable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct StructDef {
    pub properties: Vec<PropertyDescriptor>,
    /// Names of the traits (capabilities) this struct implements.
    pub implements: Vec<String>,
    pub is_abstract: bool,
}

impl StructDef {
    pub fn implements(&self, capability: &str) -> bool {
        self.implements.iter().any(|c| c == capability)
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnumDef {
    pub variants: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TraitDef {
    pub generic_params: Vec<String>,
    pub methods: Vec<String>,
}

impl TraitDef {
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    Struct(StructDef),
    Enum(EnumDef),
    Trait(TraitDef),
}

#[derive(Clone, Debug)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
}

impl TypeDef {
    pub fn structure(name: impl Into<String>) -> StructBuilder {
        StructBuilder {
            name: name.into(),
            def: StructDef::default(),
        }
    }

    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> TypeDef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeDef {
            name: name.into(),
            kind: TypeKind::Enum(EnumDef {
                variants: variants.into_iter().map(Into::into).collect(),
            }),
        }
    }

    /// A method-less trait, e.g. an entity marker.
    pub fn marker(name: impl Into<String>) -> TypeDef {
        TypeDef {
            name: name.into(),
            kind: TypeKind::Trait(TraitDef::default()),
        }
    }

    /// A generic trait with named methods, e.g. a repository contract.
    pub fn contract<G, M>(name: impl Into<String>, generic_params: G, methods: M) -> TypeDef
    where
        G: IntoIterator,
        G::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        TypeDef {
            name: name.into(),
            kind: TypeKind::Trait(TraitDef {
                generic_params: generic_params.into_iter().map(Into::into).collect(),
                methods: methods.into_iter().map(Into::into).collect(),
            }),
        }
    }

    pub fn as_struct(&self) -> Option<&StructDef> {
        match &self.kind {
            TypeKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDef> {
        match &self.kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_trait(&self) -> Option<&TraitDef> {
        match &self.kind {
            TypeKind::Trait(t) => Some(t),
            _ => None,
        }
    }

    /// Name without generic arity: `Repository<T>` and ``Repository`1`` both give `Repository`.
    pub fn generic_base_name(&self) -> &str {
        self.name
            .split(['<', '`'])
            .next()
            .unwrap_or(self.name.as_str())
    }
}

pub struct StructBuilder {
    name: String,
    def: StructDef,
}

impl StructBuilder {
    pub fn implements(mut self, capability: impl Into<String>) -> Self {
        self.def.implements.push(capability.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, ty: impl Into<PropertyType>) -> Self {
        self.def.properties.push(PropertyDescriptor {
            name: name.into(),
            ty: ty.into(),
            nullable: false,
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, ty: impl Into<PropertyType>) -> Self {
        self.def.properties.push(PropertyDescriptor {
            name: name.into(),
            ty: ty.into(),
            nullable: true,
        });
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.def.is_abstract = true;
        self
    }

    pub fn build(self) -> TypeDef {
        TypeDef {
            name: self.name,
            kind: TypeKind::Struct(self.def),
        }
    }
}

/// Types that can describe themselves to the universe.
pub trait Reflect {
    fn type_def() -> TypeDef;
}
