//! View models: field-list shapes per entity and operation, discovered from the view model module,
//! generated when missing, and used to structurally deserialize request bodies.

mod generator;
mod projection;

pub use generator::{ensure_view_models, render_view_model, view_model_path, EnsureReport};
pub use projection::{field_type, project_entity, project_property};

use crate::config::CrudOptions;
use crate::discovery::EntityDescriptor;
use crate::error::{AppError, ConfigError};
use crate::operation::CrudOperation;
use crate::reflect::{Module, Primitive, TypeUniverse};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewModelOrigin {
    /// Declared in the view model module.
    Discovered,
    /// Compiled from source in the output directory.
    Generated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Primitive(Primitive),
    /// Enum carried as its variant name. An empty variant list accepts any string.
    Enum { name: String, variants: Vec<String> },
}

impl FieldType {
    pub fn type_name(&self) -> &str {
        match self {
            FieldType::Primitive(p) => p.name(),
            FieldType::Enum { name, .. } => name,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Primitive(p) => p.accepts(value),
            FieldType::Enum { variants, .. } => match value.as_str() {
                Some(s) => variants.is_empty() || variants.iter().any(|v| v == s),
                None => false,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewModelShape {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub origin: ViewModelOrigin,
}

/// All view model shapes known by name: the view model module plus compiled units.
#[derive(Clone, Debug, Default)]
pub struct ViewModelSet {
    by_name: HashMap<String, Arc<ViewModelShape>>,
}

impl ViewModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapes of every struct declared in the view model module.
    pub fn from_module(module: &Module, universe: &TypeUniverse) -> Self {
        let mut set = ViewModelSet::new();
        for def in &module.types {
            let Some(s) = def.as_struct() else { continue };
            let fields = s
                .properties
                .iter()
                .filter_map(|p| project_property(p, universe))
                .collect();
            set.insert(ViewModelShape {
                name: def.name.clone(),
                fields,
                origin: ViewModelOrigin::Discovered,
            });
        }
        set
    }

    /// Adds a shape. An existing shape with the same name is kept.
    pub fn insert(&mut self, shape: ViewModelShape) -> bool {
        if self.by_name.contains_key(&shape.name) {
            return false;
        }
        self.by_name.insert(shape.name.clone(), Arc::new(shape));
        true
    }

    pub fn merge<I>(&mut self, shapes: I) -> usize
    where
        I: IntoIterator<Item = ViewModelShape>,
    {
        let mut added = 0;
        for shape in shapes {
            if self.insert(shape) {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ViewModelShape>> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// A shape bound to one entity and operation.
#[derive(Clone, Debug)]
pub struct ViewModelDescriptor {
    pub operation: CrudOperation,
    pub entity: String,
    pub shape: Arc<ViewModelShape>,
}

impl ViewModelDescriptor {
    pub fn name(&self) -> &str {
        &self.shape.name
    }

    pub fn origin(&self) -> ViewModelOrigin {
        self.shape.origin
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.shape.fields
    }

    /// Structural deserialization: the body must be an object whose declared fields have the
    /// declared JSON kinds. Undeclared keys are dropped; absent nullable fields stay absent.
    pub fn bind(&self, body: Value) -> Result<Value, AppError> {
        self.bind_fields(body, true)
    }

    /// As [`bind`](Self::bind), but absent fields are skipped whatever their nullability.
    pub fn bind_present(&self, body: Value) -> Result<Value, AppError> {
        self.bind_fields(body, false)
    }

    fn bind_fields(&self, body: Value, require: bool) -> Result<Value, AppError> {
        let Value::Object(mut input) = body else {
            return Err(AppError::BadRequest(format!("{} body must be a JSON object", self.name())));
        };
        let mut out = Map::new();
        for field in self.fields() {
            let Some(value) = input.remove(&field.name) else {
                if field.nullable || !require {
                    continue;
                }
                return Err(AppError::BadRequest(format!(
                    "{}: missing field `{}`",
                    self.name(),
                    field.name
                )));
            };
            if value.is_null() {
                if !field.nullable {
                    return Err(AppError::BadRequest(format!(
                        "{}: field `{}` cannot be null",
                        self.name(),
                        field.name
                    )));
                }
            } else if !field.ty.accepts(&value) {
                return Err(AppError::BadRequest(format!(
                    "{}: field `{}` expects {}",
                    self.name(),
                    field.name,
                    field.ty.type_name()
                )));
            }
            out.insert(field.name.clone(), value);
        }
        Ok(Value::Object(out))
    }
}

/// The five view models of one entity.
#[derive(Clone, Debug)]
pub struct EntityViewModels {
    pub entity: String,
    by_operation: HashMap<CrudOperation, ViewModelDescriptor>,
}

impl EntityViewModels {
    pub fn get(&self, op: CrudOperation) -> Option<&ViewModelDescriptor> {
        self.by_operation.get(&op)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewModelDescriptor> {
        CrudOperation::ALL
            .into_iter()
            .filter_map(move |op| self.by_operation.get(&op))
    }
}

fn nullability(nullable: bool) -> &'static str {
    if nullable {
        "nullable"
    } else {
        "non-null"
    }
}

/// Every view model field must be an entity property of the same type and nullability.
fn check_field(
    view_model: &str,
    field: &FieldDescriptor,
    entity: &EntityDescriptor,
    universe: &TypeUniverse,
) -> Result<(), ConfigError> {
    let Some(prop) = entity.property(&field.name) else {
        return Err(ConfigError::ViewModelMismatch {
            view_model: view_model.to_string(),
            field: field.name.clone(),
            entity: entity.name.clone(),
        });
    };
    let expected = field_type(prop, universe);
    let same_type = expected.as_ref().map(FieldType::type_name) == Some(field.ty.type_name());
    if same_type && prop.nullable == field.nullable {
        return Ok(());
    }
    let expected = match expected {
        Some(ty) => format!("{} {}", nullability(prop.nullable), ty.type_name()),
        None => "a reference".to_string(),
    };
    Err(ConfigError::ViewModelFieldType {
        view_model: view_model.to_string(),
        field: field.name.clone(),
        entity: entity.name.clone(),
        expected,
        found: format!("{} {}", nullability(field.nullable), field.ty.type_name()),
    })
}

/// Bind exactly one view model per operation to `entity`, checking each field against the
/// entity's properties.
pub fn resolve_view_models(
    entity: &EntityDescriptor,
    set: &ViewModelSet,
    options: &CrudOptions,
    universe: &TypeUniverse,
) -> Result<EntityViewModels, ConfigError> {
    let mut by_operation = HashMap::new();
    for op in CrudOperation::ALL {
        let name = options.view_model_name(&entity.name, op);
        let shape = set.get(&name).ok_or_else(|| ConfigError::MissingViewModel {
            entity: entity.name.clone(),
            operation: op,
            name: name.clone(),
        })?;
        for field in &shape.fields {
            check_field(&name, field, entity, universe)?;
        }
        by_operation.insert(
            op,
            ViewModelDescriptor {
                operation: op,
                entity: entity.name.clone(),
                shape: Arc::clone(shape),
            },
        );
    }
    Ok(EntityViewModels {
        entity: entity.name.clone(),
        by_operation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{PropertyDescriptor, PropertyType};
    use serde_json::json;

    fn product() -> EntityDescriptor {
        EntityDescriptor {
            name: "Product".into(),
            properties: vec![
                PropertyDescriptor {
                    name: "name".into(),
                    ty: PropertyType::Primitive(Primitive::String),
                    nullable: false,
                },
                PropertyDescriptor {
                    name: "status".into(),
                    ty: PropertyType::enumeration("Status"),
                    nullable: false,
                },
                PropertyDescriptor {
                    name: "note".into(),
                    ty: PropertyType::Primitive(Primitive::String),
                    nullable: true,
                },
            ],
            implements_marker: true,
        }
    }

    fn shape(name: &str, fields: Vec<FieldDescriptor>) -> ViewModelShape {
        ViewModelShape {
            name: name.into(),
            fields,
            origin: ViewModelOrigin::Generated,
        }
    }

    fn product_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor {
                name: "name".into(),
                ty: FieldType::Primitive(Primitive::String),
                nullable: false,
            },
            FieldDescriptor {
                name: "status".into(),
                ty: FieldType::Enum {
                    name: "Status".into(),
                    variants: vec!["Active".into(), "Retired".into()],
                },
                nullable: false,
            },
            FieldDescriptor {
                name: "note".into(),
                ty: FieldType::Primitive(Primitive::String),
                nullable: true,
            },
        ]
    }

    fn options() -> CrudOptions {
        CrudOptions::default().with_view_model_suffix("ViewModel")
    }

    fn full_set() -> ViewModelSet {
        let mut set = ViewModelSet::new();
        for op in CrudOperation::ALL {
            set.insert(shape(&options().view_model_name("Product", op), product_fields()));
        }
        set
    }

    #[test]
    fn resolves_one_view_model_per_operation() {
        let vms = resolve_view_models(&product(), &full_set(), &options(), &TypeUniverse::new()).expect("view models");
        assert_eq!(vms.iter().count(), 5);
        assert_eq!(vms.get(CrudOperation::Get).expect("get").name(), "ProductGetViewModel");
    }

    #[test]
    fn missing_operation_is_reported() {
        let mut set = ViewModelSet::new();
        set.insert(shape("ProductCreateViewModel", product_fields()));
        let err = resolve_view_models(&product(), &set, &options(), &TypeUniverse::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingViewModel { operation: CrudOperation::Update, .. }));
    }

    #[test]
    fn fields_outside_the_entity_are_rejected() {
        let mut set = full_set();
        let mut by_name = std::mem::take(&mut set.by_name);
        let mut fields = product_fields();
        fields.push(FieldDescriptor {
            name: "discount".into(),
            ty: FieldType::Primitive(Primitive::Float64),
            nullable: true,
        });
        by_name.insert("ProductCreateViewModel".into(), Arc::new(shape("ProductCreateViewModel", fields)));
        set.by_name = by_name;
        let err = resolve_view_models(&product(), &set, &options(), &TypeUniverse::new()).unwrap_err();
        assert!(matches!(err, ConfigError::ViewModelMismatch { ref field, .. } if field == "discount"));
    }

    #[test]
    fn field_types_and_nullability_must_match_the_entity() {
        let with_fields = |fields: Vec<FieldDescriptor>| {
            let mut set = ViewModelSet::new();
            for op in CrudOperation::ALL {
                set.insert(shape(&options().view_model_name("Product", op), fields.clone()));
            }
            set
        };

        let mut retyped = product_fields();
        retyped[0].ty = FieldType::Primitive(Primitive::Int32);
        let err = resolve_view_models(&product(), &with_fields(retyped), &options(), &TypeUniverse::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ViewModelFieldType { ref field, ref found, .. } if field == "name" && found == "non-null i32"
        ));

        let mut loosened = product_fields();
        loosened[0].nullable = true;
        let err = resolve_view_models(&product(), &with_fields(loosened), &options(), &TypeUniverse::new()).unwrap_err();
        assert!(matches!(err, ConfigError::ViewModelFieldType { ref expected, .. } if expected == "non-null String"));

        let mut renamed_enum = product_fields();
        renamed_enum[1].ty = FieldType::Enum {
            name: "Stage".into(),
            variants: vec![],
        };
        let err =
            resolve_view_models(&product(), &with_fields(renamed_enum), &options(), &TypeUniverse::new()).unwrap_err();
        assert!(matches!(err, ConfigError::ViewModelFieldType { ref field, .. } if field == "status"));
    }

    #[test]
    fn insert_keeps_the_first_shape() {
        let mut set = ViewModelSet::new();
        assert!(set.insert(shape("ProductGetViewModel", product_fields())));
        assert!(!set.insert(shape("ProductGetViewModel", Vec::new())));
        assert_eq!(set.get("ProductGetViewModel").expect("shape").fields.len(), 3);
    }

    #[test]
    fn bind_projects_declared_fields() {
        let vms = resolve_view_models(&product(), &full_set(), &options(), &TypeUniverse::new()).expect("view models");
        let create = vms.get(CrudOperation::Create).expect("create");
        let bound = create
            .bind(json!({ "name": "Lamp", "status": "Active", "sku": "X-1" }))
            .expect("bound");
        assert_eq!(bound, json!({ "name": "Lamp", "status": "Active" }));
        let with_null = create
            .bind(json!({ "name": "Lamp", "status": "Active", "note": null }))
            .expect("bound");
        assert_eq!(with_null["note"], Value::Null);
    }

    #[test]
    fn bind_rejects_structural_mismatches() {
        let vms = resolve_view_models(&product(), &full_set(), &options(), &TypeUniverse::new()).expect("view models");
        let create = vms.get(CrudOperation::Create).expect("create");
        assert!(create.bind(json!(["Lamp"])).is_err());
        assert!(create.bind(json!({ "status": "Active" })).is_err());
        assert!(create.bind(json!({ "name": 7, "status": "Active" })).is_err());
        assert!(create.bind(json!({ "name": "Lamp", "status": "Broken" })).is_err());
    }

    #[test]
    fn bind_present_checks_only_the_fields_sent() {
        let vms = resolve_view_models(&product(), &full_set(), &options(), &TypeUniverse::new()).expect("view models");
        let delete = vms.get(CrudOperation::Delete).expect("delete");
        assert_eq!(delete.bind_present(json!({ "status": "Retired" })).expect("bound"), json!({ "status": "Retired" }));
        assert!(delete.bind_present(json!({ "name": 7 })).is_err());
        assert!(delete.bind_present(json!({ "name": null })).is_err());
    }
}
