//! Entity property → view model field projection.
//!
//! Primitives keep their primitive type, enums keep their declared name, and reference-typed
//! properties (nested entities, collections) are omitted.

use crate::discovery::EntityDescriptor;
use crate::reflect::{PropertyDescriptor, PropertyType, TypeUniverse};
use crate::viewmodel::{FieldDescriptor, FieldType};

/// The view model type of a property; `None` for references.
pub fn field_type(prop: &PropertyDescriptor, universe: &TypeUniverse) -> Option<FieldType> {
    match &prop.ty {
        PropertyType::Primitive(p) => Some(FieldType::Primitive(*p)),
        PropertyType::Enum(name) => Some(FieldType::Enum {
            name: name.clone(),
            variants: universe
                .find_enum(name)
                .map(|e| e.variants.clone())
                .unwrap_or_default(),
        }),
        PropertyType::Reference(_) => None,
    }
}

pub fn project_property(prop: &PropertyDescriptor, universe: &TypeUniverse) -> Option<FieldDescriptor> {
    let Some(ty) = field_type(prop, universe) else {
        tracing::warn!(property = %prop.name, ty = ?prop.ty, "reference property omitted from view model");
        return None;
    };
    Some(FieldDescriptor {
        name: prop.name.clone(),
        ty,
        nullable: prop.nullable,
    })
}

/// One field per projectable entity property, in declaration order.
pub fn project_entity(entity: &EntityDescriptor, universe: &TypeUniverse) -> Vec<FieldDescriptor> {
    entity
        .properties
        .iter()
        .filter_map(|p| project_property(p, universe))
        .collect()
}
