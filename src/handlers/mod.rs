//! HTTP handlers for the synthesized entity routes.

pub mod entity;

pub use entity::EntityRoute;
