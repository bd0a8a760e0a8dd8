//! Request extractors for the synthesized routes.

pub mod id;

pub use id::{parse_id, DeleteQuery, EntityId};
