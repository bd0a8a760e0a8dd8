//! Runtime type catalog standing in for reflection: domain, view model and persistence layers
//! describe their types here once, and discovery reads them.

pub mod types;
pub mod universe;

pub use types::*;
pub use universe::*;
