//! Type-erased dispatch from routes to persistence methods.

mod adapter;
mod cache;
mod method;

pub use adapter::{DispatchAdapter, DispatchInput, DispatchOutput};
pub use cache::{DispatchRegistry, TypeKey};
pub use method::{ErasedMethod, MethodCatalog, MethodFuture, MethodShape, MethodTable};
