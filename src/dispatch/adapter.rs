//! Uniform invocation adapters: one bound method, one call shape per operation.

use crate::dispatch::method::{ErasedMethod, IdMethod, MethodShape, NullaryMethod, PayloadMethod};
use crate::error::{ConfigError, PersistenceError};
use crate::operation::CrudOperation;
use crate::provider::ServiceInstance;
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone)]
enum Bound {
    /// Zero arguments, returns a collection.
    List(NullaryMethod),
    /// Id in, item out.
    Get(IdMethod),
    /// Payload in, item out. Create and Update.
    Write(PayloadMethod),
    /// Id in; the method's value is discarded.
    Delete(IdMethod),
}

#[derive(Debug)]
pub enum DispatchInput {
    None,
    Id(Uuid),
    Payload(Value),
}

#[derive(Debug, PartialEq)]
pub enum DispatchOutput {
    Value(Value),
    /// The call completed; there is nothing to return.
    Acknowledged,
}

pub(crate) fn expected_shape(op: CrudOperation) -> MethodShape {
    match op {
        CrudOperation::List => MethodShape::Nullary,
        CrudOperation::Get | CrudOperation::Delete => MethodShape::WithId,
        CrudOperation::Create | CrudOperation::Update => MethodShape::WithPayload,
    }
}

pub struct DispatchAdapter {
    operation: CrudOperation,
    method: String,
    bound: Bound,
    data_member: Option<String>,
}

impl std::fmt::Debug for DispatchAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchAdapter")
            .field("operation", &self.operation)
            .field("method", &self.method)
            .field("data_member", &self.data_member)
            .finish()
    }
}

impl DispatchAdapter {
    pub(crate) fn bind(
        operation: CrudOperation,
        method_name: &str,
        method: &ErasedMethod,
        data_member: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bound = match (operation, method) {
            (CrudOperation::List, ErasedMethod::Nullary(m)) => Bound::List(m.clone()),
            (CrudOperation::Get, ErasedMethod::WithId(m)) => Bound::Get(m.clone()),
            (CrudOperation::Delete, ErasedMethod::WithId(m)) => Bound::Delete(m.clone()),
            (CrudOperation::Create | CrudOperation::Update, ErasedMethod::WithPayload(m)) => {
                Bound::Write(m.clone())
            }
            (op, found) => {
                return Err(ConfigError::MethodShape {
                    method: method_name.to_string(),
                    operation: op,
                    expected: expected_shape(op),
                    found: found.shape(),
                })
            }
        };
        Ok(DispatchAdapter {
            operation,
            method: method_name.to_string(),
            bound,
            data_member,
        })
    }

    pub fn operation(&self) -> CrudOperation {
        self.operation
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Runs the bound method on `service`. The persistence future is awaited in place, so
    /// dropping the returned future drops the persistence call with it.
    pub async fn invoke(
        &self,
        service: ServiceInstance,
        input: DispatchInput,
    ) -> Result<DispatchOutput, PersistenceError> {
        let value = match (&self.bound, input) {
            (Bound::List(m), DispatchInput::None) => m(service).await?,
            (Bound::Get(m), DispatchInput::Id(id)) => m(service, id).await?,
            (Bound::Write(m), DispatchInput::Payload(payload)) => m(service, payload).await?,
            (Bound::Delete(m), DispatchInput::Id(id)) => {
                m(service, id).await?;
                return Ok(DispatchOutput::Acknowledged);
            }
            (_, input) => {
                return Err(PersistenceError::InvalidPayload(format!(
                    "{} cannot be called with {:?}",
                    self.method, input
                )))
            }
        };
        Ok(DispatchOutput::Value(self.unwrap_data(value)))
    }

    /// The configured data member of a response wrapper, or the value itself.
    fn unwrap_data(&self, value: Value) -> Value {
        match (&self.data_member, value) {
            (Some(member), Value::Object(mut obj)) if obj.contains_key(member) => {
                obj.remove(member).unwrap_or(Value::Null)
            }
            (_, value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MethodTable;
    use serde_json::json;
    use std::sync::Arc;

    struct Store;

    fn table() -> MethodTable {
        MethodTable::new()
            .nullary("All", |_: Arc<Store>| async {
                Ok::<_, PersistenceError>(json!({ "status": "ok", "data": [1, 2] }))
            })
            .with_id("Remove", |_: Arc<Store>, _id| async { Ok::<_, PersistenceError>(true) })
    }

    #[tokio::test]
    async fn list_unwraps_the_configured_data_member() {
        let table = table();
        let method = table.lookup("All").expect("All");
        let wrapped = DispatchAdapter::bind(CrudOperation::List, "All", method, Some("data".into())).expect("bind");
        let out = wrapped.invoke(Arc::new(Store), DispatchInput::None).await.expect("list");
        assert_eq!(out, DispatchOutput::Value(json!([1, 2])));

        let raw = DispatchAdapter::bind(CrudOperation::List, "All", method, None).expect("bind");
        let out = raw.invoke(Arc::new(Store), DispatchInput::None).await.expect("list");
        assert_eq!(out, DispatchOutput::Value(json!({ "status": "ok", "data": [1, 2] })));
    }

    #[tokio::test]
    async fn delete_discards_the_result() {
        let table = table();
        let adapter =
            DispatchAdapter::bind(CrudOperation::Delete, "Remove", table.lookup("Remove").expect("Remove"), None)
                .expect("bind");
        let out = adapter
            .invoke(Arc::new(Store), DispatchInput::Id(Uuid::new_v4()))
            .await
            .expect("delete");
        assert_eq!(out, DispatchOutput::Acknowledged);
        assert!(adapter.invoke(Arc::new(Store), DispatchInput::None).await.is_err());
    }

    #[test]
    fn shape_mismatch_is_a_config_error() {
        let table = table();
        let err = DispatchAdapter::bind(CrudOperation::Create, "All", table.lookup("All").expect("All"), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MethodShape {
                expected: MethodShape::WithPayload,
                found: MethodShape::Nullary,
                ..
            }
        ));
    }
}
