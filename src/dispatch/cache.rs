//! The dispatch registry: bound adapters keyed by persistence type and operation.

use crate::config::{CrudOptions, MethodNames};
use crate::dispatch::adapter::DispatchAdapter;
use crate::dispatch::method::MethodCatalog;
use crate::error::ConfigError;
use crate::operation::CrudOperation;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Identity of a persistence type: a contract closed over one entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub contract: String,
    pub entity: String,
}

impl TypeKey {
    pub fn new(contract: impl Into<String>, entity: impl Into<String>) -> Self {
        TypeKey {
            contract: contract.into(),
            entity: entity.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.contract, self.entity)
    }
}

/// Entries are created on first access and never replaced or evicted.
pub struct DispatchRegistry {
    catalog: Arc<MethodCatalog>,
    methods: MethodNames,
    data_member: Option<String>,
    entries: DashMap<(TypeKey, CrudOperation), Arc<DispatchAdapter>>,
    bindings: AtomicUsize,
}

impl DispatchRegistry {
    pub fn new(catalog: MethodCatalog, methods: MethodNames, data_member: Option<String>) -> Self {
        DispatchRegistry {
            catalog: Arc::new(catalog),
            methods,
            data_member,
            entries: DashMap::new(),
            bindings: AtomicUsize::new(0),
        }
    }

    pub fn from_options(catalog: MethodCatalog, options: &CrudOptions) -> Self {
        Self::new(catalog, options.methods.clone(), options.response_data_member.clone())
    }

    /// The adapter for `(key, op)`, binding it on first use. Concurrent first calls for the same
    /// key bind once; the shard lock is held while binding.
    pub fn adapter(&self, key: &TypeKey, op: CrudOperation) -> Result<Arc<DispatchAdapter>, ConfigError> {
        let cache_key = (key.clone(), op);
        let cached = self.entries.get(&cache_key).map(|e| Arc::clone(e.value()));
        if let Some(adapter) = cached {
            return Ok(adapter);
        }
        let entry = self
            .entries
            .entry(cache_key)
            .or_try_insert_with(|| self.bind(key, op).map(Arc::new))?;
        Ok(Arc::clone(entry.value()))
    }

    fn bind(&self, key: &TypeKey, op: CrudOperation) -> Result<DispatchAdapter, ConfigError> {
        let name = self.methods.for_operation(op);
        let method = self
            .catalog
            .table(key)
            .and_then(|t| t.lookup(name))
            .ok_or_else(|| ConfigError::MethodNotFound {
                contract: key.to_string(),
                method: name.to_string(),
            })?;
        let adapter = DispatchAdapter::bind(op, name, method, self.data_member.clone())?;
        self.bindings.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(key = %key, operation = %op, method = name, "dispatch adapter bound");
        Ok(adapter)
    }

    /// How many adapters have been bound since construction.
    pub fn binding_count(&self) -> usize {
        self.bindings.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
