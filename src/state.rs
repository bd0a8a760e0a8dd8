//! Shared application state for the synthesized routes.

use crate::auth::Authorizer;
use crate::config::CrudOptions;
use crate::dispatch::DispatchRegistry;
use crate::error::ConfigError;
use crate::operation::CrudOperation;
use crate::provider::ServiceProvider;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct AppState {
    pub options: Arc<CrudOptions>,
    pub dispatch: Arc<DispatchRegistry>,
    pub services: Arc<dyn ServiceProvider>,
    pub authorizer: Arc<dyn Authorizer>,
    /// (entity, operation) pairs with a registered route. Only touched at startup.
    registered: Arc<Mutex<HashSet<(String, CrudOperation)>>>,
}

impl AppState {
    pub fn new(
        options: CrudOptions,
        dispatch: DispatchRegistry,
        services: Arc<dyn ServiceProvider>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        AppState {
            options: Arc::new(options),
            dispatch: Arc::new(dispatch),
            services,
            authorizer,
            registered: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claims the route for `(entity, op)`; a second claim fails.
    pub(crate) fn register_route(&self, entity: &str, op: CrudOperation) -> Result<(), ConfigError> {
        let mut registered = self.registered.lock().unwrap_or_else(PoisonError::into_inner);
        if !registered.insert((entity.to_string(), op)) {
            return Err(ConfigError::DuplicateRoute {
                entity: entity.to_string(),
                operation: op,
            });
        }
        Ok(())
    }

    pub fn registered_routes(&self) -> usize {
        self.registered.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
