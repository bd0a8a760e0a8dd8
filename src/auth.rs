//! Route authorization: an `Authorizer` evaluated by a route layer before the handler runs.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

/// The authenticated caller. Put into request extensions by whatever authenticates requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(subject: impl Into<String>) -> Self {
        Principal {
            subject: subject.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// `policy` is `None` for the default policy.
    async fn authorize(&self, parts: &Parts, policy: Option<&str>) -> Result<(), AppError>;

    fn has_policy(&self, name: &str) -> bool;
}

type Predicate = Arc<dyn Fn(&Principal) -> bool + Send + Sync>;

/// Default policy: a `Principal` is present. Named policies are predicates over it.
#[derive(Clone, Default)]
pub struct PolicyAuthorizer {
    policies: HashMap<String, Predicate>,
}

impl PolicyAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Principal) -> bool + Send + Sync + 'static,
    {
        self.policies.insert(name.into(), Arc::new(predicate));
        self
    }

    pub fn require_role(self, name: impl Into<String>, role: impl Into<String>) -> Self {
        let role = role.into();
        self.with_policy(name, move |p: &Principal| p.has_role(&role))
    }
}

#[async_trait]
impl Authorizer for PolicyAuthorizer {
    async fn authorize(&self, parts: &Parts, policy: Option<&str>) -> Result<(), AppError> {
        let principal = parts.extensions.get::<Principal>().ok_or(AppError::Unauthorized)?;
        let Some(name) = policy else {
            return Ok(());
        };
        match self.policies.get(name) {
            Some(allowed) if allowed(principal) => Ok(()),
            _ => Err(AppError::Forbidden(format!("policy '{}' denied {}", name, principal.subject))),
        }
    }

    fn has_policy(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }
}

/// Route layer state: which authorizer and policy guard a route.
#[derive(Clone)]
pub struct RouteGuard {
    pub authorizer: Arc<dyn Authorizer>,
    pub policy: Option<String>,
}

pub async fn authorize_request(
    State(guard): State<RouteGuard>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    if let Err(e) = guard.authorizer.authorize(&parts, guard.policy.as_deref()).await {
        tracing::debug!(uri = %parts.uri, error = %e, "request not authorized");
        return Err(e);
    }
    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(principal: Option<Principal>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/Product/GetListAsync");
        if let Some(p) = principal {
            builder = builder.extension(p);
        }
        builder.body(()).expect("request").into_parts().0
    }

    #[tokio::test]
    async fn default_policy_needs_a_principal() {
        let auth = PolicyAuthorizer::new();
        assert!(matches!(auth.authorize(&parts(None), None).await, Err(AppError::Unauthorized)));
        assert!(auth.authorize(&parts(Some(Principal::new("ada"))), None).await.is_ok());
    }

    #[tokio::test]
    async fn named_policies_check_the_principal() {
        let auth = PolicyAuthorizer::new().require_role("Admins", "admin");
        assert!(auth.has_policy("Admins"));
        assert!(!auth.has_policy("Editors"));
        let admin = Principal::new("ada").with_role("admin");
        assert!(auth.authorize(&parts(Some(admin)), Some("Admins")).await.is_ok());
        assert!(matches!(
            auth.authorize(&parts(Some(Principal::new("bob"))), Some("Admins")).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
