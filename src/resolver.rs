//! Variable resolvers for template rendering.
//!
//! The template engine only needs a key → value lookup. [`RequestResolver`]
//! provides one backed by the request bound to the current task.

use std::sync::Arc;

use serde_json::Value;

use crate::context::{BoundContext, ScopedContextStore, Variables};
use crate::core::{Error, Request, ResponseHandle, Result};
use crate::middleware::RequestContextMiddleware;

/// Variable lookup capability used by the template engine.
pub trait Resolver: Send + Sync {
    /// Resolve a variable name. `None` means "no such variable".
    fn get(&self, key: &str) -> Option<Value>;
}

/// Resolves variables from the request bound to the current task.
///
/// Share one instance (or copies of it) between the pipeline and the
/// template engine; both must use the same [`ScopedContextStore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestResolver {
    store: ScopedContextStore,
}

impl RequestResolver {
    /// Create a resolver with its own store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver over an existing store.
    pub fn with_store(store: ScopedContextStore) -> Self {
        Self { store }
    }

    #[inline]
    pub fn store(&self) -> ScopedContextStore {
        self.store
    }

    /// Lifecycle middleware that binds requests into this resolver's store.
    pub fn middleware(&self) -> RequestContextMiddleware {
        RequestContextMiddleware::new(self.store)
    }

    /// Variables of the bound request, or `None` when nothing is bound.
    pub fn variables(&self) -> Option<Variables> {
        self.store.current_context().map(Variables::new)
    }

    /// Variables of the bound request.
    ///
    /// Fails with [`Error::ContextNotBound`] when the request never went
    /// through the context middleware, instead of pretending the namespace
    /// is empty.
    pub fn get_strict(&self) -> Result<Variables> {
        self.variables().ok_or_else(|| {
            tracing::warn!(
                store = self.store.id(),
                "strict variable access without a bound request context"
            );
            Error::ContextNotBound
        })
    }

    pub fn current_context(&self) -> Option<Arc<BoundContext>> {
        self.store.current_context()
    }

    pub fn current_request(&self) -> Option<Arc<Request>> {
        self.store.current_request()
    }

    pub fn current_response(&self) -> Option<ResponseHandle> {
        self.store.current_response()
    }
}

impl Resolver for RequestResolver {
    fn get(&self, key: &str) -> Option<Value> {
        self.variables().and_then(|vars| vars.get(key))
    }
}
