//! Request context middleware.
//!
//! Binds the request and response to the handling task before the rest of
//! the pipeline runs and unbinds them when it finishes, whether it returned
//! normally, failed, panicked or was cancelled.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Middleware, Next, UrlPattern};
use crate::context::{task_scope, ScopedContextStore};
use crate::core::{Request, ResponseHandle, Result};

/// Lifecycle hook that makes the current request resolvable.
pub struct RequestContextMiddleware {
    store: ScopedContextStore,
    patterns: Vec<UrlPattern>,
}

impl RequestContextMiddleware {
    /// Apply to every request.
    pub fn new(store: ScopedContextStore) -> Self {
        Self::with_patterns(store, vec![UrlPattern::All])
    }

    /// Apply only to requests whose path matches one of `patterns`.
    pub fn with_patterns(store: ScopedContextStore, patterns: Vec<UrlPattern>) -> Self {
        Self { store, patterns }
    }

    #[inline]
    pub fn store(&self) -> ScopedContextStore {
        self.store
    }

    #[inline]
    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    /// Check whether requests to `path` get a bound context.
    pub fn applies_to(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Synchronous variant for thread-per-request workers.
    ///
    /// Binds on the calling thread, runs `f` exactly once and unbinds before
    /// returning, including when `f` fails or panics.
    pub fn handle_blocking<R, F>(&self, req: Arc<Request>, res: ResponseHandle, f: F) -> Result<R>
    where
        F: FnOnce(Arc<Request>, ResponseHandle) -> Result<R>,
    {
        if !self.applies_to(req.path()) {
            return f(req, res);
        }

        let _binding = self.store.enter(Arc::clone(&req), Some(res.clone()));
        f(req, res)
    }
}

#[async_trait]
impl Middleware for RequestContextMiddleware {
    fn name(&self) -> &'static str {
        "request_context"
    }

    fn priority(&self) -> i32 {
        -80 // Wrap everything that may render
    }

    async fn handle(&self, req: Arc<Request>, res: ResponseHandle, next: Next<'_>) -> Result<()> {
        if !self.applies_to(req.path()) {
            tracing::trace!(path = req.path(), "request context not applied");
            return next.run(req, res).await;
        }

        let store = self.store;
        task_scope(async move {
            let _binding = store.enter(Arc::clone(&req), Some(res.clone()));
            next.run(req, res).await
        })
        .await
    }
}
