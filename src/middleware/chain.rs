//! Middleware chain for composing multiple middleware.

use std::sync::Arc;

use bytes::Bytes;

use super::{Handler, Middleware, Next};
use crate::core::{Request, Response, ResponseHandle, Result};

/// An ordered chain of middleware wrapped around a handler.
///
/// Middleware are sorted by priority; the lowest priority is outermost.
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create a new empty middleware chain.
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the chain.
    ///
    /// Middleware are automatically sorted by priority (stable for ties).
    pub fn add<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.add_arc(Arc::new(middleware))
    }

    /// Add a middleware wrapped in Arc to the chain.
    pub fn add_arc(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self.middlewares.sort_by_key(|m| m.priority());
        self
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Get middleware names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Initialise every middleware in order. Stops at the first failure.
    pub fn init(&self) -> Result<()> {
        for mw in &self.middlewares {
            mw.init().inspect_err(|e| {
                tracing::error!(middleware = mw.name(), error = %e, "middleware init failed");
            })?;
            tracing::debug!(middleware = mw.name(), "middleware initialised");
        }
        Ok(())
    }

    /// Shut down every middleware in reverse order.
    pub fn destroy(&self) {
        for mw in self.middlewares.iter().rev() {
            mw.destroy();
            tracing::debug!(middleware = mw.name(), "middleware destroyed");
        }
    }

    /// Run a request through the chain and the handler.
    ///
    /// Errors from the handler or any middleware are returned unchanged.
    pub async fn process(
        &self,
        req: Arc<Request>,
        res: ResponseHandle,
        handler: &dyn Handler,
    ) -> Result<()> {
        Next::new(&self.middlewares, handler).run(req, res).await
    }

    /// Process a request and collect the finished response.
    ///
    /// This is the server side of the pipeline: a failure is logged and
    /// turned into a 500 response, since there is no caller left to
    /// propagate it to.
    pub async fn serve_request(&self, req: Request, handler: &dyn Handler) -> Response {
        let req = Arc::new(req);
        let path = req.path().to_string();
        let res = ResponseHandle::new();

        match self.process(req, res.clone(), handler).await {
            Ok(()) => res.finish(),
            Err(e) => {
                tracing::error!(path = %path, error = %e, "request failed");
                Response::internal_error("Internal Server Error")
            }
        }
    }

    /// Convenience wrapper around [`MiddlewareChain::serve_request`] for
    /// `http` types.
    pub async fn serve<B>(&self, req: http::Request<B>, handler: &dyn Handler) -> http::Response<Bytes>
    where
        B: Into<Bytes>,
    {
        self.serve_request(Request::from(req), handler).await.into()
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MiddlewareChain {
    fn clone(&self) -> Self {
        Self {
            middlewares: self.middlewares.clone(),
        }
    }
}
