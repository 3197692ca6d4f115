//! Middleware pipeline around request handlers.
//!
//! Each middleware wraps the rest of the pipeline: it receives the request,
//! the response handle and a [`Next`] continuation, and decides whether and
//! how to run it. This makes "do X before, always do Y after" a plain
//! scoped block instead of a pair of callbacks.
//!
//! # Example
//!
//! ```rust,ignore
//! use request_scope::middleware::{handler_fn, AccessLogMiddleware, MiddlewareChain};
//! use request_scope::{RequestResolver, Resolver};
//!
//! let resolver = RequestResolver::new();
//! let chain = MiddlewareChain::new()
//!     .add(AccessLogMiddleware::new())
//!     .add(resolver.middleware());
//!
//! let handler = handler_fn(move |_req, res| async move {
//!     let user = resolver.get("user");
//!     res.write(format!("Hello, {}", user.unwrap_or_default()));
//!     Ok(())
//! });
//! let response = chain.serve(http_request, &handler).await;
//! ```

mod chain;
mod context;
mod pattern;

pub mod access_log;

pub use access_log::AccessLogMiddleware;
pub use chain::MiddlewareChain;
pub use context::RequestContextMiddleware;
pub use pattern::UrlPattern;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{Request, ResponseHandle, Result};

/// Trait for implementing middleware.
///
/// # Lifecycle
///
/// ```text
/// MW1.handle ─▶ next.run ─▶ MW2.handle ─▶ next.run ─▶ Handler
///     ▲                          ▲                       │
///     └──────── returns ─────────┴───────────────────────┘
/// ```
///
/// # Implementation Notes
///
/// - Call `next.run(req, res)` at most once; not calling it short-circuits
///   the pipeline (write the response through `res` first).
/// - Return the downstream result unchanged unless the middleware exists to
///   translate errors.
/// - `init` and `destroy` run once when the hosting server starts and stops.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Unique name for this middleware (used for logging/debugging).
    fn name(&self) -> &'static str;

    /// Priority for ordering in the chain. Lower values wrap higher ones.
    /// Default is 0.
    ///
    /// Suggested priority ranges:
    /// - -100..-50: Logging, request context
    /// - -50..0: Security (auth, sessions)
    /// - 0..100: Request/response modification
    fn priority(&self) -> i32 {
        0
    }

    /// Called once before the first request.
    fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Called once after the last request.
    fn destroy(&self) {}

    /// Process a request, usually by running the rest of the pipeline.
    async fn handle(&self, req: Arc<Request>, res: ResponseHandle, next: Next<'_>) -> Result<()> {
        next.run(req, res).await
    }
}

/// Terminal request handler (application code, template rendering).
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Arc<Request>, res: ResponseHandle) -> Result<()>;
}

/// Handler backed by an async closure. See [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap an async closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Arc<Request>, ResponseHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Arc<Request>, ResponseHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn call(&self, req: Arc<Request>, res: ResponseHandle) -> Result<()> {
        (self.f)(req, res).await
    }
}

/// Continuation: the remaining middleware followed by the handler.
pub struct Next<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(middlewares: &'a [Arc<dyn Middleware>], handler: &'a dyn Handler) -> Self {
        Self {
            middlewares,
            handler,
        }
    }

    /// Number of middleware still to run.
    pub fn remaining(&self) -> usize {
        self.middlewares.len()
    }

    /// Run the rest of the pipeline.
    pub async fn run(self, req: Arc<Request>, res: ResponseHandle) -> Result<()> {
        match self.middlewares.split_first() {
            Some((current, rest)) => {
                current
                    .handle(req, res, Next::new(rest, self.handler))
                    .await
            }
            None => self.handler.call(req, res).await,
        }
    }
}
