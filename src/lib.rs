//! request_scope - request-scoped context resolution for async Rust services.
//!
//! While a request is being handled, code anywhere down the call tree (a
//! template renderer, a helper function) can look up request attributes,
//! parameters, session data and application data without having the request
//! passed to it explicitly.
//!
//! # Features
//!
//! - **Scoped store**: the current request is bound to the handling task, so
//!   concurrent requests never see each other's data
//! - **Lifecycle hook**: a middleware binds on entry and unbinds on every exit
//!   path, including errors, panics and cancellation
//! - **Layered lookup**: request attributes, then parameters, then session,
//!   then application attributes
//! - **Strict accessor**: fails with a configuration error when nothing is
//!   bound instead of silently returning nothing
//!
//! # Example
//!
//! ```rust,ignore
//! use request_scope::middleware::handler_fn;
//! use request_scope::{MiddlewareChain, RequestResolver};
//!
//! let resolver = RequestResolver::new();
//! let chain = MiddlewareChain::new().add(resolver.middleware());
//!
//! let handler = handler_fn(move |_req, res| async move {
//!     let vars = resolver.get_strict()?;
//!     let user = vars.get("user");
//!     res.write(format!("hello {:?}", user));
//!     Ok(())
//! });
//!
//! let response = chain.serve(http_request, &handler).await;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod context;
pub mod core;
pub mod logging;
pub mod middleware;
pub mod resolver;

// Re-exports for convenience
pub use config::Config;
pub use context::{BoundContext, ScopedContextStore, Variables};
pub use core::{Error, Request, ResponseHandle, Result};
pub use middleware::{MiddlewareChain, RequestContextMiddleware};
pub use resolver::{RequestResolver, Resolver};
