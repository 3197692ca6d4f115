//! Request-scoped context binding.
//!
//! A [`ScopedContextStore`] binds the in-flight request and response to the
//! logical task handling them, so code deep inside rendering can reach them
//! without threading them through every call:
//!
//! ```text
//! RequestContextMiddleware ── bind ──▶ ScopedContextStore (task slot)
//!          │                                   ▲
//!          ▼                                   │ lookup
//!       handler ──▶ template ──▶ RequestResolver::get("user")
//!          │
//!          ▼
//!    unbind (Binding dropped on every exit path)
//! ```
//!
//! Lookup of a variable name goes through [`Variables`], which searches
//! request attributes, parameters, session attributes and application
//! attributes in that order.

mod bound;
mod store;
mod variables;

pub use bound::BoundContext;
pub use store::{task_scope, Binding, ScopedContextStore};
pub use variables::{find, resolve, Scope, Variables};
