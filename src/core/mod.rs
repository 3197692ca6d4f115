//! Core types for request handling.
//!
//! - [`Request`] - inbound request with parameters, cookies and attribute scopes
//! - [`Response`] / [`ResponseHandle`] - finished response and its shared writer
//! - [`Attributes`] - thread-safe attribute map used by every scope
//! - [`Session`] / [`Application`] - broader attribute scopes owned by the server
//! - [`Error`] - core error types
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use request_scope::core::{Application, Request, Session};
//!
//! let app = Arc::new(Application::new("shop"));
//! let req = Request::from(http_request)
//!     .with_session(Arc::new(Session::new()))
//!     .with_application(app);
//! req.attributes().set("user", "alice");
//! ```

mod attributes;
mod error;
mod params;
mod request;
mod response;
mod session;

pub use attributes::Attributes;
pub use error::{Error, Result};
pub use params::{parse_cookies, parse_query_string, ParamList};
pub use request::Request;
pub use response::{Response, ResponseHandle};
pub use session::{Application, Session};
