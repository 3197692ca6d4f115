//! Core error types.

use std::fmt;

/// Core errors for request handling and context resolution.
#[derive(Debug)]
pub enum Error {
    /// Strict context access with no binding on the current task.
    ///
    /// This is a setup defect: the request never passed through
    /// `RequestContextMiddleware`.
    ContextNotBound,

    /// Failure raised by a downstream handler.
    Handler(String),

    /// HTTP error.
    Http(http::Error),

    /// Custom error with message.
    Custom(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContextNotBound => write!(
                f,
                "no request context is bound to the current task. \
                 Add the context middleware to your pipeline:\n\
                 \tMiddlewareChain::new().add(RequestContextMiddleware::new(store))\n\
                 and make sure its URL patterns cover this request (e.g. \"/*\", \
                 or CONTEXT_URL_PATTERNS=/*)"
            ),
            Error::Handler(msg) => write!(f, "handler error: {}", msg),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// Whether this error signals a missing context binding.
    pub fn is_context_not_bound(&self) -> bool {
        matches!(self, Error::ContextNotBound)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::Http(e)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Custom(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Custom(msg.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
