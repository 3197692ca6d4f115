//! The request/response pair bound to one logical task.

use std::sync::Arc;

use crate::core::{Request, ResponseHandle};

/// Immutable request/response pair stored per task.
///
/// Rebinding replaces the whole context; a context is never mutated after
/// creation. The request itself still carries writable attribute scopes.
#[derive(Debug)]
pub struct BoundContext {
    request: Arc<Request>,
    response: Option<ResponseHandle>,
}

impl BoundContext {
    pub fn new(request: Arc<Request>, response: Option<ResponseHandle>) -> Self {
        Self { request, response }
    }

    #[inline]
    pub fn request(&self) -> &Arc<Request> {
        &self.request
    }

    #[inline]
    pub fn response(&self) -> Option<&ResponseHandle> {
        self.response.as_ref()
    }
}
