//! HTTP response abstraction.
//!
//! [`Response`] is the finished value handed back to the server.
//! [`ResponseHandle`] is the shared writer that handlers and templates fill
//! while the request is in flight.

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::{Bytes, BytesMut};
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};

use super::Result;

/// Pre-allocated static header values for common content types.
mod content_types {
    use super::*;
    pub static TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
    pub static TEXT_HTML: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");
}

/// HTTP response.
///
/// Note: Clone is intentionally not derived to prevent expensive copies.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Create a 200 OK response with body.
    #[inline]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Create a 500 Internal Server Error response.
    #[inline]
    pub fn internal_error(msg: &str) -> Self {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(header::CONTENT_TYPE, content_types::TEXT_PLAIN.clone());
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers,
            body: Bytes::copy_from_slice(msg.as_bytes()),
        }
    }

    /// Create an empty response with given status.
    #[inline]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header by string name and value. Invalid pairs are ignored.
    #[inline]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    #[inline]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::empty(StatusCode::OK)
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(res: Response) -> Self {
        let mut out = http::Response::new(res.body);
        *out.status_mut() = res.status;
        *out.headers_mut() = res.headers;
        out
    }
}

/// Response state while it is still being written.
#[derive(Debug)]
struct ResponseState {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }
}

/// Shared, writable handle to the outbound response.
///
/// Cloning is cheap and every clone writes to the same response. The server
/// owns the handle for the lifetime of the request and collects the result
/// with [`ResponseHandle::finish`].
#[derive(Clone, Debug, Default)]
pub struct ResponseHandle {
    inner: Arc<Mutex<ResponseState>>,
}

impl ResponseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    pub fn set_status(&self, status: StatusCode) {
        self.lock().status = status;
    }

    /// Get a header value (first value if repeated).
    pub fn header(&self, name: &str) -> Option<String> {
        self.lock()
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Set a header, replacing existing values.
    pub fn set_header(&self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::try_from(name).map_err(http::Error::from)?;
        let value = HeaderValue::try_from(value).map_err(http::Error::from)?;
        self.lock().headers.insert(name, value);
        Ok(())
    }

    /// Append a header value, keeping existing ones.
    pub fn append_header(&self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::try_from(name).map_err(http::Error::from)?;
        let value = HeaderValue::try_from(value).map_err(http::Error::from)?;
        self.lock().headers.append(name, value);
        Ok(())
    }

    /// Add a `Set-Cookie` header scoped to the whole site.
    pub fn set_cookie(&self, name: &str, value: &str) -> Result<()> {
        let encoded = percent_encoding::utf8_percent_encode(value, COOKIE_VALUE).to_string();
        self.append_header(
            header::SET_COOKIE.as_str(),
            &format!("{}={}; Path=/", name, encoded),
        )
    }

    /// Set Content-Type to text/html.
    pub fn html(&self) {
        self.lock()
            .headers
            .insert(header::CONTENT_TYPE, content_types::TEXT_HTML.clone());
    }

    /// Append bytes to the body.
    pub fn write(&self, chunk: impl AsRef<[u8]>) {
        self.lock().body.extend_from_slice(chunk.as_ref());
    }

    /// Replace the body.
    pub fn set_body(&self, body: impl AsRef<[u8]>) {
        let mut state = self.lock();
        state.body.clear();
        state.body.extend_from_slice(body.as_ref());
    }

    pub fn body_len(&self) -> usize {
        self.lock().body.len()
    }

    /// Take the written response, leaving an empty 200 in its place.
    pub fn finish(&self) -> Response {
        let state = std::mem::take(&mut *self.lock());
        Response {
            status: state.status,
            headers: state.headers,
            body: state.body.freeze(),
        }
    }

    /// Whether two handles write to the same response.
    pub fn same_as(&self, other: &ResponseHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> MutexGuard<'_, ResponseState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Characters escaped in cookie values (controls, whitespace, `"`, `,`, `;`, `\`).
const COOKIE_VALUE: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');
