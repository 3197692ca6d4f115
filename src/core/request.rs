//! HTTP request abstraction for middleware and handlers.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, Method, Uri};

use super::params::{parse_cookies, parse_query_string, ParamList};
use super::{Application, Attributes, Session};

/// Header name constants for fast lookup.
mod header_names {
    use super::*;

    pub static CONTENT_TYPE: HeaderName = header::CONTENT_TYPE;
    pub static COOKIE: HeaderName = header::COOKIE;
    pub static USER_AGENT: HeaderName = header::USER_AGENT;
}

static X_REQUEST_ID: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-request-id"));

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Inbound HTTP request.
///
/// Parameters (query string plus urlencoded form body) and cookies are parsed
/// once at construction. Request attributes start empty and are filled by
/// processing steps that run before rendering.
///
/// Note: Clone is intentionally not derived. Requests are shared as
/// `Arc<Request>` once they enter the pipeline.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    version: http::Version,
    parameters: ParamList,
    cookies: ParamList,
    attributes: Attributes,
    session: Option<Arc<Session>>,
    application: Option<Arc<Application>>,
}

impl Request {
    /// Create a new request.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let mut parameters = uri.query().map(parse_query_string).unwrap_or_default();

        let is_form = headers
            .get(&header_names::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.trim_start().starts_with(FORM_URLENCODED))
            .unwrap_or(false);
        if is_form && !body.is_empty() {
            parameters.extend(parse_query_string(&String::from_utf8_lossy(&body)));
        }

        let cookies = headers
            .get_all(&header_names::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_cookies)
            .collect();

        Self {
            method,
            uri,
            headers,
            body,
            version: http::Version::HTTP_11,
            parameters,
            cookies,
            attributes: Attributes::new(),
            session: None,
            application: None,
        }
    }

    /// Attach the client's session.
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach the application scope.
    pub fn with_application(mut self, application: Arc<Application>) -> Self {
        self.application = Some(application);
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request path.
    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the query string.
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[inline]
    pub fn version(&self) -> http::Version {
        self.version
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(&header_names::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn user_agent(&self) -> Option<&str> {
        self.headers
            .get(&header_names::USER_AGENT)
            .and_then(|v| v.to_str().ok())
    }

    /// Get X-Request-ID header.
    #[inline]
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(&*X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }

    /// First submitted value of a parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All submitted values of a parameter, in submission order.
    pub fn parameter_values(&self, name: &str) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All parameters in submission order.
    #[inline]
    pub fn parameters(&self) -> &ParamList {
        &self.parameters
    }

    /// Get a cookie value by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn cookies(&self) -> &ParamList {
        &self.cookies
    }

    /// Request-scoped attributes.
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    #[inline]
    pub fn application(&self) -> Option<&Arc<Application>> {
        self.application.as_ref()
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Bytes>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        let mut request = Self::new(parts.method, parts.uri, parts.headers, body.into());
        request.version = parts.version;
        request
    }
}
