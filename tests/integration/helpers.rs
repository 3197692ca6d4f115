//! Test helpers and utilities

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use request_scope::core::{Application, Session};
use request_scope::{MiddlewareChain, Request, RequestResolver};

/// Resolver plus a chain with the context middleware installed.
pub struct TestApp {
    pub resolver: RequestResolver,
    pub chain: MiddlewareChain,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let resolver = RequestResolver::new();
        let chain = MiddlewareChain::new().add(resolver.middleware());
        Self { resolver, chain }
    }

    /// App whose chain does not bind anything.
    pub fn without_hook() -> Self {
        Self {
            resolver: RequestResolver::new(),
            chain: MiddlewareChain::new(),
        }
    }
}

/// Build a GET request for `uri`.
pub fn get(uri: &str) -> Request {
    Request::new(
        Method::GET,
        uri.parse::<Uri>().expect("valid uri"),
        HeaderMap::new(),
        Bytes::new(),
    )
}

/// Build a form POST request.
#[allow(dead_code)]
pub fn post_form(uri: &str, body: &'static str) -> Request {
    let mut headers = HeaderMap::new();
    headers.insert(
        "content-type",
        "application/x-www-form-urlencoded".parse().unwrap(),
    );
    Request::new(
        Method::POST,
        uri.parse::<Uri>().expect("valid uri"),
        headers,
        Bytes::from_static(body.as_bytes()),
    )
}

/// Request carrying session and application scopes.
#[allow(dead_code)]
pub fn get_with_scopes(uri: &str, session: Arc<Session>, application: Arc<Application>) -> Request {
    get(uri).with_session(session).with_application(application)
}

/// Assert the response body equals `expected`.
#[allow(dead_code)]
pub fn assert_body(resp: &http::Response<Bytes>, expected: &str) {
    assert_eq!(
        std::str::from_utf8(resp.body()).expect("utf-8 body"),
        expected,
        "unexpected body"
    );
}
