//! Layered lookup and strict-versus-lenient access.

use std::sync::Arc;

use http::StatusCode;
use request_scope::context::Scope;
use request_scope::core::{Application, Session};
use request_scope::middleware::handler_fn;
use request_scope::{Request, Resolver, ResponseHandle};
use serde_json::{json, Value};

use crate::helpers::*;

fn scoped_request() -> Request {
    let session = Arc::new(Session::with_id("sess-1"));
    session.attributes().set("a", "session");
    session.attributes().set("b", "session");
    session.attributes().set("c", "session");

    let application = Arc::new(Application::new("shop"));
    for key in ["a", "b", "c", "d"] {
        application.attributes().set(key, "application");
    }

    let request = get_with_scopes("/render?a=param&b=param", session, application);
    request.attributes().set("a", "request");
    request
}

#[tokio::test]
async fn test_first_scope_wins() {
    let app = TestApp::new();
    let resolver = app.resolver;

    let handler = handler_fn(move |_req: Arc<Request>, _res: ResponseHandle| async move {
        assert_eq!(resolver.get("a"), Some(json!("request")));
        assert_eq!(resolver.get("b"), Some(json!("param")));
        assert_eq!(resolver.get("c"), Some(json!("session")));
        assert_eq!(resolver.get("d"), Some(json!("application")));
        assert_eq!(resolver.get("e"), None);

        let vars = resolver.get_strict().expect("bound");
        assert_eq!(vars.find("b").map(|(scope, _)| scope), Some(Scope::Parameter));
        assert_eq!(vars.find("d").map(|(scope, _)| scope), Some(Scope::Application));
        assert_eq!(vars.keys(), vec!["a", "b", "c", "d"]);
        assert_eq!(vars.to_map().get("a"), Some(&json!("request")));
        Ok(())
    });

    let resp = app.chain.serve_request(scoped_request(), &handler).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

/// Attributes set during handling are visible immediately and shadow
/// lower scopes; removing them (or setting null) uncovers the next scope.
#[tokio::test]
async fn test_lookup_reflects_live_attributes() {
    let app = TestApp::new();
    let resolver = app.resolver;

    let handler = handler_fn(move |req: Arc<Request>, _res: ResponseHandle| async move {
        assert_eq!(resolver.get("b"), Some(json!("param")));

        req.attributes().set("b", json!({"id": 7}));
        assert_eq!(resolver.get("b"), Some(json!({"id": 7})));

        // null clears the attribute, uncovering the parameter
        req.attributes().set("b", Value::Null);
        assert_eq!(resolver.get("b"), Some(json!("param")));

        req.attributes().set("b", "again");
        req.attributes().remove("b");
        assert_eq!(resolver.get("b"), Some(json!("param")));
        Ok(())
    });

    let resp = app.chain.serve_request(scoped_request(), &handler).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_form_parameters_first_value() {
    let app = TestApp::new();
    let resolver = app.resolver;

    let handler = handler_fn(move |req: Arc<Request>, _res: ResponseHandle| async move {
        assert_eq!(req.parameter_values("tag"), vec!["a", "b"]);
        assert_eq!(resolver.get("tag"), Some(json!("a")));
        assert_eq!(resolver.get("name"), Some(json!("John Smith")));
        assert_eq!(resolver.get("page"), Some(json!("2")));
        Ok(())
    });

    let resp = app
        .chain
        .serve_request(post_form("/submit?page=2", "name=John+Smith&tag=a&tag=b"), &handler)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_session_and_application() {
    let app = TestApp::new();
    let resolver = app.resolver;

    let handler = handler_fn(move |_req: Arc<Request>, _res: ResponseHandle| async move {
        assert_eq!(resolver.get("user"), None);
        let vars = resolver.get_strict().expect("bound");
        assert!(vars.keys().is_empty());
        assert!(!vars.contains_key("user"));
        Ok(())
    });

    let resp = app.chain.serve_request(get("/plain"), &handler).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

/// Without the hook, lenient lookup yields nothing while strict access
/// fails loudly.
#[tokio::test]
async fn test_strict_access_without_hook() {
    let app = TestApp::without_hook();
    let resolver = app.resolver;

    let handler = handler_fn(move |_req: Arc<Request>, _res: ResponseHandle| async move {
        assert_eq!(resolver.get("user"), None);
        resolver.get_strict().map(|_| ())
    });

    let err = app
        .chain
        .process(Arc::new(get("/?user=alice")), ResponseHandle::new(), &handler)
        .await
        .unwrap_err();
    assert!(err.is_context_not_bound());
    assert!(err.to_string().contains("RequestContextMiddleware"));

    let resp = app.chain.serve_request(get("/?user=alice"), &handler).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// Lookups work the same from synchronous code driving a future to
/// completion.
#[test]
fn test_lookup_from_blocking_driver() {
    let app = TestApp::new();
    let resolver = app.resolver;

    let handler = handler_fn(move |_req: Arc<Request>, res: ResponseHandle| async move {
        let user = resolver.get("user").unwrap_or(Value::Null);
        res.write(user.as_str().unwrap_or("anonymous"));
        Ok(())
    });

    let resp = tokio_test::block_on(app.chain.serve_request(get("/?user=dave"), &handler));
    assert_eq!(resp.body().as_ref(), b"dave");

    let resp = tokio_test::block_on(app.chain.serve_request(get("/"), &handler));
    assert_eq!(resp.body().as_ref(), b"anonymous");
    assert!(resolver.current_request().is_none());
}
