//! Lifecycle: bind on entry, unbind on every exit path.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use http::StatusCode;
use request_scope::config::{Config, ContextConfig};
use request_scope::core::Error;
use request_scope::middleware::{handler_fn, UrlPattern};
use request_scope::{Request, RequestContextMiddleware, Resolver, ResponseHandle};

use crate::helpers::*;

#[tokio::test]
async fn test_bound_only_while_handling() {
    let app = TestApp::new();
    let resolver = app.resolver;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let handler = handler_fn(move |req: Arc<Request>, res: ResponseHandle| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            let bound = resolver.current_request().expect("request bound");
            assert!(Arc::ptr_eq(&bound, &req));
            assert!(resolver.current_response().expect("response bound").same_as(&res));
            Ok(())
        }
    });

    assert!(resolver.current_request().is_none());
    let resp = app.chain.serve_request(get("/page"), &handler).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(resolver.current_request().is_none());
}

#[tokio::test]
async fn test_unbound_after_handler_error() {
    let app = TestApp::new();
    let handler = handler_fn(|_req, _res| async { Err(Error::Handler("render failed".into())) });

    let err = app
        .chain
        .process(Arc::new(get("/page")), ResponseHandle::new(), &handler)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Handler(ref msg) if msg == "render failed"));
    assert!(!app.resolver.store().is_bound());

    // The serving wrapper turns the same failure into a 500.
    let resp = app.chain.serve_request(get("/page"), &handler).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unbound_after_handler_panic() {
    let app = TestApp::new();
    let resolver = app.resolver;
    let handler = handler_fn(move |_req: Arc<Request>, _res: ResponseHandle| async move {
        assert!(resolver.current_request().is_some());
        if resolver.get("boom").is_some() {
            panic!("handler blew up");
        }
        Ok(())
    });

    let outcome = AssertUnwindSafe(app.chain.process(
        Arc::new(get("/page?boom=1")),
        ResponseHandle::new(),
        &handler,
    ))
    .catch_unwind()
    .await;
    assert!(outcome.is_err());
    assert!(resolver.current_request().is_none());

    // The same task keeps serving requests normally afterwards.
    let resp = app.chain.serve_request(get("/page"), &handler).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unbound_after_cancellation() {
    let app = TestApp::new();
    let resolver = app.resolver;
    let handler = handler_fn(|_req, _res| async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(())
    });

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        app.chain
            .process(Arc::new(get("/slow")), ResponseHandle::new(), &handler),
    )
    .await;

    assert!(result.is_err(), "request should have timed out");
    assert!(resolver.current_request().is_none());
}

#[test]
fn test_blocking_hook_unbinds_after_panic() {
    let app = TestApp::new();
    let store = app.resolver.store();
    let hook = RequestContextMiddleware::new(store);

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        hook.handle_blocking(
            Arc::new(get("/sync")),
            ResponseHandle::new(),
            |_req, _res| -> request_scope::Result<()> {
                assert!(store.is_bound());
                panic!("render panicked")
            },
        )
    }));

    assert!(outcome.is_err());
    assert!(!store.is_bound());
}

#[test]
fn test_unbind_is_idempotent() {
    let store = TestApp::new().resolver.store();

    store.unbind();
    store.unbind();
    assert!(!store.is_bound());

    store.bind(Arc::new(get("/")), ResponseHandle::new());
    assert!(store.is_bound());
    store.unbind();
    store.unbind();
    assert!(!store.is_bound());
}

#[test]
fn test_nested_binding_restores_outer() {
    let store = TestApp::new().resolver.store();
    let outer = Arc::new(get("/outer"));

    let _outer = store.enter(Arc::clone(&outer), None);
    {
        let _inner = store.enter(Arc::new(get("/inner")), None);
        assert_eq!(store.current_request().unwrap().path(), "/inner");
    }
    assert!(Arc::ptr_eq(&store.current_request().unwrap(), &outer));

    drop(_outer);
    assert!(!store.is_bound());
}

/// Paths outside the configured patterns run without a context.
#[tokio::test]
async fn test_configured_patterns() {
    let app = TestApp::without_hook();
    let resolver = app.resolver;
    let config = Config {
        context: ContextConfig {
            url_patterns: vec![UrlPattern::parse("/views/*").unwrap()],
            access_log: true,
        },
        ..Default::default()
    };
    let chain = config.middleware_chain(resolver.store());
    chain.init().expect("middleware init");
    assert_eq!(chain.names(), vec!["access_log", "request_context"]);

    let handler = handler_fn(move |req: Arc<Request>, res: ResponseHandle| async move {
        let bound = resolver.current_request().is_some();
        assert_eq!(bound, req.path().starts_with("/views"));
        res.write(if bound { "bound" } else { "unbound" });
        Ok(())
    });

    let resp = chain.serve_request(get("/views/home"), &handler).await;
    assert_eq!(resp.body().as_ref(), b"bound");

    let resp = chain.serve_request(get("/api/health"), &handler).await;
    assert_eq!(resp.body().as_ref(), b"unbound");

    chain.destroy();
}
