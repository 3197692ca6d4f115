//! End-to-end scenarios: a handler renders a template whose variables are
//! resolved from the current request without being passed in.

use std::sync::{mpsc, Arc};

use http::StatusCode;
use request_scope::core::{Application, Error, Session};
use request_scope::middleware::handler_fn;
use request_scope::{Request, RequestContextMiddleware, RequestResolver, Resolver, ResponseHandle};
use serde_json::Value;

use crate::helpers::*;

/// Minimal `${name}` template engine that only knows a [`Resolver`].
fn render(template: &str, vars: &dyn Resolver) -> String {
    let mut out = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        match vars.get(&after[..end]) {
            Some(Value::String(s)) => out.push_str(&s),
            Some(Value::Null) | None => {}
            Some(other) => out.push_str(&other.to_string()),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Strict rendering, as a template engine configured to reject a missing
/// context would do it.
fn render_strict(template: &str, resolver: &RequestResolver) -> request_scope::Result<String> {
    let _vars = resolver.get_strict()?;
    Ok(render(template, resolver))
}

#[tokio::test]
async fn test_template_reads_handler_attribute() {
    let app = TestApp::new();
    let resolver = app.resolver;

    let handler = handler_fn(move |req: Arc<Request>, res: ResponseHandle| async move {
        req.attributes().set("user", "alice");
        res.html();
        res.write(render("<p>Hello ${user}!</p>", &resolver));
        Ok(())
    });

    let resp = app.chain.serve(http::Request::new(Vec::<u8>::new()), &handler).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_body(&resp, "<p>Hello alice!</p>");
}

#[tokio::test]
async fn test_template_mixes_all_scopes() {
    let app = TestApp::new();
    let resolver = app.resolver;

    let application = Arc::new(Application::new("shop"));
    application.attributes().set("site", "Example Shop");
    let session = Arc::new(Session::new());
    session.attributes().set("cart", 3);

    let handler = handler_fn(move |req: Arc<Request>, res: ResponseHandle| async move {
        req.attributes().set("title", "Checkout");
        let page = render_strict(
            "${title} | ${site} | items: ${cart} | lang: ${lang}${missing}",
            &resolver,
        );
        match page {
            Ok(page) => {
                res.write(page);
                Ok(())
            }
            Err(e) => Err(e),
        }
    });

    let request = get_with_scopes("/checkout?lang=en", session, application);
    let resp: http::Response<bytes::Bytes> = app.chain.serve_request(request, &handler).await.into();
    assert_body(&resp, "Checkout | Example Shop | items: 3 | lang: en");
}

#[tokio::test]
async fn test_strict_render_outside_pipeline_fails() {
    let resolver = RequestResolver::new();

    assert_eq!(render("Hello ${user}", &resolver), "Hello ");

    let err = render_strict("Hello ${user}", &resolver).unwrap_err();
    assert!(matches!(err, Error::ContextNotBound));
    assert!(err.to_string().contains("no request context is bound"));
}

/// A worker thread that serves requests one after another never leaks the
/// previous request's data into the next one.
#[test]
fn test_worker_thread_reuse() {
    let resolver = RequestResolver::new();
    let hook = RequestContextMiddleware::new(resolver.store());
    let (tx, rx) = mpsc::channel::<Request>();

    let worker = std::thread::spawn(move || {
        let mut pages = Vec::new();
        for request in rx {
            let page = hook.handle_blocking(Arc::new(request), ResponseHandle::new(), |req, _res| {
                let page = render("[${user}]", &resolver);
                if req.path() == "/first" {
                    req.attributes().set("user", "first-user");
                }
                Ok(page + &render("[${user}]", &resolver))
            });
            pages.push(page.map_err(|e| e.to_string()));
            assert!(resolver.current_request().is_none());
        }
        pages
    });

    tx.send(get("/first")).unwrap();
    tx.send(get("/second")).unwrap();
    drop(tx);

    let pages = worker.join().expect("worker thread");
    assert_eq!(
        pages,
        vec![Ok("[][first-user]".to_string()), Ok("[][]".to_string())]
    );
}
