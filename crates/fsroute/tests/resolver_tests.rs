//! Integration tests for request dispatch
//!
//! Covers:
//! - Matching (literal, parameters, query strings, index routes)
//! - Priority ordering
//! - Handler resolution and fallback across routes
//! - Middleware
//! - Continuation and error propagation

mod common;

use common::{init_tracing, next, record, resolver, Ctx};
use fsroute::{HandlerSource, QueryValue, Request, Resolver, Route, RouteModule};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// Matching
// ============================================================================

#[rstest]
#[case("/about", true)]
#[case("/ABOUT", true)]
#[case("/About?ref=home", true)]
#[case("/about/team", false)]
#[case("/aboutus", false)]
fn test_literal_route_matching(#[case] url: &str, #[case] matched: bool) {
    let (_dir, resolver) = resolver(vec![(
        "about.js",
        RouteModule::new().with_default(record("about")),
    )]);

    assert_eq!(resolver.find("GET", url).is_some(), matched);
}

#[tokio::test]
async fn test_params_and_query_are_merged() {
    init_tracing();
    let (_dir, resolver) = resolver(vec![(
        "users/:id.js",
        RouteModule::new().with_method("GET", record("user")),
    )]);

    let mut ctx = Ctx::new("GET", "/users/1?active=true&tag=a&tag=b");
    resolver.dispatch(&mut ctx, next).await.unwrap();

    assert_eq!(ctx.req.param("id"), Some("1"));
    assert_eq!(ctx.req.query["active"], "true");
    assert_eq!(
        ctx.req.query["tag"],
        QueryValue::Multi(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(ctx.log, vec!["user", "next"]);
}

#[rstest]
#[case("/widgets")]
#[case("/widgets/")]
#[case("/widgets/index")]
#[case("/widgets?page=2")]
fn test_index_route_serves_directory(#[case] url: &str) {
    let (_dir, resolver) = resolver(vec![(
        "widgets/index.js",
        RouteModule::new().with_default(record("widgets")),
    )]);

    let found = resolver.find("GET", url).unwrap();
    assert_eq!(found.route.priority(), Some(-1));
    assert_eq!(found.source, HandlerSource::Default);
}

#[test]
fn test_index_route_does_not_swallow_siblings() {
    let (_dir, resolver) = resolver(vec![(
        "widgets/index.js",
        RouteModule::new().with_default(record("widgets")),
    )]);

    assert!(resolver.find("GET", "/widgetsindex").is_none());
    assert!(resolver.find("GET", "/widgets/other").is_none());
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_higher_priority_route_is_tried_first() {
    let (_dir, resolver) = resolver(vec![
        ("about.js", RouteModule::new().with_default(record("about"))),
        (
            ":page.js",
            RouteModule::new().with_priority(5).with_default(record("page")),
        ),
    ]);

    let mut ctx = Ctx::new("GET", "/about");
    resolver.dispatch(&mut ctx, next).await.unwrap();

    assert_eq!(ctx.log, vec!["page", "next"]);
    assert_eq!(ctx.req.param("page"), Some("about"));
}

#[tokio::test]
async fn test_index_route_loses_to_parameter_route() {
    let (_dir, resolver) = resolver(vec![
        ("index.js", RouteModule::new().with_default(record("home"))),
        (":page.js", RouteModule::new().with_default(record("page"))),
    ]);

    let mut ctx = Ctx::new("GET", "/index");
    resolver.dispatch(&mut ctx, next).await.unwrap();
    assert_eq!(ctx.log, vec!["page", "next"]);

    let mut ctx = Ctx::new("GET", "/");
    resolver.dispatch(&mut ctx, next).await.unwrap();
    assert_eq!(ctx.log, vec!["home", "next"]);
}

// ============================================================================
// Handler Resolution
// ============================================================================

#[tokio::test]
async fn test_route_without_handler_for_method_is_skipped() {
    let (_dir, resolver) = resolver(vec![
        (
            "x.js",
            RouteModule::new().with_priority(1).with_method("POST", record("post-only")),
        ),
        (":any.js", RouteModule::new().with_method("GET", record("any"))),
    ]);

    let mut ctx = Ctx::new("GET", "/x");
    resolver.dispatch(&mut ctx, next).await.unwrap();
    assert_eq!(ctx.log, vec!["any", "next"]);

    let mut ctx = Ctx::new("POST", "/x");
    resolver.dispatch(&mut ctx, next).await.unwrap();
    assert_eq!(ctx.log, vec!["post-only", "next"]);
}

#[tokio::test]
async fn test_unserved_request_is_left_untouched() {
    let (_dir, resolver) = resolver(vec![(
        "x.js",
        RouteModule::new().with_method("POST", record("post-only")),
    )]);

    let mut ctx = Ctx::new("GET", "/x?a=1");
    resolver.dispatch(&mut ctx, next).await.unwrap();

    assert_eq!(ctx.req, Request::new("GET", "/x?a=1"));
    assert_eq!(ctx.log, vec!["next"]);
}

#[tokio::test]
async fn test_callable_module_serves_any_method() {
    let (_dir, resolver) = resolver(vec![(
        "ping.js",
        RouteModule::new()
            .with_method("GET", record("get"))
            .with_callable(record("callable"))
            .with_default(record("default")),
    )]);

    let found = resolver.find("DELETE", "/ping").unwrap();
    assert_eq!(found.source, HandlerSource::Callable);

    let mut ctx = Ctx::new("GET", "/ping");
    resolver.dispatch(&mut ctx, next).await.unwrap();
    assert_eq!(ctx.log, vec!["get", "next"]);

    let mut ctx = Ctx::new("PATCH", "/ping");
    resolver.dispatch(&mut ctx, next).await.unwrap();
    assert_eq!(ctx.log, vec!["callable", "next"]);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_middleware_receives_the_handler() {
    let (_dir, resolver) = resolver(vec![(
        "secure.js",
        RouteModule::new()
            .with_method("GET", record("handler"))
            .with_middleware(|ctx: &mut Ctx, handler| {
                Box::pin(async move {
                    ctx.log.push("before".to_string());
                    handler(&mut *ctx).await?;
                    ctx.log.push("after".to_string());
                    anyhow::Ok(())
                })
            }),
    )]);

    let mut ctx = Ctx::new("GET", "/secure");
    resolver.dispatch(&mut ctx, next).await.unwrap();

    assert_eq!(ctx.log, vec!["before", "handler", "after", "next"]);
}

#[tokio::test]
async fn test_middleware_may_withhold_the_handler() {
    let (_dir, resolver) = resolver(vec![(
        "secure.js",
        RouteModule::new()
            .with_default(record("handler"))
            .with_middleware(|ctx: &mut Ctx, _handler| {
                Box::pin(async move {
                    ctx.log.push("denied".to_string());
                    anyhow::Ok(())
                })
            }),
    )]);

    let mut ctx = Ctx::new("GET", "/secure");
    resolver.dispatch(&mut ctx, next).await.unwrap();

    assert_eq!(ctx.log, vec!["denied", "next"]);
}

// ============================================================================
// Continuation and Errors
// ============================================================================

#[tokio::test]
async fn test_handler_error_propagates_and_skips_next() {
    let (_dir, resolver) = resolver(vec![(
        "boom.js",
        RouteModule::new().with_default(|ctx: &mut Ctx| {
            Box::pin(async move {
                ctx.log.push("handler".to_string());
                Err::<(), _>(anyhow::anyhow!("boom"))
            })
        }),
    )]);

    let mut ctx = Ctx::new("GET", "/boom");
    let err = resolver.dispatch(&mut ctx, next).await.unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert_eq!(ctx.log, vec!["handler"]);
}

#[tokio::test]
async fn test_middleware_error_propagates_and_skips_next() {
    let (_dir, resolver) = resolver(vec![(
        "secure.js",
        RouteModule::new()
            .with_default(record("handler"))
            .with_middleware(|ctx: &mut Ctx, _handler| {
                Box::pin(async move {
                    ctx.log.push("rejected".to_string());
                    Err::<(), _>(anyhow::anyhow!("unauthorized"))
                })
            }),
    )]);

    let mut ctx = Ctx::new("GET", "/secure");
    let err = resolver.dispatch(&mut ctx, next).await.unwrap_err();

    assert_eq!(err.to_string(), "unauthorized");
    assert_eq!(ctx.log, vec!["rejected"]);
}

#[tokio::test]
async fn test_continuation_runs_when_nothing_matches() {
    let (_dir, resolver) = resolver(Vec::new());

    let mut ctx = Ctx::new("GET", "/anything");
    resolver.dispatch(&mut ctx, next).await.unwrap();

    assert_eq!(ctx.log, vec!["next"]);
}

#[tokio::test]
async fn test_requests_do_not_share_state() {
    let (_dir, resolver) = resolver(vec![(
        "users/:id.js",
        RouteModule::new().with_default(record("user")),
    )]);

    let mut first = Ctx::new("GET", "/users/1?x=1");
    resolver.dispatch(&mut first, next).await.unwrap();
    let mut second = Ctx::new("GET", "/users/2");
    resolver.dispatch(&mut second, next).await.unwrap();

    assert_eq!(first.req.param("id"), Some("1"));
    assert_eq!(second.req.param("id"), Some("2"));
    assert_eq!(second.req.params.len(), 1);
    assert!(second.req.query.is_empty());
}

// ============================================================================
// Code-built Routes
// ============================================================================

#[tokio::test]
async fn test_resolver_from_routes_can_be_shared_across_tasks() {
    let module = RouteModule::<Request>::new().with_method("GET", |req| {
        Box::pin(async move {
            req.query.insert("handled".into(), "yes".into());
            anyhow::Ok(())
        })
    });
    let resolver = Resolver::from_routes([Route::new("/items/%sku", module).unwrap()]);

    let mut tasks = Vec::new();
    for sku in ["a1", "b2", "c3"] {
        let resolver = resolver.clone();
        tasks.push(tokio::spawn(async move {
            let mut req = Request::new("GET", format!("/items/{sku}"));
            let handled = resolver.handle(&mut req).await.unwrap();
            (handled, req)
        }));
    }

    for (task, sku) in tasks.into_iter().zip(["a1", "b2", "c3"]) {
        let (handled, req) = task.await.unwrap();
        assert!(handled);
        assert_eq!(req.param("sku"), Some(sku));
        assert_eq!(req.query["handled"], "yes");
    }
}
