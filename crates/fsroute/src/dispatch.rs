//! Per-request dispatch
//!
//! # Data Flow
//! ```text
//! context (method, url)
//!     → walk routes in priority order
//!     → first route whose pattern matches AND which resolves a handler
//!     → merge params/query into the request
//!     → middleware(ctx, handler) or handler(ctx)
//!     → next(ctx)
//! ```
//!
//! The route list is shared immutably; each dispatch only writes to the
//! context it was given.

use crate::query::{QueryMap, QueryParser, QueryValue, UrlEncodedQuery};
use crate::registry::sort_routes;
use crate::route::{BoxFuture, Handler, HandlerSource, Route};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

// ============================================================================
// Request Context
// ============================================================================

/// Request data the resolver reads and writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: String,
    /// Path plus optional `?query`
    pub url: String,
    /// Path parameters merged in by the resolver
    pub params: HashMap<String, String>,
    /// Query values merged in by the resolver
    pub query: QueryMap,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_value(&self, key: &str) -> Option<&QueryValue> {
        self.query.get(key)
    }
}

/// Anything carrying a [`Request`] the resolver can read and update
///
/// The rest of the context is opaque to routing and passed through to
/// handlers untouched.
pub trait RequestContext: Send {
    fn request(&self) -> &Request;
    fn request_mut(&mut self) -> &mut Request;
}

impl RequestContext for Request {
    fn request(&self) -> &Request {
        self
    }

    fn request_mut(&mut self) -> &mut Request {
        self
    }
}

// ============================================================================
// Matching
// ============================================================================

/// The winning route for a request
pub struct RouteMatch<'r, C> {
    pub route: &'r Route<C>,
    /// Slot the handler was resolved from
    pub source: HandlerSource,
    pub handler: &'r Handler<C>,
    pub params: HashMap<String, String>,
    pub query: QueryMap,
}

impl<C> fmt::Debug for RouteMatch<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("path", &self.route.path())
            .field("source", &self.source)
            .field("params", &self.params)
            .field("query", &self.query)
            .finish()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Immutable, ordered route table plus the dispatch algorithm
///
/// Cloning is cheap: clones share the same route list.
pub struct Resolver<C> {
    routes: Arc<[Route<C>]>,
    query_parser: Arc<dyn QueryParser>,
}

impl<C> Resolver<C> {
    /// Builds a resolver from routes created in code
    ///
    /// Routes are stable-sorted by descending priority, so among equal
    /// priorities the given order is kept.
    pub fn from_routes(routes: impl IntoIterator<Item = Route<C>>) -> Self {
        let mut routes: Vec<Route<C>> = routes.into_iter().collect();
        sort_routes(&mut routes);
        Self {
            routes: routes.into(),
            query_parser: Arc::new(UrlEncodedQuery::default()),
        }
    }

    pub fn with_query_parser(mut self, parser: impl QueryParser + 'static) -> Self {
        self.query_parser = Arc::new(parser);
        self
    }

    pub(crate) fn with_shared_query_parser(mut self, parser: Arc<dyn QueryParser>) -> Self {
        self.query_parser = parser;
        self
    }

    /// Routes in evaluation order
    pub fn routes(&self) -> &[Route<C>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the route that would serve `method` + `url`
    ///
    /// A route whose path matches but which has no handler for the method
    /// is skipped. The first route passing both checks wins.
    pub fn find(&self, method: &str, url: &str) -> Option<RouteMatch<'_, C>> {
        self.routes.iter().find_map(|route| {
            let (source, handler) = route.resolve(method)?;
            let matched = route.matches(url, self.query_parser.as_ref())?;
            Some(RouteMatch {
                route,
                source,
                handler,
                params: matched.params,
                query: matched.query,
            })
        })
    }
}

impl<C: RequestContext> Resolver<C> {
    /// Routes one request and runs the winning handler
    ///
    /// Returns `Ok(false)` without touching the context when nothing matches.
    /// On a match, params and query are merged into the request, then the
    /// route's middleware (given the handler) or the handler itself runs to
    /// completion. Handler errors are returned unchanged.
    pub async fn handle(&self, ctx: &mut C) -> anyhow::Result<bool> {
        let found = {
            let req = ctx.request();
            self.find(&req.method, &req.url)
        };

        let Some(found) = found else {
            trace!(method = %ctx.request().method, url = %ctx.request().url, "no route matched");
            return Ok(false);
        };

        trace!(
            method = %ctx.request().method,
            url = %ctx.request().url,
            route = %found.route.path(),
            source = %found.source,
            "route matched"
        );

        let handler = Arc::clone(found.handler);
        let middleware = found.route.middleware().cloned();

        let req = ctx.request_mut();
        req.params.extend(found.params);
        req.query.extend(found.query);

        match middleware {
            Some(middleware) => middleware(ctx, handler).await?,
            None => handler(ctx).await?,
        }

        Ok(true)
    }

    /// Routes one request, then always hands control to `next`
    ///
    /// `next` runs after the handler has completed, whether or not a route
    /// matched. If the handler or middleware fails, the error is returned
    /// and `next` is not called.
    pub async fn dispatch<F>(&self, ctx: &mut C, next: F) -> anyhow::Result<()>
    where
        F: for<'a> FnOnce(&'a mut C) -> BoxFuture<'a, anyhow::Result<()>>,
    {
        self.handle(ctx).await?;
        next(ctx).await
    }
}

impl<C> Clone for Resolver<C> {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
            query_parser: Arc::clone(&self.query_parser),
        }
    }
}

impl<C> fmt::Debug for Resolver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("routes", &self.routes)
            .finish()
    }
}
