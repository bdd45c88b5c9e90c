//! # fsroute
//!
//! File-system route resolution. A directory tree of route files becomes an
//! ordered route table, and each request is dispatched to the first route
//! that both matches its URL and has a handler for its method.
//!
//! - Static routes (`/about`)
//! - Dynamic parameters (`/users/:id`, `/users/%id`)
//! - Index routes (`/widgets/index` also serves `/widgets` and `/widgets/`)
//! - Query strings merged into the request (`/users/1?active=true`)
//! - Explicit priorities, with index routes tried last by default
//! - Per-module middleware wrapping the resolved handler
//!
//! ## Building
//!
//! ```text
//! routes/
//!   index.js          → /index   (priority -1)
//!   about.js          → /about
//!   users/:id.js      → /users/:id
//! ```
//!
//! Route files only mark where a route lives. The handlers come from a
//! [`RouteLoader`], e.g. a [`ModuleTable`] filled in code, and
//! [`create_resolver`] walks the directory once, compiles every template and
//! sorts the result.
//!
//! ## Example
//!
//! ```
//! use fsroute::{Request, Resolver, Route, RouteModule};
//!
//! let users = RouteModule::<Request>::new().with_method("GET", |req| {
//!     Box::pin(async move {
//!         req.params.insert("served".into(), "yes".into());
//!         anyhow::Ok(())
//!     })
//! });
//!
//! let resolver = Resolver::from_routes([Route::new("/users/:id", users).unwrap()]);
//!
//! let found = resolver.find("GET", "/Users/7?active=true").unwrap();
//! assert_eq!(found.params["id"], "7");
//! assert_eq!(found.query["active"], "true");
//! assert!(resolver.find("POST", "/users/7").is_none());
//! ```

use std::path::Path;
use tracing::debug;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod dispatch;
pub mod error;
pub mod path;
pub mod query;
pub mod registry;
pub mod route;

pub use config::{Config, ResolverConfig, RoutingConfig};
pub use dispatch::{Request, RequestContext, Resolver, RouteMatch};
pub use error::ResolveError;
pub use query::{QueryMap, QueryParser, QueryValue, UrlEncodedQuery};
pub use registry::{DirLister, FsLister, ModuleTable, RouteLoader};
pub use route::{
    handler, middleware, BoxFuture, Handler, HandlerSource, Middleware, Route, RouteModule,
};

// ============================================================================
// Construction
// ============================================================================

/// Builds a resolver for every route file below `routes_dir`
///
/// Files are discovered recursively (files before subdirectories), filtered,
/// loaded through the configured [`RouteLoader`], given a path and compiled.
/// Routes are then stable-sorted by descending priority.
///
/// Fails on the first unreadable directory, loader error or uncompilable
/// template; no partial resolver is returned.
///
/// # Examples
///
/// ```no_run
/// use fsroute::{create_resolver, ModuleTable, Request, ResolverConfig, RouteModule};
///
/// let modules = ModuleTable::new("routes")
///     .with_module("index.js", RouteModule::<Request>::new())
///     .with_module("users/:id.js", RouteModule::new());
///
/// let resolver = create_resolver("routes", ResolverConfig::new(modules))?;
/// println!("{} routes", resolver.len());
/// # Ok::<(), fsroute::ResolveError>(())
/// ```
pub fn create_resolver<C>(
    routes_dir: impl AsRef<Path>,
    config: ResolverConfig<C>,
) -> Result<Resolver<C>, ResolveError> {
    let routes_dir = routes_dir.as_ref();
    let routes = registry::build_routes(routes_dir, &config)?;
    debug!(routes_dir = %routes_dir.display(), routes = routes.len(), "resolver created");

    Ok(Resolver::from_routes(routes).with_shared_query_parser(config.query_parser()))
}
