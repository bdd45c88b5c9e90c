//! Handler and middleware types
//!
//! A route module exposes its handlers under three kinds of slot, tried in a
//! fixed order when a request comes in: a handler named after the HTTP
//! method, the module's own callable, then its `default` export.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async request handler borrowing the request context for its whole run
pub type Handler<C> =
    Arc<dyn for<'a> Fn(&'a mut C) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync>;

/// Middleware wrapping a resolved handler
///
/// Receives the context and the handler; it decides whether (and when) the
/// handler runs.
pub type Middleware<C> =
    Arc<dyn for<'a> Fn(&'a mut C, Handler<C>) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync>;

/// Wraps a function or closure as a [`Handler`]
pub fn handler<C, F>(f: F) -> Handler<C>
where
    F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a function or closure as a [`Middleware`]
pub fn middleware<C, F>(f: F) -> Middleware<C>
where
    F: for<'a> Fn(&'a mut C, Handler<C>) -> BoxFuture<'a, anyhow::Result<()>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Which slot of a route module answered a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerSource {
    /// A handler registered under the request's method name
    Method,
    /// The module itself is callable
    Callable,
    /// The module's `default` export
    Default,
}

impl HandlerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerSource::Method => "method",
            HandlerSource::Callable => "callable",
            HandlerSource::Default => "default",
        }
    }
}

impl fmt::Display for HandlerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a route file exports: handlers plus optional routing metadata
///
/// # Examples
///
/// ```
/// use fsroute::{Request, RouteModule};
///
/// let module = RouteModule::<Request>::new()
///     .with_path("/users/:id")
///     .with_priority(5)
///     .with_method("GET", |req| {
///         Box::pin(async move {
///             req.params.insert("seen".into(), "yes".into());
///             anyhow::Ok(())
///         })
///     });
///
/// assert_eq!(module.path(), Some("/users/:id"));
/// assert!(module.resolve("GET").is_some());
/// assert!(module.resolve("POST").is_none());
/// ```
pub struct RouteModule<C> {
    path: Option<String>,
    priority: Option<i32>,
    methods: HashMap<String, Handler<C>>,
    callable: Option<Handler<C>>,
    default: Option<Handler<C>>,
    middleware: Option<Middleware<C>>,
}

impl<C> RouteModule<C> {
    pub fn new() -> Self {
        Self {
            path: None,
            priority: None,
            methods: HashMap::new(),
            callable: None,
            default: None,
            middleware: None,
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Overrides the path derived from the file location
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets an explicit priority (higher is tried first)
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Registers a handler under a method name (matched case-sensitively)
    pub fn with_method<F>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync + 'static,
    {
        self.methods.insert(method.into(), Arc::new(f));
        self
    }

    /// Registers an already wrapped handler under a method name
    pub fn with_method_handler(mut self, method: impl Into<String>, handler: Handler<C>) -> Self {
        self.methods.insert(method.into(), handler);
        self
    }

    /// Makes the module itself callable for any method
    pub fn with_callable<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync + 'static,
    {
        self.callable = Some(Arc::new(f));
        self
    }

    /// Sets the `default` export, used when nothing more specific resolves
    pub fn with_default<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(f));
        self
    }

    /// Wraps every handler of this module in a middleware
    pub fn with_middleware<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, Handler<C>) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.middleware = Some(Arc::new(f));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn middleware(&self) -> Option<&Middleware<C>> {
        self.middleware.as_ref()
    }

    /// Method names with a dedicated handler, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    pub fn is_callable(&self) -> bool {
        self.callable.is_some()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Resolves the handler for a request method
    ///
    /// Fallback order: method table, callable module, `default` export.
    /// `None` means this module cannot serve the method at all.
    pub fn resolve(&self, method: &str) -> Option<(HandlerSource, &Handler<C>)> {
        self.methods
            .get(method)
            .map(|h| (HandlerSource::Method, h))
            .or_else(|| self.callable.as_ref().map(|h| (HandlerSource::Callable, h)))
            .or_else(|| self.default.as_ref().map(|h| (HandlerSource::Default, h)))
    }
}

impl<C> Default for RouteModule<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for RouteModule<C> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            priority: self.priority,
            methods: self.methods.clone(),
            callable: self.callable.clone(),
            default: self.default.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl<C> fmt::Debug for RouteModule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteModule")
            .field("path", &self.path)
            .field("priority", &self.priority)
            .field("methods", &self.methods())
            .field("callable", &self.is_callable())
            .field("default", &self.has_default())
            .field("middleware", &self.middleware.is_some())
            .finish()
    }
}
