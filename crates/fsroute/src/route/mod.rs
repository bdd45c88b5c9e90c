//! Route module for file-based routing
//!
//! A [`Route`] pairs a compiled [`RoutePattern`] with the [`RouteModule`]
//! loaded for it. Routes are immutable once built.

pub mod handler;
pub mod pattern;

use crate::error::Result;
use crate::query::QueryParser;
use std::fmt;
use std::path::{Path, PathBuf};

// Re-export commonly used types
pub use handler::{handler, middleware, BoxFuture, Handler, HandlerSource, Middleware, RouteModule};
pub use pattern::{PatternMatch, RoutePattern};

/// Priority given to index routes that do not declare one
pub const INDEX_PRIORITY: i32 = -1;

/// A compiled route
///
/// The pattern is always the one compiled from `path`.
pub struct Route<C> {
    path: String,
    pattern: RoutePattern,
    priority: Option<i32>,
    source: Option<PathBuf>,
    module: RouteModule<C>,
}

impl<C> Route<C> {
    /// Creates a route for `module`
    ///
    /// The module's own `path` wins over `path`. Index routes without an
    /// explicit priority get [`INDEX_PRIORITY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fsroute::{Request, Route, RouteModule};
    ///
    /// let route = Route::new("/widgets/index", RouteModule::<Request>::new()).unwrap();
    /// assert!(route.is_index());
    /// assert_eq!(route.priority(), Some(-1));
    ///
    /// let moved = RouteModule::<Request>::new().with_path("/gadgets");
    /// let route = Route::new("/widgets/index", moved).unwrap();
    /// assert_eq!(route.path(), "/gadgets");
    /// assert_eq!(route.priority(), None);
    /// ```
    pub fn new(path: impl Into<String>, module: RouteModule<C>) -> Result<Self> {
        let path = match module.path() {
            Some(explicit) => explicit.to_string(),
            None => path.into(),
        };
        let pattern = RoutePattern::compile(&path)?;

        let priority = match module.priority() {
            None if pattern.is_index() => Some(INDEX_PRIORITY),
            explicit => explicit,
        };

        Ok(Self {
            path,
            pattern,
            priority,
            source: None,
            module,
        })
    }

    /// Records the file this route was loaded from
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Canonical path (explicit module path, or derived from the file location)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Compiled matcher for [`path`](Self::path)
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Explicit priority, or `-1` for index routes without one
    ///
    /// `None` compares as `0`.
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// File the module was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn module(&self) -> &RouteModule<C> {
        &self.module
    }

    pub fn is_index(&self) -> bool {
        self.pattern.is_index()
    }

    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }

    /// Priority used for ordering (`None` compares as `0`)
    pub fn sort_priority(&self) -> i32 {
        self.priority.unwrap_or(0)
    }

    pub fn matches(&self, url: &str, parser: &dyn QueryParser) -> Option<PatternMatch> {
        self.pattern.matches(url, parser)
    }

    pub fn resolve(&self, method: &str) -> Option<(HandlerSource, &Handler<C>)> {
        self.module.resolve(method)
    }

    pub fn middleware(&self) -> Option<&Middleware<C>> {
        self.module.middleware()
    }
}

impl<C> Clone for Route<C> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            pattern: self.pattern.clone(),
            priority: self.priority,
            source: self.source.clone(),
            module: self.module.clone(),
        }
    }
}

impl<C> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("pattern", &self.pattern.as_str())
            .field("params", &self.pattern.param_names())
            .field("is_index", &self.is_index())
            .field("priority", &self.priority)
            .field("source", &self.source)
            .field("module", &self.module)
            .finish()
    }
}
