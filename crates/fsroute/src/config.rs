// File: src/config.rs
// Purpose: Resolver configuration and routing settings from fsroute.toml

use crate::error::ResolveError;
use crate::query::{QueryParser, UrlEncodedQuery, DEFAULT_MAX_KEYS};
use crate::registry::{DirLister, FsLister, RouteLoader};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions recognised as route files when none are configured
pub const DEFAULT_EXTENSIONS: [&str; 2] = [".js", ".ts"];

/// Predicate over a discovered route file
pub type FileFilter = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

// ============================================================================
// Resolver Configuration
// ============================================================================

/// Everything [`create_resolver`](crate::create_resolver) needs besides the
/// routes directory
pub struct ResolverConfig<C> {
    ext: Vec<String>,
    filters: Vec<FileFilter>,
    loader: Arc<dyn RouteLoader<C>>,
    lister: Arc<dyn DirLister>,
    query_parser: Arc<dyn QueryParser>,
}

impl<C> ResolverConfig<C> {
    /// Default extensions, no filter, filesystem listing, urlencoded queries
    pub fn new(loader: impl RouteLoader<C> + 'static) -> Self {
        Self {
            ext: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            filters: Vec::new(),
            loader: Arc::new(loader),
            lister: Arc::new(FsLister),
            query_parser: Arc::new(UrlEncodedQuery::default()),
        }
    }

    /// Replaces the extension allow-list (`"js"` and `".js"` are equivalent)
    pub fn with_ext<I, S>(mut self, ext: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ext = ext
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref();
                if ext.starts_with('.') {
                    ext.to_string()
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        self
    }

    /// Adds a file filter; a file must pass every filter to be loaded
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn with_lister(mut self, lister: impl DirLister + 'static) -> Self {
        self.lister = Arc::new(lister);
        self
    }

    pub fn with_query_parser(mut self, parser: impl QueryParser + 'static) -> Self {
        self.query_parser = Arc::new(parser);
        self
    }

    pub fn ext(&self) -> &[String] {
        &self.ext
    }

    pub fn loader(&self) -> &dyn RouteLoader<C> {
        self.loader.as_ref()
    }

    pub fn lister(&self) -> &dyn DirLister {
        self.lister.as_ref()
    }

    pub fn query_parser(&self) -> Arc<dyn QueryParser> {
        Arc::clone(&self.query_parser)
    }

    /// Whether a discovered file passes every configured filter
    pub fn accepts(&self, file: &Path) -> bool {
        self.filters.iter().all(|filter| filter(file))
    }
}

impl<C> fmt::Debug for ResolverConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("ext", &self.ext)
            .field("filters", &self.filters.len())
            .finish()
    }
}

// ============================================================================
// fsroute.toml
// ============================================================================

/// File-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Directory containing route files (default: "routes")
    #[serde(default = "default_routes_dir")]
    pub routes_dir: PathBuf,

    /// Route file extensions (default: [".js", ".ts"])
    #[serde(default = "default_ext")]
    pub ext: Vec<String>,

    /// Glob patterns, relative to `routes_dir`, of files to skip
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum number of query pairs parsed per request (0 = unlimited)
    #[serde(default = "default_max_query_keys")]
    pub max_query_keys: usize,
}

fn default_routes_dir() -> PathBuf {
    PathBuf::from("routes")
}

fn default_ext() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn default_max_query_keys() -> usize {
    DEFAULT_MAX_KEYS
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routes_dir: default_routes_dir(),
            ext: default_ext(),
            exclude: Vec::new(),
            max_query_keys: default_max_query_keys(),
        }
    }
}

impl RoutingConfig {
    /// Folds these settings into a resolver config
    ///
    /// Sets the extension list and query key limit, and adds one filter
    /// rejecting files matched by any `exclude` glob.
    pub fn apply<C>(&self, config: ResolverConfig<C>) -> Result<ResolverConfig<C>, ResolveError> {
        let patterns = self
            .exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| ResolveError::InvalidGlob {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut config = config
            .with_ext(&self.ext)
            .with_query_parser(UrlEncodedQuery::new().with_max_keys(self.max_query_keys));

        if !patterns.is_empty() {
            let root = self.routes_dir.clone();
            config = config.with_filter(move |file| {
                let relative = file.strip_prefix(&root).unwrap_or(file);
                !patterns.iter().any(|pattern| pattern.matches_path(relative))
            });
        }

        Ok(config)
    }
}

impl Config {
    /// Load configuration from fsroute.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./fsroute.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("fsroute.toml")
    }
}
