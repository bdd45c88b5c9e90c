//! Route module loading
//!
//! Route files only mark *where* a route lives; the handlers themselves are
//! produced by a [`RouteLoader`].

use crate::path::normalize_separators;
use crate::route::RouteModule;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Produces the module exported by a route file
///
/// Any error aborts resolver construction. Implemented for closures:
///
/// ```
/// use fsroute::{Request, RouteModule};
/// use fsroute::registry::RouteLoader;
/// use std::path::Path;
///
/// let loader = |_file: &Path| anyhow::Ok(RouteModule::<Request>::new());
/// assert!(loader.load(Path::new("routes/a.js")).is_ok());
/// ```
pub trait RouteLoader<C>: Send + Sync {
    fn load(&self, file: &Path) -> Result<RouteModule<C>>;
}

impl<C, F> RouteLoader<C> for F
where
    F: Fn(&Path) -> Result<RouteModule<C>> + Send + Sync,
{
    fn load(&self, file: &Path) -> Result<RouteModule<C>> {
        self(file)
    }
}

/// Modules registered in code, keyed by file path relative to the routes directory
///
/// # Examples
///
/// ```
/// use fsroute::{Request, RouteModule};
/// use fsroute::registry::{ModuleTable, RouteLoader};
/// use std::path::Path;
///
/// let table = ModuleTable::new("routes")
///     .with_module("users/:id.js", RouteModule::<Request>::new().with_priority(2));
///
/// let module = table.load(Path::new("routes/users/:id.js")).unwrap();
/// assert_eq!(module.priority(), Some(2));
/// assert!(table.load(Path::new("routes/missing.js")).is_err());
/// ```
pub struct ModuleTable<C> {
    root: PathBuf,
    modules: HashMap<String, RouteModule<C>>,
}

impl<C> ModuleTable<C> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            modules: HashMap::new(),
        }
    }

    /// Registers a module for `relative` (e.g. `"users/index.js"`)
    pub fn with_module(mut self, relative: impl AsRef<str>, module: RouteModule<C>) -> Self {
        self.insert(relative, module);
        self
    }

    pub fn insert(&mut self, relative: impl AsRef<str>, module: RouteModule<C>) {
        let key = table_key(relative.as_ref());
        self.modules.insert(key, module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn key_for(&self, file: &Path) -> String {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        let joined: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        joined.join("/")
    }
}

fn table_key(relative: &str) -> String {
    normalize_separators(relative)
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

impl<C> RouteLoader<C> for ModuleTable<C> {
    fn load(&self, file: &Path) -> Result<RouteModule<C>> {
        let key = self.key_for(file);
        match self.modules.get(&key) {
            Some(module) => Ok(module.clone()),
            None => bail!("no route module registered for `{}`", key),
        }
    }
}
