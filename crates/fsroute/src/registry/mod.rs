//! Route registry
//!
//! Builds the ordered route list once, at startup:
//!
//! ```text
//! routes dir ──discover──▶ files ──filter──▶ load module ──▶ assign path
//!            ──compile──▶ default index priority ──▶ stable sort (priority desc)
//! ```
//!
//! Construction is synchronous and blocking. Any listing or loading failure
//! aborts the whole build.

pub mod loader;

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::path::{has_extension, route_path_for};
use crate::route::Route;
use std::cmp::Reverse;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub use loader::{ModuleTable, RouteLoader};

// ============================================================================
// Directory Listing
// ============================================================================

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Lists the immediate children of a directory
pub trait DirLister: Send + Sync {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
}

/// Lists the real filesystem
///
/// Entries come back sorted by file name and symlinks are followed, so the
/// discovery order does not depend on the platform's `readdir` order.
/// Listing anything but a directory is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        if !fs::metadata(dir)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", dir.display()),
            ));
        }

        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| -> io::Result<DirEntry> {
                let entry = entry.map_err(io::Error::from)?;
                Ok(DirEntry {
                    name: entry.file_name().to_os_string(),
                    is_dir: entry.file_type().is_dir(),
                })
            })
            .collect()
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Recursively collects route files below `dir`
///
/// Within a directory, matching files come first (in listing order), then
/// each subdirectory is searched depth-first.
pub fn discover(lister: &dyn DirLister, dir: &Path, ext: &[String]) -> Result<Vec<PathBuf>> {
    let entries = lister.list(dir).map_err(|source| ResolveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .iter()
        .filter(|entry| !entry.is_dir && has_extension(Path::new(&entry.name), ext))
        .map(|entry| dir.join(&entry.name))
        .collect();

    for subdir in entries.iter().filter(|entry| entry.is_dir) {
        files.extend(discover(lister, &dir.join(&subdir.name), ext)?);
    }

    Ok(files)
}

// ============================================================================
// Build
// ============================================================================

/// Sorts routes by descending priority, keeping discovery order among equals
pub fn sort_routes<C>(routes: &mut [Route<C>]) {
    routes.sort_by_key(|route| Reverse(route.sort_priority()));
}

/// Discovers, loads and compiles every route below `root`
pub fn build_routes<C>(root: &Path, config: &ResolverConfig<C>) -> Result<Vec<Route<C>>> {
    let files = discover(config.lister(), root, config.ext())?;
    debug!(root = %root.display(), files = files.len(), "discovered route files");

    let mut routes = Vec::with_capacity(files.len());
    for file in files {
        if !config.accepts(&file) {
            debug!(file = %file.display(), "route file filtered out");
            continue;
        }

        let module = config
            .loader()
            .load(&file)
            .map_err(|source| ResolveError::Load {
                path: file.clone(),
                source,
            })?;

        let route = Route::new(route_path_for(&file, root), module)?.with_source(file);
        debug!(
            path = %route.path(),
            priority = ?route.priority(),
            index = route.is_index(),
            "compiled route"
        );
        routes.push(route);
    }

    sort_routes(&mut routes);
    debug!(routes = routes.len(), "route table ready");

    Ok(routes)
}
