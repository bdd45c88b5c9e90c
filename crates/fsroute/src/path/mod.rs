//! Path utilities for route discovery
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;
use std::path::{Component, Path};

/// Replaces Windows separators with `/`
///
/// Returns `Cow::Borrowed` when the input has no backslash (zero allocations).
///
/// # Examples
///
/// ```
/// use fsroute::path::normalize_separators;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_separators("/users/:id"), Cow::Borrowed(_)));
/// assert_eq!(normalize_separators("\\users\\index"), "/users/index");
/// ```
pub fn normalize_separators(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

/// Returns the extension of a file name including the leading dot
///
/// Dotfiles without a further extension (`.js`) have none, matching how
/// route files are recognised.
///
/// # Examples
///
/// ```
/// use fsroute::path::dotted_extension;
/// use std::path::Path;
///
/// assert_eq!(dotted_extension(Path::new("users.js")), Some(".js".to_string()));
/// assert_eq!(dotted_extension(Path::new("types.d.ts")), Some(".ts".to_string()));
/// assert_eq!(dotted_extension(Path::new(".js")), None);
/// assert_eq!(dotted_extension(Path::new("README")), None);
/// ```
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Checks a file name against an extension allow-list (`[".js", ".ts"]`)
pub fn has_extension(path: &Path, allowed: &[String]) -> bool {
    dotted_extension(path)
        .map(|ext| allowed.iter().any(|allowed| *allowed == ext))
        .unwrap_or(false)
}

/// Derives the canonical route path of a file below the routes directory
///
/// `"/"` + path relative to `root`, extension stripped, separators
/// normalised to `/`.
///
/// # Examples
///
/// ```
/// use fsroute::path::route_path_for;
/// use std::path::Path;
///
/// let root = Path::new("routes");
/// assert_eq!(route_path_for(Path::new("routes/about.js"), root), "/about");
/// assert_eq!(route_path_for(Path::new("routes/users/:id.ts"), root), "/users/:id");
/// assert_eq!(route_path_for(Path::new("routes/index.js"), root), "/index");
/// ```
pub fn route_path_for(file: &Path, root: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let without_ext = relative.with_extension("");

    let segments: Vec<Cow<'_, str>> = without_ext
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect();

    let joined = segments.join("/");
    format!("/{}", normalize_separators(&joined))
}
