// File: src/error.rs
// Purpose: Errors raised while building a resolver

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while discovering, loading or compiling routes.
///
/// All of them are fatal for resolver construction: a route set with one
/// broken file is never handed out partially.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A routes directory (or one of its subdirectories) could not be listed
    #[error("failed to read routes directory {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The module loader rejected a route file
    #[error("failed to load route module {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A path template produced an expression the regex engine refused
    #[error("invalid route template `{template}`")]
    Pattern {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// An `exclude` entry in the routing config is not a valid glob
    #[error("invalid exclude pattern `{pattern}`")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
