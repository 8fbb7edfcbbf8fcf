//! Error types for loading, compiling and rendering templates.
//!
//! This module provides [`Error`], the single error type returned by every
//! fallible operation in this crate. Each variant carries the path or template
//! name that caused it, so a failure deep inside a directory walk still tells
//! you which file to fix.
//!
//! Two families are kept apart on purpose:
//!
//! - Filesystem errors ([`Error::Canonicalize`], [`Error::Walk`], [`Error::Read`],
//!   [`Error::RelativePath`], [`Error::EmbeddedRootNotFound`]) happen while a
//!   [`FileSystem`](crate::FileSystem) is being assembled.
//! - Template errors ([`Error::Content`], [`Error::Parse`], [`Error::Syntax`],
//!   [`Error::Render`]) happen while compiling or executing a template set.

use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while building file systems, compiling template sets or
/// rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A directory exists but its canonical form could not be resolved.
    #[error("resolve symlinks of {path:?}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The primary directory could not be walked.
    #[error("walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A matched template file could not be read.
    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A walked path did not live under the directory being walked.
    #[error("get relative path of {path:?} from {root:?}")]
    RelativePath { path: PathBuf, root: PathBuf },

    /// The requested root does not exist inside an embedded bundle.
    #[error("walk embedded bundle: root {root:?} not found")]
    EmbeddedRootNotFound { root: String },

    /// The content of a file could not be obtained or is not valid UTF-8.
    #[error("get data of {name:?}: {source}")]
    Content {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A template failed to parse.
    #[error("parse {name:?}: {source}")]
    Parse {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// The delimiter configuration was rejected by the template engine.
    #[error("configure delimiters: {0}")]
    Syntax(#[source] minijinja::Error),

    /// The configured content type is not a valid header value.
    #[error("invalid content type {value:?}: {source}")]
    ContentType {
        value: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    /// Executing a template failed.
    #[error("render {name:?}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

impl Error {
    /// Returns the template name this error refers to, if any.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Error::Content { name, .. } | Error::Parse { name, .. } | Error::Render { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Returns true for errors raised while assembling a file system.
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            Error::Canonicalize { .. }
                | Error::Walk { .. }
                | Error::Read { .. }
                | Error::RelativePath { .. }
                | Error::EmbeddedRootNotFound { .. }
        )
    }

    /// Returns true when rendering failed because the template does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Render { source, .. } if source.kind() == minijinja::ErrorKind::TemplateNotFound
        )
    }
}
