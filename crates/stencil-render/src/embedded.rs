//! Compile-time embedded template bundles.
//!
//! An [`EmbeddedBundle`] holds `(relative_path, bytes)` pairs baked into the
//! binary, usually by the `embed_templates!` macro from `stencil-macros`:
//!
//! ```rust,ignore
//! use stencil_render::{EmbeddedBundle, FileSystem};
//!
//! static TEMPLATES: EmbeddedBundle = EmbeddedBundle::new(stencil_macros::embed_templates!("templates"));
//!
//! let fs = FileSystem::from_embedded(&TEMPLATES, "", &[".tmpl", ".html"])?;
//! ```
//!
//! The bundle is fixed at build time: there are no overlays and edits on disk
//! are never picked up, regardless of the runtime environment.

use crate::error::{Error, Result};
use crate::file_system::{file_ext, is_allowed, File, FileSystem};

/// A read-only set of files embedded at compile time.
///
/// Paths are relative, `/`-separated and keep their extension
/// (e.g. `"admin/users.html"`).
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedBundle {
    entries: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedBundle {
    /// Creates a bundle from static entries.
    ///
    /// This is typically called by the `embed_templates!` macro.
    pub const fn new(entries: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { entries }
    }

    /// Returns the embedded entries.
    pub fn entries(&self) -> &'static [(&'static str, &'static [u8])] {
        self.entries
    }

    /// Returns true if `root` names the bundle itself or a directory inside it.
    fn has_dir(&self, root: &str) -> bool {
        root.is_empty()
            || self
                .entries
                .iter()
                .any(|(path, _)| path.strip_prefix(root).is_some_and(|r| r.starts_with('/')))
    }
}

impl FileSystem {
    /// Walks an embedded bundle below `root`.
    ///
    /// Names follow the same rule as [`FileSystem::from_dirs`]: the path
    /// relative to `root`, without extension. An empty root or `"."` walks the
    /// whole bundle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmbeddedRootNotFound`] if `root` is not a directory of
    /// the bundle.
    pub fn from_embedded<E: AsRef<str>>(
        bundle: &EmbeddedBundle,
        root: &str,
        extensions: &[E],
    ) -> Result<Self> {
        let root = normalize_root(root);
        if !bundle.has_dir(root) {
            return Err(Error::EmbeddedRootNotFound {
                root: root.to_string(),
            });
        }

        let mut entries: Vec<_> = bundle
            .entries()
            .iter()
            .filter_map(|(path, data)| relative_to(path, root).map(|rel| (rel, *data)))
            .collect();
        entries.sort_by_key(|(relative, _)| *relative);

        let mut fs = FileSystem::new();
        for (relative, data) in entries {
            let file_name = relative.rsplit('/').next().unwrap_or(relative);
            let ext = file_ext(file_name);
            // A bare extension such as `.tmpl` names nothing.
            if !is_allowed(ext, extensions) || ext.len() == file_name.len() {
                continue;
            }
            let name = &relative[..relative.len() - ext.len()];
            fs.push(File::from_static(name, ext, data));
        }
        Ok(fs)
    }
}

fn normalize_root(root: &str) -> &str {
    let root = root.trim_matches('/');
    if root == "." {
        ""
    } else {
        root.strip_prefix("./").unwrap_or(root)
    }
}

fn relative_to<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    if root.is_empty() {
        return Some(path);
    }
    path.strip_prefix(root)?.strip_prefix('/')
}
