//! Template file systems and the layered directory resolver.
//!
//! A [`FileSystem`] is an ordered list of [`File`]s that the
//! [compiler](crate::compile) turns into a [`TemplateSet`](crate::TemplateSet).
//! File systems come from three places:
//!
//! - [`FileSystem::from_dirs`]: a primary directory plus optional overlays
//! - [`FileSystem::from_embedded`](crate::EmbeddedBundle): a compile-time bundle
//! - [`FileSystem::from_files`]: files assembled by hand
//!
//! ## Name Resolution
//!
//! Files are referenced by their path relative to the root, without extension,
//! always using `/` as the separator:
//!
//! | File Path | Template Name |
//! |-----------|---------------|
//! | `templates/home.tmpl` | `"home"` |
//! | `templates/admin/users.html` | `"admin/users"` |
//! | `templates/mail/welcome.txt.tmpl` | `"mail/welcome"` (extension is `.txt.tmpl`) |
//!
//! The extension is everything from the first `.` of the file name, so
//! `welcome.txt.tmpl` only matches when `.txt.tmpl` is an allowed extension.
//!
//! ## Overlays
//!
//! Overlay ("append") directories can replace the content of templates that
//! exist in the primary directory. They never add templates:
//!
//! ```text
//! templates/            <- primary: defines which names exist
//! ├── home.tmpl         "A"
//! └── about.tmpl        "About"
//! themes/dark/          <- overlay
//! ├── home.tmpl         "B"   (wins over primary)
//! └── extra.tmpl        "X"   (ignored: not in primary)
//! ```
//!
//! With several overlays the last one listed wins. Overlays that do not exist
//! on disk are skipped; a primary directory that cannot be walked is an error.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Default template file extensions.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".tmpl", ".html"];

type ContentFn = dyn Fn() -> io::Result<Vec<u8>> + Send + Sync;

/// Where a file's bytes live.
#[derive(Clone)]
enum Content {
    /// Bytes read from disk or supplied by the caller.
    Owned(Arc<[u8]>),
    /// Bytes baked into the binary.
    Static(&'static [u8]),
    /// Bytes fetched on demand; fetching may fail.
    Lazy(Arc<ContentFn>),
}

/// A template file: its resolution name, extension and content.
///
/// The name never contains the extension: `home.tmpl` has name `"home"` and
/// extension `".tmpl"`.
#[derive(Clone)]
pub struct File {
    name: String,
    ext: String,
    content: Content,
}

impl File {
    /// Creates a file with owned content.
    pub fn new(name: impl Into<String>, ext: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            ext: ext.into(),
            content: Content::Owned(Arc::from(data.into())),
        }
    }

    /// Creates a file backed by static bytes, as produced by embedding.
    pub fn from_static(
        name: impl Into<String>,
        ext: impl Into<String>,
        data: &'static [u8],
    ) -> Self {
        Self {
            name: name.into(),
            ext: ext.into(),
            content: Content::Static(data),
        }
    }

    /// Creates a file whose content is fetched when the template set is compiled.
    ///
    /// Errors returned by `fetch` abort compilation with the file's name attached.
    pub fn lazy<F>(name: impl Into<String>, ext: impl Into<String>, fetch: F) -> Self
    where
        F: Fn() -> io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ext: ext.into(),
            content: Content::Lazy(Arc::new(fetch)),
        }
    }

    /// Returns the name of the file without its extension (`"home"`, not `"home.tmpl"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the extension, including the leading dot (`".tmpl"`, not `"tmpl"`).
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Returns the file content.
    pub fn data(&self) -> io::Result<Cow<'_, [u8]>> {
        match &self.content {
            Content::Owned(bytes) => Ok(Cow::Borrowed(bytes)),
            Content::Static(bytes) => Ok(Cow::Borrowed(bytes)),
            Content::Lazy(fetch) => fetch().map(Cow::Owned),
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = match &self.content {
            Content::Owned(bytes) => format!("{} bytes", bytes.len()),
            Content::Static(bytes) => format!("{} static bytes", bytes.len()),
            Content::Lazy(_) => "lazy".to_string(),
        };
        f.debug_struct("File")
            .field("name", &self.name)
            .field("ext", &self.ext)
            .field("content", &content)
            .finish()
    }
}

/// An ordered collection of template files.
#[derive(Debug, Clone, Default)]
pub struct FileSystem {
    files: Vec<File>,
}

impl FileSystem {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a file system from files assembled by hand.
    pub fn from_files(files: Vec<File>) -> Self {
        Self { files }
    }

    /// Merges a primary directory with overlay directories.
    ///
    /// The primary directory alone determines which templates exist. For each
    /// template, the content comes from the last overlay that has a regular
    /// file at the same relative path, falling back to the primary.
    ///
    /// # Errors
    ///
    /// - [`Error::Walk`] if the primary directory is missing or cannot be walked
    /// - [`Error::Canonicalize`] if an existing directory cannot be resolved
    /// - [`Error::Read`] if a matched file cannot be read
    /// - [`Error::RelativePath`] if a walked path escapes the primary directory
    ///
    /// Missing overlay directories are never an error.
    pub fn from_dirs<P, O, E>(primary: P, overlays: &[O], extensions: &[E]) -> Result<Self>
    where
        P: AsRef<Path>,
        O: AsRef<Path>,
        E: AsRef<str>,
    {
        let primary = canonical_primary(primary.as_ref())?;

        let mut layers = Vec::with_capacity(overlays.len());
        for overlay in overlays {
            if let Some(dir) = canonical_overlay(overlay.as_ref())? {
                layers.push(dir);
            }
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&primary)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::Walk {
                path: e.path().map_or_else(|| primary.clone(), Path::to_path_buf),
                source: io::Error::from(e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            let ext = file_ext(&file_name);
            if !is_allowed(ext, extensions) {
                continue;
            }
            if ext.len() == file_name.len() {
                tracing::debug!(path = %entry.path().display(), "skipping template file without a name");
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&primary)
                .map_err(|_| Error::RelativePath {
                    path: entry.path().to_path_buf(),
                    root: primary.clone(),
                })?;
            let name = template_name(relative, ext);

            let source = resolve_layer(&primary, &layers, relative);
            let data = fs::read(&source).map_err(|e| Error::Read {
                path: source.clone(),
                source: e,
            })?;

            tracing::trace!(name = %name, path = %source.display(), "loaded template file");
            files.push(File::new(name, ext, data));
        }

        Ok(Self { files })
    }

    /// Returns the files in walk order.
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Appends a file.
    pub fn push(&mut self, file: File) {
        self.files.push(file);
    }

    /// Returns an iterator over file names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(File::name)
    }

    /// Returns the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if there are no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<File> for FileSystem {
    fn from_iter<I: IntoIterator<Item = File>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSystem {
    type Item = &'a File;
    type IntoIter = std::slice::Iter<'a, File>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

// =============================================================================
// Shared helper functions for extension and name handling
// =============================================================================

/// Returns the extension of a file name: everything from the first `.`.
///
/// Returns an empty string when the name has no dot.
///
/// ```rust
/// use stencil_render::file_ext;
///
/// assert_eq!(file_ext("home.tmpl"), ".tmpl");
/// assert_eq!(file_ext("welcome.txt.tmpl"), ".txt.tmpl");
/// assert_eq!(file_ext("README"), "");
/// ```
pub fn file_ext(file_name: &str) -> &str {
    match file_name.find('.') {
        Some(i) => &file_name[i..],
        None => "",
    }
}

/// Returns true if `ext` is non-empty and appears in `extensions`.
pub(crate) fn is_allowed<E: AsRef<str>>(ext: &str, extensions: &[E]) -> bool {
    !ext.is_empty() && extensions.iter().any(|allowed| allowed.as_ref() == ext)
}

/// Derives the template name from a relative path and its extension.
fn template_name(relative: &Path, ext: &str) -> String {
    let relative = relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/");
    relative
        .strip_suffix(ext)
        .map(str::to_string)
        .unwrap_or(relative)
}

/// Canonicalizes the primary directory. Any failure is fatal.
fn canonical_primary(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(dir) => Ok(dir),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::Walk {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) => Err(Error::Canonicalize {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Canonicalizes an overlay directory, returning `None` when it does not exist.
fn canonical_overlay(path: &Path) -> Result<Option<PathBuf>> {
    if !path.is_dir() {
        tracing::debug!(path = %path.display(), "skipping missing overlay directory");
        return Ok(None);
    }
    fs::canonicalize(path)
        .map(Some)
        .map_err(|e| Error::Canonicalize {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Picks the file that supplies content for `relative`: last overlay first,
/// primary last.
fn resolve_layer(primary: &Path, overlays: &[PathBuf], relative: &Path) -> PathBuf {
    overlays
        .iter()
        .rev()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| primary.join(relative))
}
