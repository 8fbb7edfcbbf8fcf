//! Middleware configuration.
//!
//! [`Options`] describes where templates come from and how they are compiled
//! and served. Empty fields mean "use the default"; [`Options::parse_defaults`]
//! fills them in and is applied by [`Templater::new`](crate::Templater::new).
//!
//! The serializable subset can be loaded from YAML:
//!
//! ```rust
//! use stencil::Options;
//!
//! let options = Options::from_yaml(r#"
//! directory: views
//! append_directories: [themes/dark]
//! delimiters:
//!   left: "[["
//!   right: "]]"
//! "#).unwrap();
//!
//! assert_eq!(options.directory, "views");
//! assert_eq!(options.append_directories, vec!["themes/dark"]);
//! ```
//!
//! Pre-built file systems and function tables are not serializable; set them
//! with [`Options::with_file_system`] and [`Options::with_function_table`].

use serde::Deserialize;
use stencil_render::{CompileOptions, Delimiters, FileSystem, FunctionTable, DEFAULT_EXTENSIONS};

/// Default template directory.
pub const DEFAULT_DIRECTORY: &str = "templates";

/// Default response content type.
pub use stencil_render::DEFAULT_CONTENT_TYPE;

/// Template middleware options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Pre-built template files. When set, directories are ignored and
    /// templates are never recompiled.
    #[serde(skip)]
    pub file_system: Option<FileSystem>,
    /// Primary template directory. Default is `"templates"`.
    pub directory: String,
    /// Overlay directories, lowest precedence first. Files here replace the
    /// content of same-path files in the primary directory.
    pub append_directories: Vec<String>,
    /// Template file extensions. Default is `[".tmpl", ".html"]`.
    pub extensions: Vec<String>,
    /// Function tables available to every template, merged in order.
    #[serde(skip)]
    pub function_tables: Vec<FunctionTable>,
    /// Expression delimiters. Default is `{{` and `}}`.
    pub delimiters: Delimiters,
    /// Response content type. Default is `"text/html"`.
    pub content_type: String,
}

impl Options {
    /// Creates empty options; every field takes its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Uses a pre-built file system instead of directories.
    pub fn with_file_system(mut self, fs: FileSystem) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the primary template directory.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Appends an overlay directory. Later overlays take precedence.
    pub fn with_append_directory(mut self, directory: impl Into<String>) -> Self {
        self.append_directories.push(directory.into());
        self
    }

    /// Sets the template file extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a function table.
    pub fn with_function_table(mut self, table: FunctionTable) -> Self {
        self.function_tables.push(table);
        self
    }

    /// Sets the expression delimiters.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Sets the response content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Replaces empty fields with their defaults.
    pub fn parse_defaults(mut self) -> Self {
        if self.directory.is_empty() {
            self.directory = DEFAULT_DIRECTORY.to_string();
        }
        if self.extensions.is_empty() {
            self.extensions = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        }
        let defaults = Delimiters::default();
        if self.delimiters.left.is_empty() {
            self.delimiters.left = defaults.left;
        }
        if self.delimiters.right.is_empty() {
            self.delimiters.right = defaults.right;
        }
        if self.content_type.is_empty() {
            self.content_type = DEFAULT_CONTENT_TYPE.to_string();
        }
        self
    }

    /// Returns true if responses are HTML and expression output is escaped.
    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("html")
    }

    /// Returns the compiler options derived from these options.
    pub(crate) fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            function_tables: self.function_tables.clone(),
            delimiters: self.delimiters.clone(),
            html_escape: self.is_html(),
        }
    }
}
