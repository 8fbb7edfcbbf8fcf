//! Template set compilation.
//!
//! [`compile`] turns a [`FileSystem`] into a [`TemplateSet`]: one MiniJinja
//! environment holding one parsed template per file name, sharing a single
//! delimiter pair and a single merged function table.
//!
//! Compilation is all-or-nothing. The first file whose content cannot be read
//! or whose source does not parse aborts the pass, and the error names that
//! file. No partially populated set is ever returned.

use std::io;

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};

use super::functions::FunctionTable;
use crate::error::{Error, Result};
use crate::file_system::FileSystem;

/// Left and right delimiters for template expressions.
///
/// Only the expression (variable) delimiters are configurable; block tags
/// keep `{% %}` and comments keep `{# #}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    /// The left delimiter. Default is `"{{"`.
    pub left: String,
    /// The right delimiter. Default is `"}}"`.
    pub right: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            left: "{{".to_string(),
            right: "}}".to_string(),
        }
    }
}

impl Delimiters {
    /// Creates a delimiter pair.
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the compiler needs besides the files themselves.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Function tables, merged in order; later entries win on name collisions.
    pub function_tables: Vec<FunctionTable>,
    /// Expression delimiters.
    pub delimiters: Delimiters,
    /// Escape HTML in expression output.
    pub html_escape: bool,
}

impl CompileOptions {
    /// Creates options with default delimiters, no functions and no escaping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a function table.
    pub fn with_function_table(mut self, table: FunctionTable) -> Self {
        self.function_tables.push(table);
        self
    }

    /// Sets the delimiters.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Enables or disables HTML escaping.
    pub fn with_html_escape(mut self, enabled: bool) -> Self {
        self.html_escape = enabled;
        self
    }
}

/// A compiled, named collection of templates.
///
/// A template set is immutable once built and is safe to share between
/// threads (typically behind an `Arc`).
pub struct TemplateSet {
    env: Environment<'static>,
    names: Vec<String>,
}

impl TemplateSet {
    /// Returns the template names in registration order, without duplicates.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns true if a template with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns the number of templates.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the set holds no templates.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Executes the named template, appending the output to `out`.
    ///
    /// On error `out` may hold partial output; callers own the buffer and
    /// decide what to do with it.
    pub fn render_to<S: Serialize>(&self, name: &str, ctx: S, out: &mut Vec<u8>) -> Result<()> {
        let wrap = |source| Error::Render {
            name: name.to_string(),
            source,
        };
        let template = self.env.get_template(name).map_err(wrap)?;
        template.render_to_write(ctx, out).map_err(wrap)?;
        Ok(())
    }
}

impl std::fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateSet")
            .field("names", &self.names)
            .finish()
    }
}

/// Compiles every file of `fs` into one template set.
///
/// Files are processed in order. A file whose name was already registered
/// (for example `home.html` and `home.tmpl`) replaces the earlier definition.
///
/// # Errors
///
/// - [`Error::Syntax`] if the delimiters are rejected
/// - [`Error::Content`] if a file's content cannot be fetched or is not UTF-8
/// - [`Error::Parse`] if a file does not parse
pub fn compile(fs: &FileSystem, options: &CompileOptions) -> Result<TemplateSet> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::SemiStrict);

    if !options.delimiters.is_default() {
        let syntax = SyntaxConfig::builder()
            .variable_delimiters(
                options.delimiters.left.clone(),
                options.delimiters.right.clone(),
            )
            .build()
            .map_err(Error::Syntax)?;
        env.set_syntax(syntax);
    }

    let escape = if options.html_escape {
        AutoEscape::Html
    } else {
        AutoEscape::None
    };
    env.set_auto_escape_callback(move |_| escape.clone());

    for table in &options.function_tables {
        table.register(&mut env);
    }

    let mut names: Vec<String> = Vec::with_capacity(fs.len());
    for file in fs {
        let name = file.name();
        let data = file.data().map_err(|source| Error::Content {
            name: name.to_string(),
            source,
        })?;
        let source = String::from_utf8(data.into_owned()).map_err(|e| Error::Content {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        env.add_template_owned(name.to_string(), source)
            .map_err(|source| Error::Parse {
                name: name.to_string(),
                source,
            })?;

        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    tracing::debug!(templates = names.len(), "compiled template set");
    Ok(TemplateSet { env, names })
}
