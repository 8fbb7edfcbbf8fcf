//! # Stencil Render - Template Sets for HTTP Responses
//!
//! `stencil-render` loads template files from directories or embedded bundles,
//! compiles them into a named template set and renders them into HTTP
//! responses.
//!
//! This crate is the framework-independent core of `stencil`. The `stencil`
//! crate wires it into axum as middleware; anything else that can implement
//! [`ResponseSink`] can use it directly.
//!
//! ## Core Concepts
//!
//! - [`FileSystem`]: an ordered list of template [`File`]s, built from a
//!   primary directory plus overlay directories ([`FileSystem::from_dirs`]) or
//!   from an [`EmbeddedBundle`] ([`FileSystem::from_embedded`])
//! - [`compile`]: turns a file system into a [`TemplateSet`]
//! - [`FunctionTable`]: named functions available to every template
//! - [`Renderer`]: executes a template with a [`DataMap`] and writes the
//!   response to a [`ResponseSink`]
//! - [`Env`]: the runtime environment; development mode shows render errors
//!   in the response body
//!
//! ## Naming
//!
//! A template's name is its path relative to the root it was loaded from,
//! with `/` separators and without its extension. `templates/admin/users.tmpl`
//! is `admin/users`. The extension is everything from the first `.` of the
//! file name, so `page.en.tmpl` has extension `.en.tmpl`.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stencil_render::{compile, BufferedResponse, CompileOptions, DataMap, Env, File, FileSystem, Renderer};
//! use http::StatusCode;
//!
//! let fs = FileSystem::from_files(vec![File::new("home", ".tmpl", "Hello, {{ Name }}!")]);
//! let set = compile(&fs, &CompileOptions::new()).unwrap();
//! let renderer = Renderer::new(Arc::new(set), Env::Production);
//!
//! let mut data = DataMap::new();
//! data.insert("Name", "Flamego");
//!
//! let mut response = BufferedResponse::new();
//! renderer.render(StatusCode::OK, "home", &data, &mut response);
//! assert_eq!(response.body(), b"Hello, Flamego!");
//! ```

mod data;
mod embedded;
mod env;
mod error;
mod file_system;
mod pool;
mod renderer;
mod sink;
pub mod template;

pub use data::{is_reserved, DataMap, RENDER_DURATION_KEY, RESERVED_KEYS};
pub use embedded::EmbeddedBundle;
pub use env::{Env, ParseEnvError, ENV_VAR};
pub use error::{Error, Result};
pub use file_system::{file_ext, File, FileSystem, DEFAULT_EXTENSIONS};
pub use pool::{BufferPool, PooledBuffer, DEFAULT_MAX_IDLE, DEFAULT_MAX_RETAINED_CAPACITY};
pub use renderer::{Renderer, DEFAULT_CONTENT_TYPE};
pub use sink::{BufferedResponse, ResponseSink};
pub use template::{compile, CompileOptions, Delimiters, FunctionTable, TemplateSet};

// Template values, functions and errors come from MiniJinja.
pub use minijinja;
pub use minijinja::Value;
