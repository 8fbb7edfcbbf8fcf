//! # Stencil - Template Rendering Middleware for axum
//!
//! `stencil` loads templates from a directory (optionally overlaid by further
//! directories) or from a bundle embedded at compile time, compiles them into
//! one named set and renders them into HTTP responses.
//!
//! The rendering core lives in [`stencil_render`] and is re-exported here;
//! this crate adds the axum integration.
//!
//! ## Core Concepts
//!
//! - [`Options`]: where templates come from and how they are served
//! - [`Templater`]: compiles the templates and holds the compiled set
//! - [`inject`]: the middleware function, installed with
//!   `axum::middleware::from_fn_with_state`
//! - [`Template`] and [`Data`]: request extractors for rendering and for the
//!   template data
//!
//! ## Quick Start
//!
//! ```rust
//! use axum::{middleware, routing::get, Router};
//! use http::StatusCode;
//! use stencil::{Data, Env, File, FileSystem, Options, Template, Templater};
//!
//! async fn home(template: Template, data: Data) -> axum::response::Response {
//!     data.insert("Name", "Flamego");
//!     template.html(StatusCode::OK, "home")
//! }
//!
//! let fs = FileSystem::from_files(vec![File::new("home", ".tmpl", "Hello, {{ Name }}!")]);
//! let templater = Templater::new(Options::new().with_file_system(fs), Env::Production).unwrap();
//!
//! let app: Router = Router::new()
//!     .route("/", get(home))
//!     .layer(middleware::from_fn_with_state(templater, stencil::inject));
//! ```
//!
//! ## Live Reloading
//!
//! In [`Env::Development`] with directory-backed options, every request
//! recompiles the templates from disk, so edits show up on the next request.
//! Any other combination compiles once at setup. See [`CompileStrategy`].
//!
//! ## Embedding
//!
//! With the default `macros` feature, `embed_templates!` bakes a directory
//! into the binary:
//!
//! ```rust,ignore
//! use stencil::{embed_templates, EmbeddedBundle};
//!
//! static TEMPLATES: EmbeddedBundle = EmbeddedBundle::new(embed_templates!("templates"));
//!
//! let fs = stencil::FileSystem::from_embedded(&TEMPLATES, "", stencil::DEFAULT_EXTENSIONS)?;
//! let templater = stencil::Templater::new(stencil::Options::new().with_file_system(fs), env)?;
//! ```

mod error;
mod handles;
mod options;
mod templater;

pub use error::{MissingMiddleware, SetupError};
pub use handles::{Data, ResponseBuilder, Template};
pub use options::{Options, DEFAULT_CONTENT_TYPE, DEFAULT_DIRECTORY};
pub use templater::{inject, CompileStrategy, Templater};

// Re-export the rendering core
pub use stencil_render;
pub use stencil_render::{
    compile, BufferPool, CompileOptions, DataMap, Delimiters, EmbeddedBundle, Env, Error, File,
    FileSystem, FunctionTable, Renderer, ResponseSink, TemplateSet, Value, DEFAULT_EXTENSIONS,
    ENV_VAR,
};

#[cfg(feature = "macros")]
pub use stencil_macros::embed_templates;
