//! Template set compilation with MiniJinja.
//!
//! This module turns a [`FileSystem`](crate::FileSystem) into a
//! [`TemplateSet`]. Everything that shapes the result is passed explicitly
//! through [`CompileOptions`]:
//!
//! - [`FunctionTable`]s, merged in order into every template
//! - [`Delimiters`], the expression delimiter pair
//! - HTML escaping, on for HTML content types
//!
//! ```rust
//! use stencil_render::{compile, CompileOptions, File, FileSystem, FunctionTable};
//!
//! let fs = FileSystem::from_files(vec![File::new("home", ".tmpl", "{{ shout(Name) }}")]);
//! let options = CompileOptions::new()
//!     .with_function_table(FunctionTable::new().function("shout", |s: String| s.to_uppercase()));
//!
//! let set = compile(&fs, &options).unwrap();
//! let mut out = Vec::new();
//! set.render_to("home", serde_json::json!({"Name": "flamego"}), &mut out).unwrap();
//! assert_eq!(out, b"FLAMEGO");
//! ```
//!
//! The expression language is MiniJinja's; this crate only decides which
//! sources go in and how they are named.

mod compiler;
mod functions;

pub use compiler::{compile, CompileOptions, Delimiters, TemplateSet};
pub use functions::FunctionTable;
