//! Proc macros for Stencil.
//!
//! - [`embed_templates!`] - Embed a directory of template files into the binary
//!
//! The macro only discovers and embeds files. Extension filtering and template
//! naming happen at runtime in `stencil_render::FileSystem::from_embedded`, so
//! embedded and on-disk templates follow exactly the same rules.

mod embed;

use proc_macro::TokenStream;
use syn::{parse_macro_input, LitStr};

/// Embeds every file below a directory at compile time.
///
/// The path is resolved relative to the `Cargo.toml` of the crate invoking the
/// macro. The expansion is a `&'static [(&'static str, &'static [u8])]` of
/// `/`-separated relative paths (extension included) and raw file bytes,
/// sorted by path, ready for `EmbeddedBundle::new`.
///
/// ```rust,ignore
/// use stencil_render::{EmbeddedBundle, FileSystem, DEFAULT_EXTENSIONS};
///
/// static TEMPLATES: EmbeddedBundle = EmbeddedBundle::new(stencil_macros::embed_templates!("templates"));
///
/// let fs = FileSystem::from_embedded(&TEMPLATES, "", DEFAULT_EXTENSIONS)?;
/// ```
///
/// Files are embedded with `include_bytes!`, so editing an embedded file
/// triggers a rebuild. Adding or removing a file does not: touch the invoking
/// crate (or emit `cargo:rerun-if-changed` for the directory from a build
/// script) to pick up the new listing. Symlinked directories are followed.
///
/// # Compile-Time Errors
///
/// The macro fails to compile if the directory does not exist, is not a
/// directory, cannot be read, or contains a symlink loop.
#[proc_macro]
pub fn embed_templates(input: TokenStream) -> TokenStream {
    let path_lit = parse_macro_input!(input as LitStr);
    embed::embed_templates_impl(path_lit).into()
}
