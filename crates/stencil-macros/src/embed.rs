//! Directory embedding.
//!
//! The expansion is a plain `&'static [(&'static str, &'static [u8])]` and
//! names no crate, so it works whether the caller depends on `stencil` or on
//! `stencil-render`.

use proc_macro2::TokenStream;
use quote::quote;
use std::path::{Path, PathBuf};
use syn::LitStr;
use walkdir::WalkDir;

/// Generates the entry slice for the directory named by `input`.
pub fn embed_templates_impl(input: LitStr) -> TokenStream {
    let dir_path = match resolve_path(&input.value()) {
        Ok(path) => path,
        Err(e) => return syn::Error::new(input.span(), e).to_compile_error(),
    };

    let files = match collect_files(&dir_path) {
        Ok(files) => files,
        Err(e) => return syn::Error::new(input.span(), e).to_compile_error(),
    };

    let entries: Vec<_> = files
        .iter()
        .map(|(name, path)| {
            let path = path.to_string_lossy();
            quote! { (#name, ::core::include_bytes!(#path) as &[u8]) }
        })
        .collect();

    quote! {
        {
            static ENTRIES: &[(&str, &[u8])] = &[
                #(#entries),*
            ];
            ENTRIES
        }
    }
}

/// Resolves a path relative to the invoking crate's manifest directory.
fn resolve_path(path: &str) -> Result<PathBuf, String> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|_| "CARGO_MANIFEST_DIR is not set".to_string())?;
    Ok(Path::new(&manifest_dir).join(path))
}

/// Collects every regular file below `dir`.
///
/// Returns `(relative_path, absolute_path)` pairs sorted by relative path,
/// where the relative path uses `/` separators and keeps its extension.
fn collect_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, String> {
    if !dir.exists() {
        return Err(format!("Directory not found: {}", dir.display()));
    }
    if !dir.is_dir() {
        return Err(format!("Path is not a directory: {}", dir.display()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("Failed to walk {}: {}", dir.display(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(dir)
            .map_err(|_| format!("Failed to compute relative path for {}", path.display()))?
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        let absolute = path
            .canonicalize()
            .map_err(|e| format!("Failed to resolve {}: {}", path.display(), e))?;

        files.push((relative, absolute));
    }

    // Deterministic output for reproducible builds.
    files.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(files)
}
