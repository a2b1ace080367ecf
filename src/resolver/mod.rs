//! Package resolution
//!
//! The walker asks a [`Resolver`] two questions: "what package is declared in
//! this directory?" and "where does this import path, imported from that
//! directory, live?". [`GoResolver`] answers them from the filesystem using
//! the GOROOT/GOPATH layout; tests substitute an in-memory resolver.
//!
//! # Module Structure
//!
//! - `constraint` - `//go:build` and `// +build` evaluation, file name suffixes
//! - `source` - package clause and import declaration scanning
//! - `go` - filesystem-backed resolver

pub mod constraint;
mod go;
pub mod source;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ResolveResult;

pub use go::GoResolver;

/// A resolved package. Owned by the resolver; the walker only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Directory holding the package sources
    pub dir: PathBuf,
    /// Name from the package clause
    pub name: String,
    /// Canonical import path (vendor-qualified for vendored packages)
    pub import_path: String,
    /// GOROOT or the GOPATH entry the package was found in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// `<root>/src`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_root: Option<PathBuf>,
    /// Part of the toolchain's standard library
    pub goroot: bool,
    /// Sorted, unique import paths of the buildable files
    pub imports: Vec<String>,
    /// Buildable `.go` files, by name
    pub go_files: Vec<String>,
}

/// Maps directories and import paths to packages.
pub trait Resolver {
    /// Describe the package declared in `dir`.
    fn resolve_dir(&self, dir: &Path) -> ResolveResult<Package>;

    /// Find the package that `import_path` names when imported from `from_dir`.
    fn resolve_import(&self, import_path: &str, from_dir: &Path) -> ResolveResult<Package>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve_dir(&self, dir: &Path) -> ResolveResult<Package> {
        (**self).resolve_dir(dir)
    }

    fn resolve_import(&self, import_path: &str, from_dir: &Path) -> ResolveResult<Package> {
        (**self).resolve_import(import_path, from_dir)
    }
}

/// Report whether `path` is a relative import such as `.`, `./x` or `../x`.
pub fn is_local_import(path: &str) -> bool {
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
}
