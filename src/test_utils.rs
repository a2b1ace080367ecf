//! Test utilities for building throwaway GOROOT/GOPATH trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::BuildContext;
use crate::path_utils::join_slash;

/// A temporary directory laid out as:
///
/// ```text
/// goroot/src/...   standard library packages
/// gopath/src/...   workspace packages
/// work/...         directories outside any root
/// ```
///
/// The tree is removed when dropped.
pub struct GoTree {
    dir: TempDir,
}

impl GoTree {
    /// Create the empty layout.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for sub in ["goroot/src", "gopath/src", "work"] {
            fs::create_dir_all(dir.path().join(sub)).expect("Failed to create tree dirs");
        }
        Self { dir }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Join a slash-separated path onto the root.
    pub fn path(&self, rel: &str) -> PathBuf {
        join_slash(self.dir.path(), rel)
    }

    pub fn goroot(&self) -> PathBuf {
        self.path("goroot")
    }

    pub fn goroot_src(&self) -> PathBuf {
        self.path("goroot/src")
    }

    pub fn gopath(&self) -> PathBuf {
        self.path("gopath")
    }

    pub fn gopath_src(&self) -> PathBuf {
        self.path("gopath/src")
    }

    /// A linux/amd64 context with cgo disabled, pointing at this tree.
    pub fn context(&self) -> BuildContext {
        BuildContext::default()
            .with_target("linux", "amd64")
            .with_cgo(false)
            .with_goroot(self.goroot())
            .with_gopath(vec![self.gopath()])
    }

    /// Write a file, creating parent directories as needed.
    pub fn add_file(&self, rel: &str, content: &str) -> PathBuf {
        let full_path = self.path(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write a single-file package under `GOROOT/src/<import_path>`.
    pub fn add_goroot_package(&self, import_path: &str, content: &str) -> PathBuf {
        self.add_package(&format!("goroot/src/{}", import_path), content)
    }

    /// Write a single-file package under `GOPATH/src/<import_path>`.
    pub fn add_gopath_package(&self, import_path: &str, content: &str) -> PathBuf {
        self.add_package(&format!("gopath/src/{}", import_path), content)
    }

    /// Write a single-file package in `rel_dir`, named after its last
    /// path segment. Returns the package directory.
    pub fn add_package(&self, rel_dir: &str, content: &str) -> PathBuf {
        let name = rel_dir.rsplit('/').next().unwrap_or("pkg");
        self.add_file(&format!("{}/{}.go", rel_dir, name), content);
        self.path(rel_dir)
    }
}

impl Default for GoTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a Go file declaring `package` with a grouped import block.
pub fn go_source(package: &str, imports: &[&str]) -> String {
    let mut src = format!("package {}\n", package);
    if !imports.is_empty() {
        src.push_str("\nimport (\n");
        for import in imports {
            src.push_str(&format!("\t\"{}\"\n", import));
        }
        src.push_str(")\n");
    }
    src
}
