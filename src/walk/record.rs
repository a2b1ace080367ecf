//! Edges of the import graph and the rows emitted for them

use std::path::PathBuf;

use serde::Serialize;

use crate::resolver::Package;

/// "`from_dir` declares an import of `import_path`". Also the dedup key:
/// a path imported from several directories is reported once per directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportEdge {
    pub import_path: String,
    pub from_dir: PathBuf,
}

impl ImportEdge {
    pub fn new(import_path: impl Into<String>, from_dir: impl Into<PathBuf>) -> Self {
        Self {
            import_path: import_path.into(),
            from_dir: from_dir.into(),
        }
    }
}

/// One output row: an edge together with where it resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub from_dir: PathBuf,
    pub import_path: String,
    pub dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_root: Option<PathBuf>,
    pub canonical_import_path: String,
    pub goroot: bool,
}

impl Record {
    pub fn new(edge: &ImportEdge, package: &Package) -> Self {
        Self {
            from_dir: edge.from_dir.clone(),
            import_path: edge.import_path.clone(),
            dir: package.dir.clone(),
            src_root: package.src_root.clone(),
            canonical_import_path: package.import_path.clone(),
            goroot: package.goroot,
        }
    }
}
