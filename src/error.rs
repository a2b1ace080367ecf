//! Error types for package resolution and import walking

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a directory or import path into a package.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no buildable Go source files in {}", .dir.display())]
    NoGoFiles { dir: PathBuf },

    #[error(
        "found packages {} ({}) and {} ({}) in {}",
        .names[0], .files[0], .names[1], .files[1], .dir.display()
    )]
    MultiplePackages {
        dir: PathBuf,
        names: [String; 2],
        files: [String; 2],
    },

    #[error("cannot find package \"{import_path}\" in any of:{}", format_searched(.searched))]
    NotFound {
        import_path: String,
        searched: Vec<PathBuf>,
    },

    #[error("{}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },
}

fn format_searched(searched: &[PathBuf]) -> String {
    searched
        .iter()
        .map(|p| format!("\n\t{}", p.display()))
        .collect()
}

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Fatal failure of an import walk.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("could not get absolute path for dir \"{}\": {source}", .dir.display())]
    AbsolutePath {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not get package for dir \"{}\": {source}", .dir.display())]
    Directory {
        dir: PathBuf,
        #[source]
        source: ResolveError,
    },

    #[error("could not get package \"{path}\", imported from \"{}\": {source}", .from.display())]
    Import {
        path: String,
        from: PathBuf,
        #[source]
        source: ResolveError,
    },

    #[error("error writing output: {0}")]
    Output(#[from] io::Error),
}
