//! Lexical path helpers
//!
//! Paths are cleaned without touching the filesystem, so `..` collapses the
//! way it does in the Go toolchain rather than following symlinks.

use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components and redundant separators.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against the current directory and clean it.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean_path(path));
    }
    let cwd = env::current_dir()?;
    Ok(clean_path(&cwd.join(path)))
}

/// `dir` relative to `root` with `/` separators, if `dir` lies under `root`.
/// Returns an empty string when they are equal.
pub fn subdir(root: &Path, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Join a slash-separated import path onto a directory.
pub fn join_slash(base: &Path, slash_path: &str) -> PathBuf {
    slash_path
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean_path(Path::new("/a/./b/")), PathBuf::from("/a/b"));
        assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean_path(Path::new("a/../..")), PathBuf::from(".."));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("")), PathBuf::from("."));
    }

    #[test]
    fn test_absolute_is_clean() {
        let abs = absolute(Path::new("x/../y")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("y"));
        assert!(!abs.to_string_lossy().contains(".."));
    }

    #[test]
    fn test_subdir() {
        let root = Path::new("/go/src");
        assert_eq!(
            subdir(root, Path::new("/go/src/example.com/a")),
            Some("example.com/a".to_string())
        );
        assert_eq!(subdir(root, Path::new("/go/src")), Some(String::new()));
        assert_eq!(subdir(root, Path::new("/go/srcx/a")), None);
        assert_eq!(subdir(root, Path::new("/elsewhere")), None);
    }

    #[test]
    fn test_join_slash() {
        assert_eq!(
            join_slash(Path::new("/go/src"), "example.com/a/b"),
            PathBuf::from("/go/src/example.com/a/b")
        );
    }
}
