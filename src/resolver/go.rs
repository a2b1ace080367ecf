//! Filesystem-backed resolver following the GOROOT/GOPATH layout

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::constraint::{matches_file_name, should_build};
use super::source::parse_header;
use super::{Package, Resolver, is_local_import};
use crate::config::BuildContext;
use crate::error::{ResolveError, ResolveResult};
use crate::path_utils::{clean_path, join_slash, subdir};

/// A directory that import paths are resolved against: GOROOT or one
/// GOPATH entry.
#[derive(Debug, Clone)]
struct SrcRoot {
    root: PathBuf,
    src: PathBuf,
    goroot: bool,
}

/// Where a package directory sits relative to the configured roots.
#[derive(Debug, Clone, Default)]
struct Location {
    import_path: String,
    root: Option<PathBuf>,
    goroot: bool,
}

/// Package name, imports and files gathered from one directory.
#[derive(Debug, Default)]
struct DirContents {
    name: String,
    imports: Vec<String>,
    go_files: Vec<String>,
}

/// Resolves packages the way the Go toolchain does in GOPATH mode.
#[derive(Debug, Clone)]
pub struct GoResolver {
    ctx: BuildContext,
}

impl GoResolver {
    pub fn new(ctx: BuildContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    /// GOROOT first, then each GOPATH entry in order.
    fn src_roots(&self) -> Vec<SrcRoot> {
        let goroot = self.ctx.goroot.iter().map(|root| SrcRoot {
            root: root.clone(),
            src: root.join("src"),
            goroot: true,
        });
        let gopath = self.ctx.gopath.iter().map(|root| SrcRoot {
            root: root.clone(),
            src: root.join("src"),
            goroot: false,
        });
        goroot.chain(gopath).collect()
    }

    /// Derive the canonical import path of `dir` from the root containing it.
    /// Directories under `testdata` have none.
    fn locate(&self, dir: &Path) -> Option<Location> {
        self.src_roots().into_iter().find_map(|root| {
            let sub = subdir(&root.src, dir)?;
            if sub.is_empty() || in_testdata(&sub) {
                return None;
            }
            Some(Location {
                import_path: sub,
                root: Some(root.root),
                goroot: root.goroot,
            })
        })
    }

    /// Look for `import_path` in the vendor directories between `from_dir`
    /// and the src root containing it, innermost first.
    fn search_vendor(
        &self,
        import_path: &str,
        from_dir: &Path,
        searched: &mut Vec<PathBuf>,
    ) -> Option<(PathBuf, Location)> {
        for root in self.src_roots() {
            let Some(sub) = subdir(&root.root, from_dir) else {
                continue;
            };
            if !(sub == "src" || sub.starts_with("src/")) || sub.contains("/testdata/") {
                continue;
            }

            let mut sub = sub.as_str();
            loop {
                let vendor = join_slash(&root.root, sub).join("vendor");
                if vendor.is_dir() {
                    let dir = join_slash(&vendor, import_path);
                    if dir.is_dir() && has_go_files(&dir) {
                        let vendored = format!("{}/vendor/{}", sub, import_path);
                        let import_path = vendored
                            .strip_prefix("src/")
                            .unwrap_or(&vendored)
                            .to_string();
                        debug!(%import_path, dir = %dir.display(), "resolved from vendor tree");
                        return Some((
                            dir,
                            Location {
                                import_path,
                                root: Some(root.root.clone()),
                                goroot: root.goroot,
                            },
                        ));
                    }
                    searched.push(dir);
                }
                match sub.rfind('/') {
                    Some(i) => sub = &sub[..i],
                    None => break,
                }
            }
        }
        None
    }

    /// Find the directory for a non-local import path.
    fn find(&self, import_path: &str, from_dir: &Path) -> ResolveResult<(PathBuf, Location)> {
        let mut searched = Vec::new();

        if let Some(found) = self.search_vendor(import_path, from_dir, &mut searched) {
            return Ok(found);
        }

        for root in self.src_roots() {
            let dir = join_slash(&root.src, import_path);
            if dir.is_dir() {
                trace!(%import_path, dir = %dir.display(), goroot = root.goroot, "found");
                return Ok((
                    dir,
                    Location {
                        import_path: import_path.to_string(),
                        root: Some(root.root),
                        goroot: root.goroot,
                    },
                ));
            }
            searched.push(dir);
        }

        Err(ResolveError::NotFound {
            import_path: import_path.to_string(),
            searched,
        })
    }

    /// Read the buildable Go files of `dir`.
    fn read_dir(&self, dir: &Path) -> ResolveResult<DirContents> {
        let entries = fs::read_dir(dir).map_err(|source| ResolveError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        let mut contents = DirContents::default();
        let mut first_file = String::new();
        let mut imports = BTreeSet::new();

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if !name.ends_with(".go") || !path.is_file() {
                continue;
            }
            if name.starts_with('_') || name.starts_with('.') || name.ends_with("_test.go") {
                trace!(file = %name, "ignored by name");
                continue;
            }
            if !matches_file_name(&name, &self.ctx) {
                trace!(file = %name, "excluded by GOOS/GOARCH suffix");
                continue;
            }

            let bytes = fs::read(&path).map_err(|source| ResolveError::Io {
                path: path.clone(),
                source,
            })?;
            let text = String::from_utf8_lossy(&bytes);
            let content: &str = text.strip_prefix('\u{feff}').unwrap_or(&text);

            let build = should_build(content, &self.ctx).map_err(|e| ResolveError::Parse {
                file: path.clone(),
                message: e.to_string(),
            })?;
            if !build {
                trace!(file = %name, "excluded by build constraints");
                continue;
            }

            let header = parse_header(content).map_err(|message| ResolveError::Parse {
                file: path.clone(),
                message,
            })?;
            if header.package == "documentation" {
                continue;
            }
            if header.imports_cgo() && !self.ctx.cgo_enabled {
                trace!(file = %name, "excluded: cgo disabled");
                continue;
            }

            if contents.name.is_empty() {
                contents.name = header.package;
                first_file = name.clone();
            } else if contents.name != header.package {
                return Err(ResolveError::MultiplePackages {
                    dir: dir.to_path_buf(),
                    names: [contents.name, header.package],
                    files: [first_file, name],
                });
            }

            imports.extend(header.imports);
            contents.go_files.push(name);
        }

        if contents.go_files.is_empty() {
            return Err(ResolveError::NoGoFiles {
                dir: dir.to_path_buf(),
            });
        }

        contents.imports = imports.into_iter().collect();
        Ok(contents)
    }

    fn load(&self, dir: PathBuf, location: Location) -> ResolveResult<Package> {
        let contents = self.read_dir(&dir)?;
        let src_root = location.root.as_ref().map(|r| r.join("src"));
        Ok(Package {
            dir,
            name: contents.name,
            import_path: location.import_path,
            root: location.root,
            src_root,
            goroot: location.goroot,
            imports: contents.imports,
            go_files: contents.go_files,
        })
    }

    /// Resolve `.`, `./x` or `../x` relative to `from_dir`.
    fn resolve_local(&self, import_path: &str, from_dir: &Path) -> ResolveResult<Package> {
        let dir = clean_path(&from_dir.join(import_path));
        if !dir.is_dir() {
            return Err(ResolveError::NotFound {
                import_path: import_path.to_string(),
                searched: vec![dir],
            });
        }
        let location = self.locate(&dir).unwrap_or_else(|| Location {
            import_path: import_path.to_string(),
            ..Default::default()
        });
        self.load(dir, location)
    }
}

impl Resolver for GoResolver {
    fn resolve_dir(&self, dir: &Path) -> ResolveResult<Package> {
        self.resolve_local(".", dir)
    }

    fn resolve_import(&self, import_path: &str, from_dir: &Path) -> ResolveResult<Package> {
        if is_local_import(import_path) {
            return self.resolve_local(import_path, from_dir);
        }
        let (dir, location) = self.find(import_path, from_dir)?;
        self.load(dir, location)
    }
}

fn in_testdata(sub: &str) -> bool {
    sub == "testdata"
        || sub.starts_with("testdata/")
        || sub.ends_with("/testdata")
        || sub.contains("/testdata/")
}

fn has_go_files(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name().to_string_lossy().ends_with(".go") && e.path().is_file()
            })
        })
        .unwrap_or(false)
}
