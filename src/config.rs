//! Build context: where packages live and which files count as buildable
//!
//! Mirrors the knobs of the Go toolchain's default build context. Values are
//! read once from the environment and then passed around explicitly.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Newest `go1.N` release tag that is considered satisfied.
pub const DEFAULT_GO_MINOR: u32 = 22;

/// Operating systems recognized in file name suffixes and constraints.
pub const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

/// Operating systems that satisfy the `unix` build tag.
pub const UNIX_OS: &[&str] = &[
    "aix",
    "android",
    "darwin",
    "dragonfly",
    "freebsd",
    "hurd",
    "illumos",
    "ios",
    "linux",
    "netbsd",
    "openbsd",
    "solaris",
];

/// Architectures recognized in file name suffixes and constraints.
pub const KNOWN_ARCH: &[&str] = &[
    "386",
    "amd64",
    "amd64p32",
    "arm",
    "armbe",
    "arm64",
    "arm64be",
    "loong64",
    "mips",
    "mipsle",
    "mips64",
    "mips64le",
    "mips64p32",
    "mips64p32le",
    "ppc",
    "ppc64",
    "ppc64le",
    "riscv",
    "riscv64",
    "s390",
    "s390x",
    "sparc",
    "sparc64",
    "wasm",
];

/// Everything the resolver needs to decide where a package lives and which of
/// its files are part of the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    pub goos: String,
    pub goarch: String,
    pub cgo_enabled: bool,
    /// Extra tags from `--tags`
    pub build_tags: Vec<String>,
    /// `go1.1` .. `go1.N`
    pub release_tags: Vec<String>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            goroot: None,
            gopath: Vec::new(),
            goos: host_goos().to_string(),
            goarch: host_goarch().to_string(),
            cgo_enabled: true,
            build_tags: Vec::new(),
            release_tags: release_tags(DEFAULT_GO_MINOR),
        }
    }
}

impl BuildContext {
    /// Build a context from `GOROOT`, `GOPATH`, `GOOS`, `GOARCH` and
    /// `CGO_ENABLED`, falling back to host defaults.
    pub fn from_env() -> Self {
        let goos = non_empty_var("GOOS").unwrap_or_else(|| host_goos().to_string());
        let goarch = non_empty_var("GOARCH").unwrap_or_else(|| host_goarch().to_string());

        let cgo_enabled = match non_empty_var("CGO_ENABLED").as_deref() {
            Some("0") => false,
            Some("1") => true,
            _ => goos == host_goos() && goarch == host_goarch(),
        };

        let goroot = non_empty_var("GOROOT")
            .map(PathBuf::from)
            .or_else(goroot_from_toolchain);

        let gopath = match env::var_os("GOPATH").filter(|v| !v.is_empty()) {
            Some(value) => env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            None => home_dir().map(|h| vec![h.join("go")]).unwrap_or_default(),
        };

        let ctx = Self {
            goroot,
            gopath,
            goos,
            goarch,
            cgo_enabled,
            ..Default::default()
        };
        debug!(?ctx, "build context from environment");
        ctx
    }

    /// Replace the build tags with the comma-separated `tags` list.
    /// Empty entries are dropped.
    pub fn with_build_tags(mut self, tags: &str) -> Self {
        self.build_tags = parse_tag_list(tags);
        self
    }

    pub fn with_goroot(mut self, goroot: impl Into<PathBuf>) -> Self {
        self.goroot = Some(goroot.into());
        self
    }

    pub fn with_gopath(mut self, gopath: Vec<PathBuf>) -> Self {
        self.gopath = gopath;
        self
    }

    pub fn with_cgo(mut self, enabled: bool) -> Self {
        self.cgo_enabled = enabled;
        self
    }

    pub fn with_target(mut self, goos: &str, goarch: &str) -> Self {
        self.goos = goos.to_string();
        self.goarch = goarch.to_string();
        self
    }

    /// `GOROOT/src`, if a GOROOT is configured.
    pub fn goroot_src(&self) -> Option<PathBuf> {
        self.goroot.as_ref().map(|r| r.join("src"))
    }

    /// Report whether `tag` is satisfied by this context.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || tag == "gc" {
            return true;
        }
        if tag == "cgo" {
            return self.cgo_enabled;
        }
        if tag == "unix" && UNIX_OS.contains(&self.goos.as_str()) {
            return true;
        }
        // Some GOOS values imply another one.
        match (self.goos.as_str(), tag) {
            ("android", "linux") | ("illumos", "solaris") | ("ios", "darwin") => return true,
            _ => {}
        }
        self.build_tags.iter().any(|t| t == tag) || self.release_tags.iter().any(|t| t == tag)
    }
}

/// Split a comma-separated tag list, skipping empty entries.
pub fn parse_tag_list(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn release_tags(max_minor: u32) -> Vec<String> {
    (1..=max_minor).map(|minor| format!("go1.{}", minor)).collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn home_dir() -> Option<PathBuf> {
    non_empty_var("HOME")
        .or_else(|| non_empty_var("USERPROFILE"))
        .map(PathBuf::from)
}

/// Ask an installed `go` binary for its GOROOT.
fn goroot_from_toolchain() -> Option<PathBuf> {
    let output = Command::new("go").args(["env", "GOROOT"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let root = String::from_utf8(output.stdout).ok()?;
    let root = root.trim();
    if root.is_empty() || !Path::new(root).is_dir() {
        return None;
    }
    Some(PathBuf::from(root))
}

/// Map the Rust target OS onto its GOOS spelling.
pub fn host_goos() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Map the Rust target architecture onto its GOARCH spelling.
pub fn host_goarch() -> &'static str {
    match env::consts::ARCH {
        "x86" => "386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc" => "ppc",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if cfg!(target_endian = "little") => "mipsle",
        "mips64" if cfg!(target_endian = "little") => "mips64le",
        "wasm32" => "wasm",
        other => other,
    }
}
