//! ImportWalker - resolves imports breadth-first and streams records

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::WalkError;
use crate::path_utils::absolute;
use crate::resolver::Resolver;

use super::config::WalkConfig;
use super::record::{ImportEdge, Record};

/// The cgo pseudo-package. It has no directory and is never resolved.
pub const CGO_PSEUDO_IMPORT: &str = "C";

/// Receives records as the walk produces them.
pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> io::Result<()>;

    /// Called once after the walk completed successfully.
    fn finish(&mut self) -> io::Result<()>;
}

/// Where a walker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting starting directories
    Seeding,
    /// Resolving queued imports
    Draining,
    /// Frontier exhausted
    Done,
}

/// Breadth-first walker over the import graph.
///
/// Edges are resolved in FIFO order, so direct imports of the seed
/// directories come out before their transitive imports. Any resolution
/// failure aborts the walk.
pub struct ImportWalker<R> {
    resolver: R,
    config: WalkConfig,
    visited: HashSet<ImportEdge>,
    frontier: VecDeque<ImportEdge>,
    phase: Phase,
}

impl<R: Resolver> ImportWalker<R> {
    pub fn new(resolver: R, config: WalkConfig) -> Self {
        Self {
            resolver,
            config,
            visited: HashSet::new(),
            frontier: VecDeque::new(),
            phase: Phase::Seeding,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of edges still waiting to be resolved.
    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    /// Queue the imports of the package in `dir`.
    pub fn seed(&mut self, dir: &Path) -> Result<(), WalkError> {
        self.phase = Phase::Seeding;

        let abs = absolute(dir).map_err(|source| WalkError::AbsolutePath {
            dir: dir.to_path_buf(),
            source,
        })?;

        let package = self
            .resolver
            .resolve_dir(&abs)
            .map_err(|source| WalkError::Directory {
                dir: dir.to_path_buf(),
                source,
            })?;

        debug!(dir = %abs.display(), imports = package.imports.len(), "seeded");
        self.frontier.extend(
            package
                .imports
                .into_iter()
                .map(|import| ImportEdge::new(import, abs.clone())),
        );
        Ok(())
    }

    /// Resolve queued edges until none are left, writing a record for each
    /// one that is not filtered out. Returns the number of records written.
    pub fn drain<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize, WalkError> {
        self.phase = Phase::Draining;
        debug!(pending = self.frontier.len(), "draining");

        let mut written = 0;
        while let Some(edge) = self.frontier.pop_front() {
            if edge.import_path == CGO_PSEUDO_IMPORT || self.visited.contains(&edge) {
                continue;
            }
            self.visited.insert(edge.clone());

            let package = self
                .resolver
                .resolve_import(&edge.import_path, &edge.from_dir)
                .map_err(|source| WalkError::Import {
                    path: edge.import_path.clone(),
                    from: edge.from_dir.clone(),
                    source,
                })?;

            if package.goroot && !self.config.include_goroot {
                trace!(import_path = %edge.import_path, "GOROOT package suppressed");
            } else {
                sink.write_record(&Record::new(&edge, &package))?;
                written += 1;
            }

            // Suppressed packages are still followed.
            let from_dir = &package.dir;
            self.frontier.extend(
                package
                    .imports
                    .iter()
                    .map(|import| ImportEdge::new(import.as_str(), from_dir.as_path())),
            );
        }

        self.phase = Phase::Done;
        debug!(written, visited = self.visited.len(), "frontier exhausted");
        Ok(written)
    }

    /// Seed every directory, drain the frontier, then finish the sink.
    /// The sink is not finished when the walk fails.
    pub fn run<P, S>(&mut self, dirs: &[P], sink: &mut S) -> Result<usize, WalkError>
    where
        P: AsRef<Path>,
        S: RecordSink + ?Sized,
    {
        for dir in dirs {
            self.seed(dir.as_ref())?;
        }
        let written = self.drain(sink)?;
        sink.finish()?;
        Ok(written)
    }
}
