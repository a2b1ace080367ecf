//! Breadth-first import graph traversal
//!
//! Starting from one or more package directories, the walker resolves every
//! import reachable from them and hands one [`Record`] per distinct
//! (import path, importing directory) pair to a [`RecordSink`].

mod config;
mod record;
mod walker;

pub use config::WalkConfig;
pub use record::{ImportEdge, Record};
pub use walker::{CGO_PSEUDO_IMPORT, ImportWalker, Phase, RecordSink};
