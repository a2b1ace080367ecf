//! deplist - list the transitive imports of Go packages and where they live on disk

pub mod config;
pub mod error;
pub mod output;
pub mod path_utils;
pub mod resolver;
pub mod walk;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::BuildContext;
pub use error::{ResolveError, WalkError};
pub use output::{
    AlignedFormatter, JsonFormatter, OutputConfig, OutputFormat, TsvFormatter, build_sink,
};
pub use resolver::{GoResolver, Package, Resolver};
pub use walk::{ImportEdge, ImportWalker, Phase, Record, RecordSink, WalkConfig};
