//! Configuration for import walking

/// Configuration for import walking behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkConfig {
    /// Emit records for GOROOT (standard library) packages. Their imports are
    /// followed either way.
    pub include_goroot: bool,
}
