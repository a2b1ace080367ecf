//! Output configuration types

/// Minimum column width of aligned output.
pub const DEFAULT_MIN_WIDTH: usize = 80;

/// Layout of emitted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Columns padded to a common width, written once the walk is done
    #[default]
    Aligned,
    /// Fields separated by a single tab, written as they are produced
    Tsv,
    /// One JSON object per line, written as they are produced
    Json,
}

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Append the canonical import path as a fourth column
    pub canonical: bool,
    /// Aligned mode: columns are at least this wide
    pub min_width: usize,
    /// Aligned mode: spaces added after the widest cell of a column
    pub padding: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            canonical: false,
            min_width: DEFAULT_MIN_WIDTH,
            padding: 0,
        }
    }
}
