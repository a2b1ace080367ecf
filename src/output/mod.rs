//! Record formatting
//!
//! - `aligned` - padded columns, buffered until the walk completes
//! - `tsv` - tab-separated rows, streamed
//! - `json` - JSON Lines, streamed

mod aligned;
mod config;
mod json;
mod tsv;

use std::io::Write;

pub use aligned::AlignedFormatter;
pub use config::{DEFAULT_MIN_WIDTH, OutputConfig, OutputFormat};
pub use json::JsonFormatter;
pub use tsv::TsvFormatter;

use crate::walk::{Record, RecordSink};

/// Build the sink for `config.format` around `out`.
pub fn build_sink<'a, W: Write + 'a>(config: OutputConfig, out: W) -> Box<dyn RecordSink + 'a> {
    match config.format {
        OutputFormat::Aligned => Box::new(AlignedFormatter::new(config, out)),
        OutputFormat::Tsv => Box::new(TsvFormatter::new(config, out)),
        OutputFormat::Json => Box::new(JsonFormatter::new(out)),
    }
}

/// Text columns of a record: importer, import path, directory and, when
/// requested, the canonical import path.
pub(crate) fn record_fields(record: &Record, canonical: bool) -> Vec<String> {
    let mut fields = vec![
        record.from_dir.display().to_string(),
        record.import_path.clone(),
        record.dir.display().to_string(),
    ];
    if canonical {
        fields.push(record.canonical_import_path.clone());
    }
    fields
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn sample() -> Record {
        Record {
            from_dir: PathBuf::from("/work/a"),
            import_path: "b".to_string(),
            dir: PathBuf::from("/src/b"),
            src_root: None,
            canonical_import_path: "b".to_string(),
            goroot: false,
        }
    }

    #[test]
    fn test_record_fields() {
        assert_eq!(record_fields(&sample(), false), vec!["/work/a", "b", "/src/b"]);
        assert_eq!(
            record_fields(&sample(), true),
            vec!["/work/a", "b", "/src/b", "b"]
        );
    }

    #[test]
    fn test_build_sink_by_format() {
        for (format, expected) in [
            (OutputFormat::Tsv, "/work/a\tb\t/src/b\n"),
            (OutputFormat::Json, "{\"from_dir\":\"/work/a\""),
        ] {
            let mut buf = Vec::new();
            {
                let config = OutputConfig {
                    format,
                    ..Default::default()
                };
                let mut sink = build_sink(config, &mut buf);
                sink.write_record(&sample()).unwrap();
                sink.finish().unwrap();
            }
            let out = String::from_utf8(buf).unwrap();
            assert!(out.starts_with(expected), "{:?}: {}", format, out);
        }
    }
}
