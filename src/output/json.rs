//! JSON Lines output

use std::io::{self, Write};

use crate::walk::{Record, RecordSink};

/// Writes each record as a single-line JSON object.
pub struct JsonFormatter<W: Write> {
    out: W,
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordSink for JsonFormatter<W> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record).map_err(io::Error::other)?;
        writeln!(self.out)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_json_lines() {
        let mut buf = Vec::new();
        let mut fmt = JsonFormatter::new(&mut buf);
        for name in ["fmt", "os"] {
            fmt.write_record(&Record {
                from_dir: PathBuf::from("/work/a"),
                import_path: name.to_string(),
                dir: PathBuf::from(format!("/goroot/src/{}", name)),
                src_root: None,
                canonical_import_path: name.to_string(),
                goroot: true,
            })
            .unwrap();
        }
        fmt.finish().unwrap();

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["import_path"], "os");
        assert_eq!(value["dir"], "/goroot/src/os");
        assert_eq!(value["goroot"], true);
        assert!(value.get("src_root").is_none());
    }
}
