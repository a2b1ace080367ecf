//! Tab-separated output, one row per record as soon as it is produced

use std::io::{self, Write};

use crate::walk::{Record, RecordSink};

use super::config::OutputConfig;
use super::record_fields;

pub struct TsvFormatter<W: Write> {
    config: OutputConfig,
    out: W,
}

impl<W: Write> TsvFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self { config, out }
    }
}

impl<W: Write> RecordSink for TsvFormatter<W> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        let fields = record_fields(record, self.config.canonical);
        writeln!(self.out, "{}", fields.join("\t"))
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
