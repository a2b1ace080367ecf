//! Aligned column output
//!
//! Rows are held until `finish`, then every column but the last is padded
//! to the width of its widest cell (never less than `min_width`).

use std::io::{self, Write};

use crate::walk::{Record, RecordSink};

use super::config::OutputConfig;
use super::record_fields;

pub struct AlignedFormatter<W: Write> {
    config: OutputConfig,
    out: W,
    rows: Vec<Vec<String>>,
}

impl<W: Write> AlignedFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self {
            config,
            out,
            rows: Vec::new(),
        }
    }

    /// Width of each padded column.
    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            // The trailing cell is not part of a column.
            let padded = row.len().saturating_sub(1);
            for (i, cell) in row.iter().take(padded).enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
            .into_iter()
            .map(|w| (w + self.config.padding).max(self.config.min_width))
            .collect()
    }
}

impl<W: Write> RecordSink for AlignedFormatter<W> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.rows.push(record_fields(record, self.config.canonical));
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        let widths = self.column_widths();
        for row in &self.rows {
            let last = row.len().saturating_sub(1);
            for (i, cell) in row.iter().enumerate() {
                if i < last {
                    let fill = widths[i].saturating_sub(cell.chars().count());
                    write!(self.out, "{}{:fill$}", cell, "", fill = fill)?;
                } else {
                    write!(self.out, "{}", cell)?;
                }
            }
            writeln!(self.out)?;
        }
        self.rows.clear();
        self.out.flush()
    }
}
