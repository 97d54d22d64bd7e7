use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::WriteError;
use crate::types::{header_columns, row_width, Row};

/// `<prefix>-YYYYMMDD-HHMM.csv` for a run started at `started`.
pub fn output_filename(prefix: &str, started: NaiveDateTime) -> String {
    format!("{}-{}.csv", prefix, started.format("%Y%m%d-%H%M"))
}

/// Quotes a field only when it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

/// Appends rows to a CSV stream: an unlabeled index column, then
/// `pod,c0,cpu0,mem0,...`. The underlying writer is flushed on drop.
pub struct CsvSink<W: Write> {
    out: BufWriter<W>,
    width: usize,
    rows: usize,
}

impl CsvSink<File> {
    /// Creates `dir/<prefix>-YYYYMMDD-HHMM.csv` and writes the header.
    pub fn create(
        dir: &Path,
        prefix: &str,
        started: NaiveDateTime,
        containers: usize,
    ) -> Result<(Self, PathBuf), WriteError> {
        let path = dir.join(output_filename(prefix, started));
        let file = File::create(&path).map_err(|source| WriteError::Create {
            path: path.clone(),
            source,
        })?;
        let sink = CsvSink::new(file, containers)?;
        Ok((sink, path))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W, containers: usize) -> Result<Self, WriteError> {
        let mut out = BufWriter::new(writer);
        let header = header_columns(containers)
            .iter()
            .map(|c| escape_field(c).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, ",{}", header)?;
        Ok(Self {
            out,
            width: row_width(containers),
            rows: 0,
        })
    }

    /// Writes one row, padded with empty cells to the header width.
    pub fn append(&mut self, row: Row) -> Result<(), WriteError> {
        let row = row.padded(self.width);
        write!(self.out, "{}", self.rows)?;
        for cell in row.cells() {
            write!(self.out, ",{}", escape_field(cell))?;
        }
        writeln!(self.out)?;
        self.rows += 1;
        Ok(())
    }

    /// Pushes buffered rows to the underlying writer.
    pub fn checkpoint(&mut self) -> Result<(), WriteError> {
        self.out.flush()?;
        debug!("Checkpoint: {} rows flushed", self.rows);
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes and hands back the inner writer.
    pub fn finish(self) -> Result<W, WriteError> {
        self.out
            .into_inner()
            .map_err(|e| WriteError::Io(e.into_error()))
    }
}
