//! Output of admitted coordinates

use crate::types::Coordinate;
use crate::{ExportError, Result};
use csv::{Terminator, Writer, WriterBuilder};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Destination for admitted coordinates
pub trait CoordinateSink {
    fn write(&mut self, coordinate: &Coordinate) -> Result<()>;

    /// Push buffered rows to the underlying writer
    fn flush(&mut self) -> Result<()>;

    /// Final flush once the export is complete
    fn finish(&mut self) -> Result<()> {
        self.flush()
    }
}

/// Comma-separated output with a header row, one line per coordinate
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    rows: u64,
}

impl CsvSink<File> {
    /// Create (or truncate) the file at `path` and write the header row
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap `inner` and write the header row
    pub fn new(inner: W) -> Result<Self> {
        let terminator = if cfg!(windows) {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };
        let mut writer = WriterBuilder::new()
            .terminator(terminator)
            .from_writer(inner);
        writer.write_record(Coordinate::csv_headers())?;
        Ok(Self { writer, rows: 0 })
    }

    /// Data rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::Io(io::Error::new(e.error().kind(), e.error().to_string())))
    }
}

impl<W: Write> CoordinateSink for CsvSink<W> {
    fn write(&mut self, coordinate: &Coordinate) -> Result<()> {
        self.writer.write_record(coordinate.csv_values())?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
