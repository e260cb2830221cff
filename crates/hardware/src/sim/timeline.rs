//! Per-cycle timeline export.
//!
//! Writes one CSV row per simulated cycle:
//!
//! ```text
//! cycle,IF,ID,EX,MEM,WB
//! 1,ADD#0,-,-,-,-
//! 2,ADD#1,ADD#0,-,-,-
//! ```
//!
//! Each stage cell is `-` (empty), `stall` or `flush` (bubble), or
//! `<OPCODE>#<id>`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::common::error::{Result, SimError};
use crate::core::pipeline::CycleRecord;

/// CSV header line.
pub const TIMELINE_HEADER: &str = "cycle,IF,ID,EX,MEM,WB";

/// Streams [`CycleRecord`]s as CSV rows.
#[derive(Debug)]
pub struct TimelineWriter<W: Write> {
    out: W,
    rows: u64,
}

impl TimelineWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`, creating missing parent
    /// directories, and writes the header.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the directory or file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SimError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| SimError::io(path, e))?;
        Self::new(BufWriter::new(file)).map_err(|e| SimError::io(path, e))
    }
}

impl<W: Write> TimelineWriter<W> {
    /// Wraps `out` and writes the header.
    ///
    /// # Errors
    ///
    /// Propagates the I/O error from writing the header.
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{TIMELINE_HEADER}")?;
        Ok(Self { out, rows: 0 })
    }

    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error.
    pub fn write_record(&mut self, record: &CycleRecord) -> io::Result<()> {
        let [fetch, decode, execute, memory, writeback] = record.stages();
        writeln!(
            self.out,
            "{},{fetch},{decode},{execute},{memory},{writeback}",
            record.cycle
        )?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, excluding the header.
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Propagates the flush error.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
