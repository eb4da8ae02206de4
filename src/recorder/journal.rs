//! JSONL recorder.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::Recorder;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::stats::Stats;
use crate::types::Operation;

/// Appends one JSON line per recorded task to a file.
///
/// Each line carries the operation, a snapshot of the task's location, and
/// the statistics at that moment, so a run can be replayed or inspected
/// offline with standard JSONL tooling.
///
/// # Examples
///
/// ```no_run
/// use descent::{JournalRecorder, Settings};
///
/// let recorder = JournalRecorder::create("run.jsonl").unwrap();
/// let settings = Settings {
///     recorder: Some(Box::new(recorder)),
///     ..Settings::default()
/// };
/// ```
pub struct JournalRecorder {
    writer: BufWriter<File>,
}

#[derive(Serialize)]
struct Record<'a> {
    op: Operation,
    location: &'a Location,
    stats: &'a Stats,
}

impl JournalRecorder {
    /// Create (or truncate) the journal file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recorder`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::Recorder(e.to_string()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn append(&mut self, record: &Record<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl Recorder for JournalRecorder {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, location: &Location, op: Operation, stats: &Stats) -> Result<()> {
        self.append(&Record {
            op,
            location,
            stats,
        })
        .map_err(|e| Error::Recorder(e.to_string()))
    }
}
