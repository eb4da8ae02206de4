//! Observers invoked as the run progresses.
//!
//! A [`Recorder`] sees the initial snapshot (`InitIteration`), every task
//! accepted by the stats monitor while the run is live, and a final snapshot
//! (`PostIteration`). Any error it returns stops the run and surfaces as the
//! run's error.
//!
//! Two implementations ship with the crate:
//!
//! | Recorder | Description | Feature flag |
//! |----------|-------------|--------------|
//! | [`Printer`] | Column output of major iterations to any writer | — |
//! | `JournalRecorder` | One JSON line per recorded task | `journal` |

use std::io::Write;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::location::Location;
use crate::stats::Stats;
use crate::types::Operation;

#[cfg(feature = "journal")]
mod journal;

#[cfg(feature = "journal")]
pub use journal::JournalRecorder;

/// Observer of an optimization run.
pub trait Recorder {
    /// Called once before the run starts.
    fn init(&mut self) -> Result<()>;

    /// Called with each recorded snapshot: the task's location, its
    /// operation, and the statistics at that moment.
    fn record(&mut self, location: &Location, op: Operation, stats: &Stats) -> Result<()>;
}

/// Prints major iterations as aligned columns.
///
/// A heading row is repeated every 30 printed rows. Only `InitIteration`,
/// `MajorIteration`, and `PostIteration` snapshots produce output; evaluation
/// traffic is skipped.
///
/// # Examples
///
/// ```
/// use descent::{Printer, Settings};
///
/// let settings = Settings {
///     recorder: Some(Box::new(Printer::new(std::io::stderr()))),
///     ..Settings::default()
/// };
/// ```
pub struct Printer<W> {
    writer: W,
    rows_since_heading: usize,
}

const HEADING_INTERVAL: usize = 30;

impl<W: Write + Send> Printer<W> {
    /// Create a printer writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows_since_heading: 0,
        }
    }

    fn heading(&mut self) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{:>10}  {:>8}  {:>10}  {:>22}  {:>14}",
            "runtime", "iter", "func evals", "f", "|grad|"
        )
    }
}

impl<W: Write + Send> Recorder for Printer<W> {
    fn init(&mut self) -> Result<()> {
        self.rows_since_heading = 0;
        Ok(())
    }

    fn record(&mut self, location: &Location, op: Operation, stats: &Stats) -> Result<()> {
        if !matches!(
            op,
            Operation::InitIteration | Operation::MajorIteration | Operation::PostIteration
        ) {
            return Ok(());
        }
        let result = (|| {
            if self.rows_since_heading == 0 {
                self.heading()?;
            }
            self.rows_since_heading = (self.rows_since_heading + 1) % HEADING_INTERVAL;
            let grad = match location.gradient_inf_norm() {
                Some(norm) => format!("{norm:>14.6e}"),
                None => format!("{:>14}", "-"),
            };
            writeln!(
                self.writer,
                "{:>10}  {:>8}  {:>10}  {:>22.15e}  {}",
                format_runtime(stats.runtime),
                stats.major_iterations,
                stats.func_evaluations,
                location.f,
                grad
            )
        })();
        result.map_err(|e| Error::Recorder(e.to_string()))
    }
}

fn format_runtime(runtime: Duration) -> String {
    let secs = runtime.as_secs_f64();
    if secs < 1.0 {
        format!("{:.1}ms", secs * 1e3)
    } else {
        format!("{secs:.2}s")
    }
}
