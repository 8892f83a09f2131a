//! Progress tracking for CSV exports
//!
//! The session output gets one marker per exported batch. Row count and
//! throughput are kept by an [`indicatif::ProgressBar`] that is never drawn,
//! since the markers already occupy the output line.

use std::io::Write;

use indicatif::ProgressBar;

use crate::error::Result;

/// Printed once per exported batch
pub const BATCH_MARKER: &str = "!";

/// Progress of one result set being exported
pub struct ExportProgress {
    /// Rows written so far, with timing
    bar: ProgressBar,
}

impl ExportProgress {
    /// Start tracking and print the marker legend
    ///
    /// # Arguments
    /// * `batch_size` - Rows per batch, shown in the legend
    /// * `out` - Session output
    pub fn start(batch_size: usize, out: &mut dyn Write) -> Result<Self> {
        writeln!(out, "Writing to file, one {BATCH_MARKER} per {batch_size} rows:")?;
        Ok(Self {
            bar: ProgressBar::hidden(),
        })
    }

    /// Record a written batch and print its marker
    pub fn batch_written(&self, rows: usize, out: &mut dyn Write) -> Result<()> {
        self.bar.inc(rows as u64);
        write!(out, "{BATCH_MARKER}")?;
        out.flush()?;
        Ok(())
    }

    /// Rows recorded so far
    pub fn rows(&self) -> u64 {
        self.bar.position()
    }

    /// Rows per second since the export started
    pub fn rate(&self) -> f64 {
        self.bar.per_sec()
    }

    /// End the marker line
    pub fn finish(&self, out: &mut dyn Write) -> Result<()> {
        self.bar.finish_and_clear();
        writeln!(out)?;
        Ok(())
    }
}
