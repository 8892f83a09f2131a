//! CSV export of result sets
//!
//! Result sets are appended to the target file: a header row of the raw
//! column names, then the data rows written in batches straight from the
//! cursor. Progress is reported per batch through [`ExportProgress`].

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use super::progress::ExportProgress;
use crate::connection::{Column, Cursor, Value};
use crate::error::{ExecutionError, Result};

/// Exporter streaming result sets into a CSV file
pub struct CsvExporter {
    /// Rows fetched and written per batch
    batch_size: usize,
}

impl CsvExporter {
    /// Create a new exporter
    ///
    /// # Arguments
    /// * `batch_size` - Rows per batch; zero is treated as one
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Open `path` for appending, creating it if needed
    pub fn open_append(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ExecutionError::ExportFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Export the current result set of `cursor`.
    ///
    /// # Arguments
    /// * `cursor` - Cursor positioned on a produced result set
    /// * `columns` - Columns of that result set
    /// * `path` - Target file, appended to
    /// * `out` - Terminal output for progress markers
    ///
    /// # Returns
    /// * `Result<u64>` - Number of data rows written
    pub fn export(
        &self,
        cursor: &mut dyn Cursor,
        columns: &[Column],
        path: &Path,
        out: &mut dyn Write,
    ) -> Result<u64> {
        let file = Self::open_append(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(columns.iter().map(|column| column.name.as_str()))?;

        let progress = ExportProgress::start(self.batch_size, out)?;
        loop {
            let rows = cursor.fetch(Some(self.batch_size))?;
            if rows.is_empty() {
                break;
            }
            for row in &rows {
                writer.write_record(row.iter().map(Value::to_csv_field))?;
            }
            debug!("Wrote batch of {} rows to {}", rows.len(), path.display());
            progress.batch_written(rows.len(), out)?;
            if rows.len() < self.batch_size {
                break;
            }
        }
        writer.flush()?;
        progress.finish(out)?;

        let written = progress.rows();
        info!(
            "Exported {} rows to {} ({:.0} rows/sec)",
            written,
            path.display(),
            progress.rate()
        );
        Ok(written)
    }
}
