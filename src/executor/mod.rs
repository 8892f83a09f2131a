//! Query execution engine for querysh
//!
//! This module runs literal query text against the live connection:
//! - counts and collects positional parameters ([`params`])
//! - walks every result set the execution produced
//! - renders each result set as a grid, or appends it to the armed CSV file
//!   ([`export`])
//! - reports the rows-affected count once per execution ([`result`])

use tracing::debug;

use crate::connection::{ConnectionManager, ResultSetStep};
use crate::error::Result;
use crate::formatter::render;
use crate::repl::session_config::SessionConfig;
use crate::repl::terminal::Terminal;

pub mod export;
pub mod params;
pub mod progress;
pub mod result;

pub use export::CsvExporter;
pub use params::{PARAMETER_MARKERS, count_parameters, prompt_parameters};
pub use progress::ExportProgress;
pub use result::{ExecutionReport, RenderedResultSet};

/// Executor for literal query text
pub struct QueryExecutor<'a> {
    /// Owner of the live connection
    connections: &'a mut ConnectionManager,

    /// Session settings
    config: &'a mut SessionConfig,
}

impl<'a> QueryExecutor<'a> {
    /// Create a new query executor
    ///
    /// # Arguments
    /// * `connections` - Connection manager of the session
    /// * `config` - Session settings
    pub fn new(connections: &'a mut ConnectionManager, config: &'a mut SessionConfig) -> Self {
        Self {
            connections,
            config,
        }
    }

    /// Execute query text and render every result set it produces.
    ///
    /// Parameters are prompted for before anything runs. An armed CSV export
    /// path is consumed by this call: every result set of the query is
    /// appended to it, and later queries print to the terminal again.
    ///
    /// # Arguments
    /// * `text` - Literal query text
    /// * `terminal` - Terminal for parameter prompts and output
    ///
    /// # Returns
    /// * `Result<ExecutionReport>` - What was rendered, plus rows affected
    pub fn execute(&mut self, text: &str, terminal: &mut dyn Terminal) -> Result<ExecutionReport> {
        let params = prompt_parameters(count_parameters(text), terminal)?;
        let export_path = self.config.csv_export_path.take();
        debug!("Executing query with {} parameters", params.len());

        let connection = self.connections.get()?;
        let mut cursor = connection.execute(text, &params)?;
        let mut report = ExecutionReport::default();

        loop {
            let rendered = match cursor.next_result_set()? {
                ResultSetStep::Produced(columns) => match &export_path {
                    Some(path) => {
                        let rows = CsvExporter::new(self.config.csv_batch_size).export(
                            cursor.as_mut(),
                            &columns,
                            path,
                            terminal.output(),
                        )?;
                        RenderedResultSet::Exported {
                            path: path.clone(),
                            rows,
                        }
                    }
                    None => {
                        let rows = cursor.fetch(self.config.fetch_limit())?;
                        let grid = render(&columns, &rows, cursor.row_count_hint(), self.config);
                        grid.write_to(terminal.output())?;
                        RenderedResultSet::Grid(grid)
                    }
                },
                ResultSetStep::EmptyNoResultSet => {
                    debug!("Statement produced no result set");
                    RenderedResultSet::NoResultSet
                }
                ResultSetStep::NoMoreSets => break,
            };
            report.result_sets.push(rendered);
        }

        report.rows_affected = cursor.rows_affected();
        debug!("Execution produced {} result sets", report.result_sets.len());
        Ok(report)
    }
}
