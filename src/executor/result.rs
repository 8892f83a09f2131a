//! Execution result types
//!
//! This module defines what one top-level execution produced:
//! - RenderedResultSet: the outcome of each result set, in order
//! - ExecutionReport: all result sets plus the rows-affected count

use std::path::PathBuf;

use crate::formatter::RenderedGrid;

/// Outcome of one result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedResultSet {
    /// Rendered to the terminal
    Grid(RenderedGrid),

    /// Appended to a CSV file
    Exported { path: PathBuf, rows: u64 },

    /// The statement produced no result set
    NoResultSet,
}

/// Everything one top-level execution produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Result sets in the order the driver produced them
    pub result_sets: Vec<RenderedResultSet>,

    /// Rows affected by the whole execution, if the driver knows it
    pub rows_affected: Option<u64>,
}

impl ExecutionReport {
    /// Number of grids rendered to the terminal
    pub fn grid_count(&self) -> usize {
        self.result_sets
            .iter()
            .filter(|set| matches!(set, RenderedResultSet::Grid(_)))
            .count()
    }

    /// Line shown after the execution
    pub fn summary(&self) -> String {
        match self.rows_affected {
            Some(count) => format!("Rows affected: {count}"),
            None => format!("Rows affected: {}", crate::formatter::grid::UNKNOWN_COUNT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_known() {
        let report = ExecutionReport {
            result_sets: vec![RenderedResultSet::NoResultSet],
            rows_affected: Some(3),
        };
        assert_eq!(report.summary(), "Rows affected: 3");
        assert_eq!(report.grid_count(), 0);
    }

    #[test]
    fn test_summary_unknown() {
        assert_eq!(ExecutionReport::default().summary(), "Rows affected: (unknown)");
    }
}
