//! Output formatting for querysh
//!
//! This module turns fetched result sets into terminal output:
//! - [`value`] formats single cells by value kind
//! - [`grid`] lays a window of rows out as an aligned grid

pub mod grid;
pub mod value;

pub use grid::{RenderedGrid, RowTotal, reconcile_row_count, render};
pub use value::{FormattedCell, TRUNCATION_MARKER, decimal_len, format_text, format_value, int_len};
