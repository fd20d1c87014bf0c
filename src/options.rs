//! Workbook reading options.

use crate::model::DateRendering;

/// Options controlling how the first sheet is turned into records.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// How date-formatted numbers are exposed
    pub dates: DateRendering,

    /// Drop data rows in which every cell is empty
    pub skip_blank_rows: bool,

    /// Keep error cells (`#DIV/0!`, ...) in records instead of leaving them out
    pub keep_error_cells: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            dates: DateRendering::Serial,
            skip_blank_rows: true,
            keep_error_cells: false,
        }
    }
}

impl ReadOptions {
    /// Create new read options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date rendering mode.
    pub fn with_dates(mut self, dates: DateRendering) -> Self {
        self.dates = dates;
        self
    }

    /// Keep or drop entirely blank data rows.
    pub fn with_skip_blank_rows(mut self, skip: bool) -> Self {
        self.skip_blank_rows = skip;
        self
    }

    /// Keep or leave out error cells.
    pub fn with_error_cells(mut self, keep: bool) -> Self {
        self.keep_error_cells = keep;
        self
    }
}
