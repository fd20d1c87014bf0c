//! Worksheet grid model.

use super::CellValue;
use std::collections::BTreeMap;

/// Number of rows in a worksheet.
pub const MAX_ROWS: u32 = 1_048_576;

/// Number of columns in a worksheet.
pub const MAX_COLS: u32 = 16_384;

/// Inclusive bounds of the occupied cells of a sheet (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl CellRange {
    /// Number of rows covered by the range.
    pub fn height(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    /// Number of columns covered by the range.
    pub fn width(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    /// A1-style reference such as `A1:C3`.
    pub fn to_a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            column_name(self.first_col),
            self.first_row + 1,
            column_name(self.last_col),
            self.last_row + 1
        )
    }
}

/// A single worksheet: a sparse grid of non-empty cells.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// Sheet name as listed in the workbook
    pub name: String,

    /// Cells keyed by (row, column)
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Set a cell value, replacing any previous value.
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        self.cells.insert((row, col), value);
    }

    /// Get a cell value.
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Iterate over the cells of one row as (column, value), left to right.
    pub fn row(&self, row: u32) -> impl Iterator<Item = (u32, &CellValue)> {
        self.cells
            .range((row, 0)..=(row, u32::MAX))
            .map(|((_, col), value)| (*col, value))
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check whether the sheet has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Compute the used range from the occupied cells.
    pub fn range(&self) -> Option<CellRange> {
        let first_row = self.cells.keys().next()?.0;
        let last_row = self.cells.keys().next_back()?.0;
        let first_col = self.cells.keys().map(|(_, c)| *c).min()?;
        let last_col = self.cells.keys().map(|(_, c)| *c).max()?;
        Some(CellRange {
            first_row,
            last_row,
            first_col,
            last_col,
        })
    }
}

/// Convert a 0-based column index to its letter name (0 → `A`, 26 → `AA`).
pub fn column_name(col: u32) -> String {
    let mut n = col + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        name.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Parse an A1-style cell reference into 0-based (row, column).
///
/// Absolute markers (`$B$3`) are accepted. Returns `None` for malformed
/// references and for cells beyond `XFD1048576`.
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.trim();
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut seen_letter = false;
    let mut seen_digit = false;

    for c in reference.chars() {
        match c {
            '$' => {}
            'A'..='Z' | 'a'..='z' if !seen_digit => {
                seen_letter = true;
                let v = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
                col = col.checked_mul(26)?.checked_add(v)?;
            }
            '0'..='9' if seen_letter => {
                seen_digit = true;
                row = row.checked_mul(10)?.checked_add(c as u32 - '0' as u32)?;
            }
            _ => return None,
        }
    }

    if !seen_letter || !seen_digit || row == 0 || row > MAX_ROWS || col > MAX_COLS {
        return None;
    }
    Some((row - 1, col - 1))
}
