//! Row records and the parse result handed to the viewer.

use super::CellValue;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One data row: an ordered mapping from column name to cell value.
///
/// Only cells present in the source row are stored, so two records from the
/// same sheet can carry different key sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Get a field value by column name.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get the display text of a field; a missing field renders as "".
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(|v| v.to_string()).unwrap_or_default()
    }

    /// Column names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over (column name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Tabular data extracted from the first sheet of a workbook.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    /// Name of the sheet the rows came from
    pub sheet_name: String,

    /// Column names, taken from the keys of the first record
    pub headers: Vec<String>,

    /// Data rows in sheet order
    pub rows: Vec<Record>,
}

impl ParseResult {
    /// Build a result, deriving headers from the first record's keys.
    pub fn from_records(sheet_name: impl Into<String>, rows: Vec<Record>) -> Self {
        let headers = rows
            .first()
            .map(|r| r.keys().map(String::from).collect())
            .unwrap_or_default();
        Self {
            sheet_name: sheet_name.into(),
            headers,
            rows,
        }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check whether there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The display text of every row, one entry per header.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| self.headers.iter().map(|h| row.text(h)).collect())
            .collect()
    }
}
