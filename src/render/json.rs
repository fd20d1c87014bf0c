//! JSON renderer implementation.

use crate::error::Result;
use crate::model::ParseResult;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a parse result to JSON.
///
/// Rows serialize as objects whose keys keep column order; date cells become
/// ISO 8601 strings.
pub fn to_json(result: &ParseResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(result)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(result)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Record};

    fn result() -> ParseResult {
        let mut row = Record::new();
        row.insert("Campaign", CellValue::String("Spring".into()));
        row.insert("Start", CellValue::DateTime(44197.0));
        row.insert("Active", CellValue::Bool(true));
        ParseResult::from_records("Sheet1", vec![row])
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&result(), JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"{"sheet_name":"Sheet1","headers":["Campaign","Start","Active"],"rows":[{"Campaign":"Spring","Start":"2021-01-01","Active":true}]}"#
        );
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&result(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"sheet_name\": \"Sheet1\""));
    }
}
