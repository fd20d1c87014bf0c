//! Plain text renderer implementation.

use crate::model::ParseResult;
use unicode_width::UnicodeWidthStr;

/// Convert a parse result to an ASCII table.
///
/// Columns are padded by display width, so wide (CJK) text lines up.
pub fn to_text(result: &ParseResult) -> String {
    if result.headers.is_empty() {
        return "No data available".to_string();
    }

    let rows: Vec<Vec<String>> = result
        .text_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|t| t.replace(['\r', '\n'], " ")).collect())
        .collect();

    let mut widths: Vec<usize> = result.headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, text) in row.iter().enumerate() {
            widths[i] = widths[i].max(text.width());
        }
    }

    // Minimum width of 3 for readability
    for w in &mut widths {
        *w = (*w).max(3);
    }

    let mut output = String::new();
    push_border(&mut output, &widths, '-');
    push_row(&mut output, &widths, &result.headers);
    push_border(&mut output, &widths, '=');
    for row in &rows {
        push_row(&mut output, &widths, row);
    }
    if !rows.is_empty() {
        push_border(&mut output, &widths, '-');
    }

    if rows.is_empty() {
        output.push_str("No data available\n");
    }

    output
}

fn push_border(output: &mut String, widths: &[usize], fill: char) {
    output.push('+');
    for w in widths {
        output.extend(std::iter::repeat_n(fill, w + 2));
        output.push('+');
    }
    output.push('\n');
}

fn push_row(output: &mut String, widths: &[usize], cells: &[String]) {
    output.push('|');
    for (text, w) in cells.iter().zip(widths) {
        output.push(' ');
        output.push_str(text);
        output.extend(std::iter::repeat_n(' ', w - text.width()));
        output.push_str(" |");
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Record};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_text() {
        let mut first = Record::new();
        first.insert("Campaign", CellValue::String("東京".into()));
        first.insert("Clicks", CellValue::Number(5.0));
        let result = ParseResult::from_records("Sheet1", vec![first]);

        let expected = "\
+----------+--------+
| Campaign | Clicks |
+==========+========+
| 東京     | 5      |
+----------+--------+
";
        assert_eq!(to_text(&result), expected);
    }

    #[test]
    fn test_headers_without_rows() {
        let mut result = ParseResult::default();
        result.headers = vec!["A".to_string()];
        assert_eq!(to_text(&result), "+-----+\n| A   |\n+=====+\nNo data available\n");
        assert_eq!(to_text(&ParseResult::default()), "No data available");
    }
}
