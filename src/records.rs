//! Conversion of a sheet grid into header-keyed records.
//!
//! The first row of the used range is the header row. Each later row becomes
//! a [`Record`] holding only the cells present in that row, keyed by the
//! header of their column. Header names follow the usual spreadsheet-to-JSON
//! convention: an empty header cell is named `__EMPTY`, and a repeated name
//! gets a numeric suffix (`Name`, `Name_1`, `Name_2`, ...).
//!
//! Error cells are left out of records unless
//! [`ReadOptions::keep_error_cells`] is set. `#NULL!` is the exception: its
//! column stays in the record as [`CellValue::Null`], which does not make the
//! row non-blank.

use crate::model::{CellRange, CellValue, ParseResult, Record, Sheet, Workbook};
use crate::options::ReadOptions;
use std::collections::HashMap;

/// Name given to header cells that are missing.
pub const EMPTY_HEADER: &str = "__EMPTY";

const NULL_ERROR: &str = "#NULL!";

/// Build the column names for every column of the used range.
pub fn header_names(sheet: &Sheet, range: &CellRange) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(range.width() as usize);

    for col in range.first_col..=range.last_col {
        let base = sheet
            .get(range.first_row, col)
            .map(|v| v.to_string())
            .unwrap_or_else(|| EMPTY_HEADER.to_string());

        let name = match seen.get(&base).copied() {
            None => {
                seen.insert(base.clone(), 1);
                base
            }
            Some(mut counter) => {
                let mut candidate = format!("{}_{}", base, counter);
                counter += 1;
                while seen.contains_key(&candidate) {
                    candidate = format!("{}_{}", base, counter);
                    counter += 1;
                }
                seen.insert(base, counter);
                seen.insert(candidate.clone(), 1);
                candidate
            }
        };
        names.push(name);
    }

    names
}

/// Convert a sheet into one record per data row.
pub fn sheet_to_records(sheet: &Sheet, options: &ReadOptions) -> Vec<Record> {
    let Some(range) = sheet.range() else {
        return Vec::new();
    };

    let headers = header_names(sheet, &range);
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for row in range.first_row + 1..=range.last_row {
        let mut record = Record::new();
        let mut has_value = false;
        for (col, value) in sheet.row(row) {
            let Some(name) = col
                .checked_sub(range.first_col)
                .and_then(|i| headers.get(i as usize))
            else {
                continue;
            };
            if let CellValue::Error(code) = value {
                if !options.keep_error_cells {
                    if code == NULL_ERROR {
                        record.insert(name.clone(), CellValue::Null);
                    }
                    continue;
                }
            }
            has_value = true;
            record.insert(name.clone(), value.clone());
        }

        if !has_value && options.skip_blank_rows {
            skipped += 1;
            continue;
        }
        rows.push(record);
    }

    log::debug!(
        "sheet {:?}: range {}, {} records, {} blank rows skipped",
        sheet.name,
        range.to_a1(),
        rows.len(),
        skipped
    );
    rows
}

/// Convert a workbook's first sheet into the result shown by the viewer.
pub fn to_parse_result(workbook: &Workbook, options: &ReadOptions) -> ParseResult {
    let sheet = &workbook.first_sheet;
    ParseResult::from_records(sheet.name.clone(), sheet_to_records(sheet, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn sheet_from(rows: &[&[Option<CellValue>]]) -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(v) = cell {
                    sheet.set(r as u32, c as u32, v.clone());
                }
            }
        }
        sheet
    }

    #[test]
    fn test_campaign_records() {
        let sheet = sheet_from(&[
            &[Some(text("Campaign")), Some(text("Clicks")), Some(text("Cost"))],
            &[
                Some(text("Spring Sale")),
                Some(CellValue::Number(120.0)),
                Some(CellValue::Number(15.5)),
            ],
            &[Some(text("Brand")), Some(CellValue::Number(80.0)), None],
        ]);

        let rows = sheet_to_records(&sheet, &ReadOptions::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].keys().collect::<Vec<_>>(),
            vec!["Campaign", "Clicks", "Cost"]
        );
        assert_eq!(rows[0].text("Cost"), "15.5");
        assert_eq!(rows[1].keys().collect::<Vec<_>>(), vec!["Campaign", "Clicks"]);
        assert_eq!(rows[1].text("Cost"), "");
    }

    #[test]
    fn test_empty_and_duplicate_headers() {
        let sheet = sheet_from(&[
            &[
                Some(text("Name")),
                None,
                Some(text("Name")),
                Some(text("Name")),
                None,
                Some(text("Name_1")),
            ],
            &[
                Some(CellValue::Number(1.0)),
                Some(CellValue::Number(2.0)),
                Some(CellValue::Number(3.0)),
                Some(CellValue::Number(4.0)),
                Some(CellValue::Number(5.0)),
                Some(CellValue::Number(6.0)),
            ],
        ]);

        let range = sheet.range().unwrap();
        assert_eq!(
            header_names(&sheet, &range),
            vec!["Name", "__EMPTY", "Name_1", "Name_2", "__EMPTY_1", "Name_1_1"]
        );
    }

    #[test]
    fn test_range_starts_at_first_occupied_cell() {
        let mut sheet = Sheet::new("Offset");
        sheet.set(2, 1, text("Region"));
        sheet.set(2, 2, text("Spend"));
        sheet.set(3, 1, text("North"));
        sheet.set(3, 2, CellValue::Number(10.0));

        let rows = sheet_to_records(&sheet, &ReadOptions::default());
        let result = ParseResult::from_records("Offset", rows);
        assert_eq!(result.headers, vec!["Region", "Spend"]);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].text("Region"), "North");
    }

    #[test]
    fn test_blank_rows() {
        let sheet = sheet_from(&[
            &[Some(text("A"))],
            &[Some(CellValue::Number(1.0))],
            &[None],
            &[Some(CellValue::Number(3.0))],
        ]);

        let skipped = sheet_to_records(&sheet, &ReadOptions::default());
        assert_eq!(skipped.len(), 2);

        let kept = sheet_to_records(&sheet, &ReadOptions::default().with_skip_blank_rows(false));
        assert_eq!(kept.len(), 3);
        assert!(kept[1].is_empty());
    }

    #[test]
    fn test_empty_string_cell_is_present() {
        let sheet = sheet_from(&[&[Some(text("A"))], &[Some(text(""))]]);
        let rows = sheet_to_records(&sheet, &ReadOptions::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("A"), Some(&text("")));
    }

    #[test]
    fn test_headers_only_and_empty_sheets() {
        let headers_only = sheet_from(&[&[Some(text("Campaign")), Some(text("Clicks"))]]);
        assert!(sheet_to_records(&headers_only, &ReadOptions::default()).is_empty());
        assert!(sheet_to_records(&Sheet::new("Empty"), &ReadOptions::default()).is_empty());
    }

    #[test]
    fn test_error_cells_are_left_out() {
        let sheet = sheet_from(&[
            &[Some(text("Campaign")), Some(text("Ratio")), Some(text("Note"))],
            &[
                Some(text("Spring")),
                Some(CellValue::Error("#DIV/0!".into())),
                Some(CellValue::Error("#NULL!".into())),
            ],
            &[None, Some(CellValue::Error("#N/A".into())), None],
            &[Some(text("Brand")), Some(CellValue::Number(0.5)), None],
        ]);

        let result = ParseResult::from_records("S", sheet_to_records(&sheet, &ReadOptions::default()));
        assert_eq!(result.headers, vec!["Campaign", "Note"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].get("Note"), Some(&CellValue::Null));
        assert_eq!(result.text_rows(), vec![vec!["Spring", ""], vec!["Brand", ""]]);

        let kept = ParseResult::from_records(
            "S",
            sheet_to_records(&sheet, &ReadOptions::default().with_error_cells(true)),
        );
        assert_eq!(kept.headers, vec!["Campaign", "Ratio", "Note"]);
        assert_eq!(kept.rows.len(), 3);
        assert_eq!(kept.rows[0].text("Ratio"), "#DIV/0!");
    }

    #[test]
    fn test_null_error_alone_is_a_blank_row() {
        let sheet = sheet_from(&[
            &[Some(text("A"))],
            &[Some(CellValue::Error("#NULL!".into()))],
            &[Some(CellValue::Number(2.0))],
        ]);
        let rows = sheet_to_records(&sheet, &ReadOptions::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("A"), "2");
    }

    #[test]
    fn test_first_record_defines_headers() {
        let sheet = sheet_from(&[
            &[Some(text("Campaign")), Some(text("Clicks"))],
            &[None, Some(CellValue::Number(5.0))],
            &[Some(text("Brand")), Some(CellValue::Number(8.0))],
        ]);

        let rows = sheet_to_records(&sheet, &ReadOptions::default());
        let result = ParseResult::from_records("S", rows);
        assert_eq!(result.headers, vec!["Clicks"]);
        assert_eq!(result.rows.len(), 2);
    }
}
