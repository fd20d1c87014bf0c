//! XLSX (Excel) workbook reader.
//!
//! Reads workbooks in the Office Open XML (.xlsx) format: sheet listing,
//! shared strings, number-format styles for date detection, and the cells of
//! a worksheet.
//!
//! # Example
//!
//! ```no_run
//! use sheetview::xlsx::XlsxParser;
//! use sheetview::ReadOptions;
//!
//! let mut parser = XlsxParser::open("campaigns.xlsx", ReadOptions::default())?;
//! let workbook = parser.parse()?;
//!
//! println!("First sheet: {}", workbook.first_sheet.name);
//! # Ok::<(), sheetview::Error>(())
//! ```

mod parser;
mod shared_strings;
mod styles;

pub use parser::XlsxParser;
