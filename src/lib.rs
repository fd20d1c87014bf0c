//! # sheetview
//!
//! Spreadsheet upload viewer: read an Excel workbook, take its first sheet,
//! turn the rows into header-keyed records and render them as a table.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sheetview::{parse_file, ReadOptions};
//!
//! let result = parse_file("campaigns.xlsx", &ReadOptions::default())?;
//! println!("Columns: {}", result.headers.join(", "));
//! println!("Rows: {}", result.row_count());
//! # Ok::<(), sheetview::Error>(())
//! ```
//!
//! ## Viewer
//!
//! The [`Viewer`] drives the upload flow (idle, loading, loaded) and collects
//! the toasts shown to the user:
//!
//! ```no_run
//! use sheetview::render::{to_html, RenderOptions};
//! use sheetview::Viewer;
//!
//! let mut viewer = Viewer::new();
//! viewer.upload_path("campaigns.xlsx")?;
//!
//! for toast in viewer.toasts() {
//!     println!("{}: {}", toast.title, toast.description);
//! }
//! let page = to_html(&viewer, &RenderOptions::default());
//! # Ok::<(), sheetview::Error>(())
//! ```
//!
//! ## Features
//!
//! - `xlsx` (default): Office Open XML workbooks
//! - `xls` (default): Excel 97-2003 (BIFF8) workbooks
//! - `async`: read uploads with Tokio

pub mod container;
pub mod detect;
pub mod error;
pub mod model;
pub mod options;
pub mod records;
pub mod render;
pub mod viewer;

#[cfg(feature = "xlsx")]
pub mod xlsx;

#[cfg(feature = "xls")]
pub mod xls;

// Re-exports
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::{CellValue, DateRendering, Metadata, ParseResult, Record, Sheet, Workbook};
pub use options::ReadOptions;
pub use viewer::{Toast, ToastVariant, ViewState, Viewer};

use std::path::Path;

/// Read a workbook file: metadata, sheet names and the first sheet.
///
/// The format is detected from the content, not the extension.
pub fn read_workbook(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Workbook> {
    let data = std::fs::read(path.as_ref())?;
    read_workbook_bytes(data, options)
}

/// Read a workbook from its bytes.
pub fn read_workbook_bytes(data: Vec<u8>, options: &ReadOptions) -> Result<Workbook> {
    let format = detect_format_from_bytes(&data)?;
    log::debug!("reading {} ({} bytes)", format.name(), data.len());

    match format {
        #[cfg(feature = "xlsx")]
        FormatType::Xlsx => xlsx::XlsxParser::from_bytes(data, options.clone())?.parse(),
        #[cfg(feature = "xls")]
        FormatType::Xls => xls::XlsParser::from_bytes(data, options.clone())?.parse(),
        #[cfg(not(all(feature = "xlsx", feature = "xls")))]
        _ => Err(Error::UnsupportedFormat(format!("{:?}", format))),
    }
}

/// Parse a workbook file into the rows of its first sheet.
///
/// # Example
///
/// ```no_run
/// use sheetview::{parse_file, ReadOptions};
///
/// let result = parse_file("campaigns.xls", &ReadOptions::default())?;
/// for row in &result.rows {
///     println!("{}", row.text("Campaign"));
/// }
/// # Ok::<(), sheetview::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>, options: &ReadOptions) -> Result<ParseResult> {
    let workbook = read_workbook(path, options)?;
    Ok(records::to_parse_result(&workbook, options))
}

/// Parse workbook bytes into the rows of the first sheet.
pub fn parse_bytes(data: Vec<u8>, options: &ReadOptions) -> Result<ParseResult> {
    let workbook = read_workbook_bytes(data, options)?;
    Ok(records::to_parse_result(&workbook, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes_rejects_plain_text() {
        let result = parse_bytes(b"Campaign,Clicks,Cost\n".to_vec(), &ReadOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_read_workbook_missing_file() {
        let result = read_workbook("does-not-exist.xlsx", &ReadOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
