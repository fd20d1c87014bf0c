//! Error types for the sheetview library.

use std::io;
use thiserror::Error;

/// Result type alias for sheetview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or rendering a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading the uploaded file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a recognizable workbook.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Malformed BIFF record stream in a legacy workbook.
    #[error("BIFF parse error: {0}")]
    Biff(String),

    /// Invalid or malformed data in the workbook.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required workbook part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The workbook is password protected.
    #[error("Workbook is encrypted")]
    Encrypted,

    /// A viewer operation was issued in a state that does not allow it.
    #[error("Invalid viewer state: {0}")]
    InvalidState(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(format!("JSON serialization error: {}", err))
    }
}
