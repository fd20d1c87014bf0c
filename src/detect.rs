//! Workbook format detection.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Compound File Binary (OLE2) magic bytes.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for the XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Content type for the macro-enabled (XLSM) workbook part.
const XLSM_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

/// Content types of other OOXML documents, reported as unsupported.
const OTHER_OOXML_TYPES: &[(&str, &str)] = &[
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        "Word Document",
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        "PowerPoint Presentation",
    ),
];

/// File extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".xlsx", ".xls"];

/// Detected workbook format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FormatType {
    /// Office Open XML workbook (.xlsx)
    Xlsx,
    /// Legacy BIFF8 workbook (.xls)
    Xls,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "xlsx",
            FormatType::Xls => "xls",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Xls => "Excel 97-2003 Workbook",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The `accept` attribute value for the upload input (`.xlsx,.xls`).
pub fn accept_attribute() -> String {
    ACCEPTED_EXTENSIONS.join(",")
}

/// Check whether a file name carries one of the accepted extensions.
///
/// The picker filter is advisory; detection still decides by content.
pub fn has_accepted_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = format!(".{}", ext.to_ascii_lowercase());
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Detect the format type from a file path.
///
/// # Example
///
/// ```no_run
/// use sheetview::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("report.xlsx")?;
/// println!("Detected format: {}", format);
/// # Ok::<(), sheetview::Error>(())
/// ```
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Detect the format type from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if is_zip_file(data) {
        let format = detect_ooxml(Cursor::new(data))?;
        log::debug!("detected {} from ZIP content types", format.name());
        return Ok(format);
    }

    if is_cfb_file(data) {
        let format = detect_cfb(Cursor::new(data))?;
        log::debug!("detected {} from CFB directory", format.name());
        return Ok(format);
    }

    Err(Error::UnknownFormat)
}

/// Inspect an OOXML package's `[Content_Types].xml`.
fn detect_ooxml<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Some(decode_xml_bytes(&bytes)?)
        }
        Err(_) => None,
    };
    let Some(content_types) = content_types else {
        return detect_by_folder_structure(&mut archive);
    };

    if content_types.contains(XLSX_CONTENT_TYPE) || content_types.contains(XLSM_CONTENT_TYPE) {
        return Ok(FormatType::Xlsx);
    }

    for (content_type, name) in OTHER_OOXML_TYPES {
        if content_types.contains(content_type) {
            return Err(Error::UnsupportedFormat(name.to_string()));
        }
    }

    detect_by_folder_structure(&mut archive)
}

/// Fallback detection by checking folder structure.
fn detect_by_folder_structure<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<FormatType> {
    let names: Vec<String> = archive.file_names().map(String::from).collect();

    if names.iter().any(|n| n.starts_with("xl/")) {
        Ok(FormatType::Xlsx)
    } else if names.iter().any(|n| n.starts_with("word/")) {
        Err(Error::UnsupportedFormat("Word Document".to_string()))
    } else if names.iter().any(|n| n.starts_with("ppt/")) {
        Err(Error::UnsupportedFormat("PowerPoint Presentation".to_string()))
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Inspect a compound file's root streams.
fn detect_cfb<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let cfb = cfb::CompoundFile::open(reader)
        .map_err(|e| Error::InvalidData(format!("compound file: {}", e)))?;

    // Password-protected OOXML is wrapped in a compound file
    if cfb.exists("/EncryptionInfo") || cfb.exists("/EncryptedPackage") {
        return Err(Error::Encrypted);
    }
    if cfb.exists("/Workbook") || cfb.exists("/Book") {
        return Ok(FormatType::Xls);
    }
    if cfb.exists("/WordDocument") {
        return Err(Error::UnsupportedFormat(
            "Word 97-2003 Document".to_string(),
        ));
    }
    if cfb.exists("/PowerPoint Document") {
        return Err(Error::UnsupportedFormat(
            "PowerPoint 97-2003 Presentation".to_string(),
        ));
    }

    Err(Error::UnknownFormat)
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Check if data starts with the compound file signature.
pub fn is_cfb_file(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == CFB_MAGIC
}
