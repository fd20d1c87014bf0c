//! Workbook-level model structures.

use super::Sheet;
use crate::detect::FormatType;
use serde::{Deserialize, Serialize};

/// Workbook metadata extracted from docProps/core.xml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author/creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Keywords/tags
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// A parsed workbook. Only the first sheet's cells are loaded.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Detected container format
    pub format: FormatType,

    /// Core properties (OOXML only)
    pub metadata: Metadata,

    /// All sheet names in workbook order
    pub sheet_names: Vec<String>,

    /// The first sheet, with cells
    pub first_sheet: Sheet,
}

impl Workbook {
    /// Number of sheets listed in the workbook.
    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }
}
