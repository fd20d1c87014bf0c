//! XLSX parser implementation.

use crate::container::OoxmlContainer;
use crate::detect::FormatType;
use crate::error::{Error, Result};
use crate::model::{
    parse_cell_ref, CellValue, Sheet, Workbook, DATE_1904_OFFSET, MAX_COLS, MAX_ROWS,
};
use crate::options::ReadOptions;
use std::path::Path;

use super::shared_strings::SharedStrings;
use super::styles::Styles;

/// Default location of the workbook part.
const DEFAULT_WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Sheet entry from workbook.xml with its resolved part path.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    part_path: Option<String>,
}

/// Parser for XLSX (Excel) workbooks.
pub struct XlsxParser {
    container: OoxmlContainer,
    options: ReadOptions,
    shared_strings: SharedStrings,
    styles: Styles,
    sheets: Vec<SheetInfo>,
    date1904: bool,
}

impl XlsxParser {
    /// Open an XLSX file for parsing.
    pub fn open(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container, options)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: Vec<u8>, options: ReadOptions) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container, options)
    }

    fn from_container(container: OoxmlContainer, options: ReadOptions) -> Result<Self> {
        let workbook_path = Self::locate_workbook(&container)?;
        let workbook_xml = container.read_xml(&workbook_path)?;
        let (entries, date1904) = Self::parse_workbook(&workbook_xml)?;

        let rels = container.read_relationships(&workbook_path)?;

        let sheets = entries
            .into_iter()
            .map(|(name, rel_id)| {
                let part_path = rels
                    .get(&rel_id)
                    .map(|rel| OoxmlContainer::resolve_path(&workbook_path, &rel.target));
                if part_path.is_none() {
                    log::warn!("sheet {:?} has no resolvable part ({})", name, rel_id);
                }
                SheetInfo { name, part_path }
            })
            .collect::<Vec<_>>();

        let shared_strings_path = rels
            .find_by_type_suffix("sharedStrings")
            .map(|rel| OoxmlContainer::resolve_path(&workbook_path, &rel.target))
            .unwrap_or_else(|| "xl/sharedStrings.xml".to_string());
        let shared_strings = match container.read_xml(&shared_strings_path) {
            Ok(xml) => SharedStrings::parse(&xml)?,
            Err(Error::MissingComponent(_)) => SharedStrings::default(),
            Err(e) => return Err(e),
        };

        let styles_path = rels
            .find_by_type_suffix("styles")
            .map(|rel| OoxmlContainer::resolve_path(&workbook_path, &rel.target))
            .unwrap_or_else(|| "xl/styles.xml".to_string());
        let styles = container
            .read_xml(&styles_path)
            .map(|xml| Styles::parse(&xml))
            .unwrap_or_default();

        log::debug!(
            "xlsx workbook at {} with {} sheets, {} shared strings",
            workbook_path,
            sheets.len(),
            shared_strings.len()
        );

        Ok(Self {
            container,
            options,
            shared_strings,
            styles,
            sheets,
            date1904,
        })
    }

    /// Find the main workbook part through the package relationships.
    fn locate_workbook(container: &OoxmlContainer) -> Result<String> {
        let package_rels = container.read_package_relationships()?;
        let path = package_rels
            .find_by_type_suffix("officeDocument")
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PATH.to_string());

        if container.exists(&path) {
            Ok(path)
        } else {
            Err(Error::MissingComponent(path))
        }
    }

    /// Parse workbook.xml for sheet entries (name, relationship id) and the date system.
    fn parse_workbook(xml: &str) -> Result<(Vec<(String, String)>, bool)> {
        let mut sheets = Vec::new();
        let mut date1904 = false;

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e))
                | Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let mut name = String::new();
                        let mut rel_id = String::new();

                        for attr in e.attributes().flatten() {
                            let key = attr.key;
                            match key.local_name().as_ref() {
                                b"name" if key.prefix().is_none() => {
                                    name = attr
                                        .unescape_value()
                                        .map(|v| v.to_string())
                                        .unwrap_or_default();
                                }
                                b"id" if key.prefix().is_some() => {
                                    rel_id = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }

                        if !name.is_empty() {
                            sheets.push((name, rel_id));
                        }
                    }
                    b"workbookPr" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"date1904" {
                                let value = String::from_utf8_lossy(&attr.value).to_lowercase();
                                date1904 = value == "1" || value == "true";
                            }
                        }
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date1904))
    }

    /// Parse the workbook: metadata, sheet names and the first sheet's cells.
    pub fn parse(&mut self) -> Result<Workbook> {
        let metadata = self.container.parse_core_metadata()?;
        let first_sheet = self.parse_sheet(0)?;

        Ok(Workbook {
            format: FormatType::Xlsx,
            metadata,
            sheet_names: self.sheet_names().into_iter().map(String::from).collect(),
            first_sheet,
        })
    }

    /// Parse one worksheet by index.
    ///
    /// A workbook without sheets yields an empty, unnamed sheet.
    pub fn parse_sheet(&self, index: usize) -> Result<Sheet> {
        let Some(info) = self.sheets.get(index) else {
            if self.sheets.is_empty() {
                return Ok(Sheet::new(""));
            }
            return Err(Error::InvalidData(format!("no sheet at index {}", index)));
        };

        let mut sheet = Sheet::new(info.name.clone());
        if let Some(ref part_path) = info.part_path {
            let xml = self.container.read_xml(part_path)?;
            self.parse_sheet_xml(&xml, &mut sheet)?;
        }

        log::debug!("sheet {:?}: {} cells", sheet.name, sheet.cell_count());
        Ok(sheet)
    }

    /// Parse worksheet XML cells into a sheet.
    fn parse_sheet_xml(&self, xml: &str, sheet: &mut Sheet) -> Result<()> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut row_idx: u32 = 0;
        let mut next_row: u32 = 0;
        let mut next_col: u32 = 0;
        let mut cell = CellState::default();
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        row_idx = row_attr(e)?.unwrap_or(next_row);
                        next_row = row_idx + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        cell = CellState::from_attrs(e, row_idx, next_col)?;
                        next_col = cell.col + 1;
                        in_cell = true;
                    }
                    b"v" if in_cell => in_value = true,
                    b"is" if in_cell => in_inline = true,
                    b"rPh" if in_inline => in_phonetic = true,
                    b"t" if in_inline && !in_phonetic => in_value = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        row_idx = row_attr(e)?.unwrap_or(next_row);
                        next_row = row_idx + 1;
                    }
                    b"c" => {
                        // A self-closing cell carries formatting only
                        let empty = CellState::from_attrs(e, row_idx, next_col)?;
                        next_col = empty.col + 1;
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_value {
                        let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                        cell.raw.push_str(&text);
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(value) = self.resolve_cell_value(&cell) {
                            sheet.set(cell.row, cell.col, value);
                        }
                        in_cell = false;
                        in_value = false;
                        in_inline = false;
                    }
                    b"v" | b"t" => in_value = false,
                    b"rPh" => in_phonetic = false,
                    b"is" => in_inline = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Resolve a cell's raw text based on its type and style.
    fn resolve_cell_value(&self, cell: &CellState) -> Option<CellValue> {
        let raw = cell.raw.as_str();
        match cell.cell_type.as_deref() {
            Some("s") => {
                let idx = raw.trim().parse::<usize>().ok()?;
                match self.shared_strings.get(idx) {
                    Some(s) => Some(CellValue::String(s.to_string())),
                    None => {
                        log::warn!("shared string index {} out of range", idx);
                        None
                    }
                }
            }
            Some("b") => Some(CellValue::Bool(matches!(raw.trim(), "1" | "true"))),
            Some("e") => Some(CellValue::Error(raw.to_string())),
            Some("str") | Some("inlineStr") | Some("d") => Some(CellValue::String(raw.to_string())),
            _ => {
                if raw.trim().is_empty() {
                    return None;
                }
                match raw.trim().parse::<f64>() {
                    Ok(mut n) => {
                        let is_date = cell
                            .style
                            .is_some_and(|s| self.styles.is_date_style(s));
                        if is_date && self.date1904 {
                            n += DATE_1904_OFFSET;
                        }
                        Some(CellValue::numeric(n, is_date, self.options.dates))
                    }
                    Err(_) => Some(CellValue::String(raw.to_string())),
                }
            }
        }
    }

    /// Get a reference to the container.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Attributes and accumulated text of the cell being parsed.
#[derive(Debug, Default)]
struct CellState {
    row: u32,
    col: u32,
    cell_type: Option<String>,
    style: Option<usize>,
    raw: String,
}

impl CellState {
    /// Read a `<c>` element's attributes. Cells without `r` take the next
    /// position in the row; positions outside the sheet are rejected.
    fn from_attrs(e: &quick_xml::events::BytesStart<'_>, row: u32, next_col: u32) -> Result<Self> {
        let mut state = CellState {
            row,
            col: next_col,
            ..Default::default()
        };

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let reference = String::from_utf8_lossy(&attr.value);
                    let (r, c) = parse_cell_ref(&reference).ok_or_else(|| {
                        Error::InvalidData(format!("invalid cell reference {:?}", reference))
                    })?;
                    state.row = r;
                    state.col = c;
                }
                b"t" => state.cell_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
                b"s" => state.style = String::from_utf8_lossy(&attr.value).parse().ok(),
                _ => {}
            }
        }

        if state.row >= MAX_ROWS || state.col >= MAX_COLS {
            return Err(Error::InvalidData(format!(
                "cell at row {}, column {} is outside the sheet",
                u64::from(state.row) + 1,
                u64::from(state.col) + 1
            )));
        }
        Ok(state)
    }
}

/// Read the 1-based `r` attribute of a `<row>` as a 0-based index.
fn row_attr(e: &quick_xml::events::BytesStart<'_>) -> Result<Option<u32>> {
    let Some(attr) = e.attributes().flatten().find(|attr| attr.key.as_ref() == b"r") else {
        return Ok(None);
    };
    let value = String::from_utf8_lossy(&attr.value);
    match value.trim().parse::<u32>() {
        Ok(r @ 1..=MAX_ROWS) => Ok(Some(r - 1)),
        _ => Err(Error::InvalidData(format!("invalid row number {:?}", value))),
    }
}
