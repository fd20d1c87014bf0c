//! XLS (BIFF8) parser implementation.

use crate::detect::FormatType;
use crate::error::{Error, Result};
use crate::model::{
    is_builtin_date_format, is_date_format_code, CellValue, Metadata, Sheet, Workbook,
    DATE_1904_OFFSET,
};
use crate::options::ReadOptions;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use super::biff::{self, decode_rk, read_f64, read_u16, read_u32, records, BiffRecord};
use super::strings::{parse_sst, read_short_string, read_unicode_string};

/// Worksheet entry from a BOUNDSHEET record.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    /// Stream offset of the sheet's BOF record
    offset: usize,
}

/// Parser for legacy Excel 97-2003 workbooks.
pub struct XlsParser {
    options: ReadOptions,
    records: Vec<BiffRecord>,
    globals_end: usize,
    sst: Vec<String>,
    sheets: Vec<SheetInfo>,
    /// Custom number formats: format index -> format code
    formats: HashMap<u16, String>,
    /// XF index -> format index
    xf_formats: Vec<u16>,
    date1904: bool,
}

impl XlsParser {
    /// Open an XLS file for parsing.
    pub fn open(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data, options)
    }

    /// Create a parser from the bytes of a compound file.
    pub fn from_bytes(data: Vec<u8>, options: ReadOptions) -> Result<Self> {
        let mut comp = cfb::CompoundFile::open(Cursor::new(data))
            .map_err(|e| Error::InvalidData(format!("invalid compound file: {}", e)))?;

        if comp.exists("/EncryptionInfo") || comp.exists("/EncryptedPackage") {
            return Err(Error::Encrypted);
        }

        let stream_path = if comp.exists("/Workbook") {
            "/Workbook"
        } else if comp.exists("/Book") {
            "/Book"
        } else {
            return Err(Error::MissingComponent("Workbook stream".to_string()));
        };

        let mut stream = Vec::new();
        comp.open_stream(stream_path)?.read_to_end(&mut stream)?;

        let records = biff::read_records(&stream)?;
        log::debug!("{}: {} BIFF records", stream_path, records.len());

        let mut parser = Self {
            options,
            records,
            globals_end: 0,
            sst: Vec::new(),
            sheets: Vec::new(),
            formats: HashMap::new(),
            xf_formats: Vec::new(),
            date1904: false,
        };
        parser.parse_globals()?;
        Ok(parser)
    }

    /// Read the workbook globals substream up to its EOF.
    fn parse_globals(&mut self) -> Result<()> {
        let first = self
            .records
            .first()
            .filter(|r| r.record_type == records::BOF)
            .ok_or_else(|| Error::Biff("stream does not start with BOF".to_string()))?;

        let (version, substream) = biff::parse_bof(&first.data)?;
        if substream != records::BOF_WORKBOOK_GLOBALS {
            return Err(Error::Biff(format!(
                "expected workbook globals, found substream 0x{:04X}",
                substream
            )));
        }
        if version != records::BIFF8_VERSION {
            return Err(Error::UnsupportedFormat(format!(
                "BIFF version 0x{:04X} (only BIFF8 is supported)",
                version
            )));
        }

        for (idx, rec) in self.records.iter().enumerate().skip(1) {
            match rec.record_type {
                records::EOF => {
                    self.globals_end = idx;
                    break;
                }
                records::FILEPASS => return Err(Error::Encrypted),
                records::SST => self.sst = parse_sst(rec)?,
                records::BOUNDSHEET => {
                    let mut off = 0;
                    let offset = read_u32(&rec.data, &mut off)? as usize;
                    let _visibility = rec.data.get(off).copied().unwrap_or(0);
                    let sheet_type = rec.data.get(off + 1).copied().unwrap_or(0);
                    off += 2;
                    let name = read_short_string(&rec.data, &mut off)?;

                    // Charts and macro sheets carry no cell grid
                    if sheet_type == 0 {
                        self.sheets.push(SheetInfo { name, offset });
                    } else {
                        log::debug!("skipping non-worksheet {:?} (type {})", name, sheet_type);
                    }
                }
                records::DATEMODE => {
                    let mut off = 0;
                    self.date1904 = read_u16(&rec.data, &mut off)? == 1;
                }
                records::FORMAT => {
                    let mut off = 0;
                    let id = read_u16(&rec.data, &mut off)?;
                    match read_unicode_string(&rec.data, &mut off) {
                        Ok(code) => {
                            self.formats.insert(id, code);
                        }
                        Err(e) => log::warn!("skipping unreadable FORMAT {}: {}", id, e),
                    }
                }
                records::XF => {
                    let mut off = 2;
                    self.xf_formats.push(read_u16(&rec.data, &mut off).unwrap_or(0));
                }
                _ => {}
            }
        }

        if self.globals_end == 0 {
            return Err(Error::Biff("workbook globals have no EOF".to_string()));
        }

        log::debug!(
            "xls workbook with {} worksheets, {} shared strings",
            self.sheets.len(),
            self.sst.len()
        );
        Ok(())
    }

    /// Parse the workbook: sheet names and the first worksheet's cells.
    pub fn parse(&mut self) -> Result<Workbook> {
        let first_sheet = self.parse_sheet(0)?;
        Ok(Workbook {
            format: FormatType::Xls,
            metadata: Metadata::default(),
            sheet_names: self.sheet_names().into_iter().map(String::from).collect(),
            first_sheet,
        })
    }

    /// Parse one worksheet by index.
    ///
    /// A workbook without worksheets yields an empty, unnamed sheet.
    pub fn parse_sheet(&self, index: usize) -> Result<Sheet> {
        let Some(info) = self.sheets.get(index) else {
            if self.sheets.is_empty() {
                return Ok(Sheet::new(""));
            }
            return Err(Error::InvalidData(format!("no sheet at index {}", index)));
        };

        let mut sheet = Sheet::new(info.name.clone());
        match self.find_substream(info.offset, index) {
            Some(start) => self.parse_cells(start, &mut sheet)?,
            None => log::warn!("no substream found for sheet {:?}", info.name),
        }

        log::debug!("sheet {:?}: {} cells", sheet.name, sheet.cell_count());
        Ok(sheet)
    }

    /// Locate a worksheet's BOF by its stream offset, falling back to order.
    fn find_substream(&self, offset: usize, index: usize) -> Option<usize> {
        let after_globals = self.globals_end + 1;
        let by_offset = self.records[after_globals..]
            .iter()
            .position(|r| r.record_type == records::BOF && r.stream_offset == offset)
            .map(|pos| pos + after_globals);
        if by_offset.is_some() {
            return by_offset;
        }

        log::warn!("BOUNDSHEET offset {} does not match a BOF, using order", offset);
        let mut depth = 0;
        let mut seen = 0;
        for (idx, rec) in self.records.iter().enumerate().skip(after_globals) {
            match rec.record_type {
                records::BOF => {
                    if depth == 0 {
                        let worksheet = biff::parse_bof(&rec.data)
                            .map(|(_, dt)| dt == records::BOF_WORKSHEET)
                            .unwrap_or(false);
                        if worksheet {
                            if seen == index {
                                return Some(idx);
                            }
                            seen += 1;
                        }
                    }
                    depth += 1;
                }
                records::EOF => depth -= 1,
                _ => {}
            }
        }
        None
    }

    /// Read cell records from the substream starting at the BOF at `start`.
    fn parse_cells(&self, start: usize, sheet: &mut Sheet) -> Result<()> {
        // Cell of the last FORMULA whose string result follows in a STRING record
        let mut pending_string: Option<(u32, u32)> = None;
        let mut depth = 0;

        for rec in &self.records[start..] {
            let data = rec.data.as_slice();
            let mut off = 0;

            match rec.record_type {
                records::BOF => depth += 1,
                records::EOF => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                // Nested substreams (embedded charts) have no cells of this sheet
                _ if depth > 1 => {}
                records::LABELSST => {
                    let (row, col, _) = read_cell_header(data, &mut off)?;
                    let idx = read_u32(data, &mut off)? as usize;
                    match self.sst.get(idx) {
                        Some(s) => sheet.set(row, col, CellValue::String(s.clone())),
                        None => log::warn!("SST index {} out of range", idx),
                    }
                }
                records::LABEL => {
                    let (row, col, _) = read_cell_header(data, &mut off)?;
                    let text = read_unicode_string(data, &mut off)?;
                    sheet.set(row, col, CellValue::String(text));
                }
                records::NUMBER => {
                    let (row, col, xf) = read_cell_header(data, &mut off)?;
                    let value = read_f64(data, &mut off)?;
                    sheet.set(row, col, self.number(xf, value));
                }
                records::RK => {
                    let (row, col, xf) = read_cell_header(data, &mut off)?;
                    let value = decode_rk(read_u32(data, &mut off)?);
                    sheet.set(row, col, self.number(xf, value));
                }
                records::MULRK => {
                    // row, first col, [xf, rk]*, last col
                    if data.len() < 6 {
                        return Err(Error::Biff("MULRK record too short".to_string()));
                    }
                    let row = read_u16(data, &mut off)? as u32;
                    let mut col = read_u16(data, &mut off)? as u32;
                    let end = data.len() - 2;
                    while off + 6 <= end {
                        let xf = read_u16(data, &mut off)?;
                        let value = decode_rk(read_u32(data, &mut off)?);
                        sheet.set(row, col, self.number(xf, value));
                        col += 1;
                    }
                }
                records::BOOLERR => {
                    let (row, col, _) = read_cell_header(data, &mut off)?;
                    let value = data.get(off).copied().unwrap_or(0);
                    let is_error = data.get(off + 1).copied().unwrap_or(0) != 0;
                    let cell = if is_error {
                        CellValue::Error(error_code(value).to_string())
                    } else {
                        CellValue::Bool(value != 0)
                    };
                    sheet.set(row, col, cell);
                }
                records::FORMULA => {
                    let (row, col, xf) = read_cell_header(data, &mut off)?;
                    let result = data
                        .get(off..off + 8)
                        .ok_or_else(|| Error::Biff("FORMULA record too short".to_string()))?;

                    pending_string = None;
                    if result[6] == 0xFF && result[7] == 0xFF {
                        match result[0] {
                            0x00 => pending_string = Some((row, col)),
                            0x01 => sheet.set(row, col, CellValue::Bool(result[2] != 0)),
                            0x02 => sheet.set(
                                row,
                                col,
                                CellValue::Error(error_code(result[2]).to_string()),
                            ),
                            0x03 => sheet.set(row, col, CellValue::String(String::new())),
                            other => log::debug!("unknown FORMULA result type {}", other),
                        }
                    } else {
                        let value = read_f64(data, &mut off)?;
                        sheet.set(row, col, self.number(xf, value));
                    }
                }
                records::STRING => {
                    if let Some((row, col)) = pending_string.take() {
                        let text = read_unicode_string(data, &mut off)?;
                        sheet.set(row, col, CellValue::String(text));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Build a numeric cell, applying the date format of its XF.
    fn number(&self, xf: u16, value: f64) -> CellValue {
        let is_date = self.is_date_xf(xf);
        let value = if is_date && self.date1904 {
            value + DATE_1904_OFFSET
        } else {
            value
        };
        CellValue::numeric(value, is_date, self.options.dates)
    }

    fn is_date_xf(&self, xf: u16) -> bool {
        self.xf_formats
            .get(xf as usize)
            .is_some_and(|&fmt| match self.formats.get(&fmt) {
                Some(code) => is_date_format_code(code),
                None => is_builtin_date_format(fmt as u32),
            })
    }

    /// Get the number of worksheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get worksheet names.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Read the row, column, XF triple that starts every cell record.
fn read_cell_header(data: &[u8], off: &mut usize) -> Result<(u32, u32, u16)> {
    let row = read_u16(data, off)? as u32;
    let col = read_u16(data, off)? as u32;
    let xf = read_u16(data, off)?;
    Ok((row, col, xf))
}

/// Map a BIFF error value to its display code.
fn error_code(value: u8) -> &'static str {
    match value {
        0x00 => "#NULL!",
        0x07 => "#DIV/0!",
        0x0F => "#VALUE!",
        0x17 => "#REF!",
        0x1D => "#NAME?",
        0x24 => "#NUM!",
        0x2A => "#N/A",
        0x2B => "#GETTING_DATA",
        _ => "#VALUE!",
    }
}
