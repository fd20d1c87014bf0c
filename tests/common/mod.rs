//! Workbook builders shared by the integration tests.
//!
//! Rows are given as text: an empty string leaves the cell out, text that
//! parses as a number becomes a numeric cell, anything else a string cell.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

fn column_letters(mut col: usize) -> String {
    let mut name = String::new();
    loop {
        name.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Build an .xlsx workbook whose first sheet holds `rows`. Extra sheet
/// names are listed after it with empty content.
pub fn xlsx(sheet_names: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet_entries = String::new();
    let mut sheet_rels = String::new();
    for (i, name) in sheet_names.iter().enumerate() {
        sheet_entries.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(name),
            i + 1,
            i + 1
        ));
        sheet_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }

    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        sheet_entries
    );
    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        sheet_rels
    );

    let mut sheet_data = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, text) in row.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let reference = format!("{}{}", column_letters(c), r + 1);
            if text.parse::<f64>().is_ok() {
                sheet_data.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, text));
            } else {
                sheet_data.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference,
                    escape_xml(text)
                ));
            }
        }
        sheet_data.push_str("</row>");
    }
    let first_sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        sheet_data
    );

    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        let mut put = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        put(
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
        );
        put(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        );
        put("xl/workbook.xml", &workbook);
        put("xl/_rels/workbook.xml.rels", &workbook_rels);
        put("xl/worksheets/sheet1.xml", &first_sheet);
        for i in 1..sheet_names.len() {
            put(
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                "<worksheet><sheetData/></worksheet>",
            );
        }
        zip.finish().unwrap();
    }
    buffer
}

fn record(record_type: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&record_type.to_le_bytes());
    out.extend_from_slice(&(body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
    out
}

fn bof(substream: u16) -> Vec<u8> {
    let mut body = vec![0u8; 16];
    body[0..2].copy_from_slice(&0x0600u16.to_le_bytes());
    body[2..4].copy_from_slice(&substream.to_le_bytes());
    record(0x0809, &body)
}

/// Build an .xls (BIFF8) workbook with a single worksheet holding `rows`.
pub fn xls(sheet_name: &str, rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet = bof(0x0010);
    for (r, row) in rows.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let mut body = Vec::new();
            body.extend_from_slice(&(r as u16).to_le_bytes());
            body.extend_from_slice(&(c as u16).to_le_bytes());
            body.extend_from_slice(&0u16.to_le_bytes());
            match text.parse::<f64>() {
                Ok(value) => {
                    body.extend_from_slice(&value.to_le_bytes());
                    sheet.extend(record(0x0203, &body));
                }
                Err(_) => {
                    body.extend_from_slice(&(text.len() as u16).to_le_bytes());
                    body.push(0);
                    body.extend_from_slice(text.as_bytes());
                    sheet.extend(record(0x0204, &body));
                }
            }
        }
    }
    sheet.extend(record(0x000A, &[]));

    let boundsheet = |offset: u32| {
        let mut body = offset.to_le_bytes().to_vec();
        body.extend_from_slice(&[0, 0, sheet_name.len() as u8, 0]);
        body.extend_from_slice(sheet_name.as_bytes());
        record(0x0085, &body)
    };
    let globals_len = (bof(0x0005).len() + boundsheet(0).len() + 4) as u32;

    let mut stream = bof(0x0005);
    stream.extend(boundsheet(globals_len));
    stream.extend(record(0x000A, &[]));
    stream.extend(sheet);

    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut s = comp.create_stream("/Workbook").unwrap();
        s.write_all(&stream).unwrap();
        s.flush().unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}
