//! BIFF8 string decoding.
//!
//! A string is a character count, a flags byte (bit 0 wide UTF-16LE, bit 2
//! phonetic block, bit 3 rich-text runs), optional run count and phonetic
//! size, the characters, then the runs and phonetic data. Inside the SST a
//! string may straddle a CONTINUE boundary; the continuation then starts with
//! a fresh flags byte that can switch between compressed and wide characters.

use super::biff::{read_u16, read_u32, read_u8, BiffRecord};
use crate::error::{Error, Result};

const FLAG_WIDE: u8 = 0x01;
const FLAG_PHONETIC: u8 = 0x04;
const FLAG_RICH: u8 = 0x08;

/// Read a string with a 1-byte character count (BOUNDSHEET names).
pub fn read_short_string(data: &[u8], offset: &mut usize) -> Result<String> {
    let count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    read_chars(data, offset, count, flags & FLAG_WIDE != 0)
}

/// Read a string with a 2-byte character count (LABEL, STRING, FORMAT).
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> Result<String> {
    let count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    let runs = if flags & FLAG_RICH != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let phonetic = if flags & FLAG_PHONETIC != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let text = read_chars(data, offset, count, flags & FLAG_WIDE != 0)?;
    *offset += runs * 4 + phonetic;
    Ok(text)
}

fn read_chars(data: &[u8], offset: &mut usize, count: usize, wide: bool) -> Result<String> {
    let width = if wide { 2 } else { 1 };
    let bytes = data
        .get(*offset..*offset + count * width)
        .ok_or_else(|| {
            Error::Biff(format!(
                "string of {} chars at offset {} runs past end of record",
                count, *offset
            ))
        })?;
    *offset += count * width;
    Ok(decode_chars(bytes, wide))
}

fn decode_chars(bytes: &[u8], wide: bool) -> String {
    if wide {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        // Compressed strings hold the low byte of each UTF-16 code unit
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Parse the shared string table from an SST record.
///
/// A table cut short by a malformed string keeps the strings read so far.
pub fn parse_sst(record: &BiffRecord) -> Result<Vec<String>> {
    let data = &record.data;
    let mut offset = 0;
    let _total = read_u32(data, &mut offset)?;
    let unique = read_u32(data, &mut offset)? as usize;

    let mut strings = Vec::with_capacity(unique.min(data.len()));
    for i in 0..unique {
        match read_sst_string(data, &record.continues, &mut offset) {
            Ok(s) => strings.push(s),
            Err(e) => {
                log::warn!("SST truncated at string {}/{}: {}", i, unique, e);
                break;
            }
        }
    }

    log::debug!("SST: {} unique strings", strings.len());
    Ok(strings)
}

fn read_sst_string(data: &[u8], continues: &[usize], offset: &mut usize) -> Result<String> {
    let mut remaining = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    let runs = if flags & FLAG_RICH != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let phonetic = if flags & FLAG_PHONETIC != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let mut wide = flags & FLAG_WIDE != 0;
    let mut text = String::new();

    while remaining > 0 {
        if continues.binary_search(&*offset).is_ok() {
            wide = read_u8(data, offset)? & FLAG_WIDE != 0;
        }

        let boundary = continues
            .iter()
            .copied()
            .find(|&b| b > *offset)
            .unwrap_or(data.len());
        let width = if wide { 2 } else { 1 };
        let fits = ((boundary - *offset) / width).min(remaining);
        if fits == 0 {
            return Err(Error::Biff(format!(
                "SST string data ends early at offset {}",
                *offset
            )));
        }

        text.push_str(&decode_chars(&data[*offset..*offset + fits * width], wide));
        *offset += fits * width;
        remaining -= fits;
    }

    *offset += runs * 4 + phonetic;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xls::biff::records;

    fn sst(data: Vec<u8>, continues: Vec<usize>) -> BiffRecord {
        BiffRecord {
            record_type: records::SST,
            data,
            continues,
            stream_offset: 0,
        }
    }

    fn header(unique: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&unique.to_le_bytes());
        buf.extend_from_slice(&unique.to_le_bytes());
        buf
    }

    #[test]
    fn test_compressed_and_wide_strings() {
        let data = [0x03, 0x00, 0x00, b'A', b'B', b'C'];
        let mut off = 0;
        assert_eq!(read_unicode_string(&data, &mut off).unwrap(), "ABC");
        assert_eq!(off, 6);

        let data = [0x02, 0x00, 0x01, 0x71, 0x67, 0xAC, 0x4E];
        let mut off = 0;
        assert_eq!(read_unicode_string(&data, &mut off).unwrap(), "東京");
        assert_eq!(off, 7);

        let data = [0x06, 0x00, b'S', b'h', b'e', b'e', b't', b'1'];
        let mut off = 0;
        assert_eq!(read_short_string(&data, &mut off).unwrap(), "Sheet1");
    }

    #[test]
    fn test_rich_string_skips_runs() {
        let mut data = vec![0x02, 0x00, FLAG_RICH, 0x01, 0x00, b'H', b'i'];
        data.extend_from_slice(&[0, 0, 1, 0]);
        data.push(0xEE);
        let mut off = 0;
        assert_eq!(read_unicode_string(&data, &mut off).unwrap(), "Hi");
        assert_eq!(data[off], 0xEE);
    }

    #[test]
    fn test_parse_sst() {
        let mut data = header(2);
        data.extend_from_slice(&[0x08, 0x00, 0x00]);
        data.extend_from_slice(b"Campaign");
        data.extend_from_slice(&[0x00, 0x00, 0x00]);

        let strings = parse_sst(&sst(data, Vec::new())).unwrap();
        assert_eq!(strings, vec!["Campaign".to_string(), String::new()]);
    }

    #[test]
    fn test_sst_string_across_continue_switches_width() {
        // "Spring Sale" split after "Spr"; the continuation is wide
        let mut data = header(2);
        data.extend_from_slice(&[0x0B, 0x00, 0x00]);
        data.extend_from_slice(b"Spr");
        let boundary = data.len();
        data.push(FLAG_WIDE);
        for c in "ing Sale".encode_utf16() {
            data.extend_from_slice(&c.to_le_bytes());
        }
        data.extend_from_slice(&[0x02, 0x00, 0x00]);
        data.extend_from_slice(b"OK");

        let strings = parse_sst(&sst(data, vec![boundary])).unwrap();
        assert_eq!(strings, vec!["Spring Sale".to_string(), "OK".to_string()]);
    }

    #[test]
    fn test_string_starting_at_boundary_has_no_flags_byte() {
        let mut data = header(2);
        data.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        let boundary = data.len();
        data.extend_from_slice(&[0x01, 0x00, 0x00, b'B']);

        let strings = parse_sst(&sst(data, vec![boundary])).unwrap();
        assert_eq!(strings, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_characters_starting_in_continuation() {
        let mut data = header(1);
        data.extend_from_slice(&[0x02, 0x00, 0x00]);
        let boundary = data.len();
        data.push(0x00);
        data.extend_from_slice(b"Go");

        let strings = parse_sst(&sst(data, vec![boundary])).unwrap();
        assert_eq!(strings, vec!["Go".to_string()]);
    }

    #[test]
    fn test_truncated_sst_keeps_prefix() {
        let mut data = header(3);
        data.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        data.extend_from_slice(&[0x05, 0x00, 0x00, b'B']);

        let strings = parse_sst(&sst(data, Vec::new())).unwrap();
        assert_eq!(strings, vec!["A".to_string()]);
    }
}
