//! BIFF8 record stream.
//!
//! A workbook stream is a sequence of records, each a 4-byte header (record
//! type, body length) followed by the body. CONTINUE records extend the body
//! of the preceding record; they are merged here and their start offsets are
//! kept so string decoding can honor the boundaries.

use crate::error::{Error, Result};

/// Record type identifiers.
pub mod records {
    pub const BOF: u16 = 0x0809;
    pub const EOF: u16 = 0x000A;
    pub const CONTINUE: u16 = 0x003C;

    // Workbook globals
    pub const FILEPASS: u16 = 0x002F;
    pub const BOUNDSHEET: u16 = 0x0085;
    pub const SST: u16 = 0x00FC;
    pub const DATEMODE: u16 = 0x0022;
    pub const FORMAT: u16 = 0x041E;
    pub const XF: u16 = 0x00E0;

    // Cells
    pub const LABELSST: u16 = 0x00FD;
    pub const LABEL: u16 = 0x0204;
    pub const NUMBER: u16 = 0x0203;
    pub const RK: u16 = 0x027E;
    pub const MULRK: u16 = 0x00BD;
    pub const BOOLERR: u16 = 0x0205;
    pub const FORMULA: u16 = 0x0006;
    pub const STRING: u16 = 0x0207;

    // BOF substream types
    pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
    pub const BOF_WORKSHEET: u16 = 0x0010;

    pub const BIFF8_VERSION: u16 = 0x0600;
}

/// One record with its CONTINUE bodies merged.
#[derive(Debug, Clone)]
pub struct BiffRecord {
    /// Record type
    pub record_type: u16,
    /// Body bytes, continuations included
    pub data: Vec<u8>,
    /// Offsets in `data` where each CONTINUE body starts
    pub continues: Vec<usize>,
    /// Offset of the record header in the stream
    pub stream_offset: usize,
}

/// Split a workbook stream into records.
///
/// A truncated trailing record is an error; an orphan CONTINUE is dropped.
pub fn read_records(stream: &[u8]) -> Result<Vec<BiffRecord>> {
    let mut records: Vec<BiffRecord> = Vec::new();
    let mut offset = 0;

    while offset + 4 <= stream.len() {
        let stream_offset = offset;
        let record_type = u16::from_le_bytes([stream[offset], stream[offset + 1]]);
        let len = u16::from_le_bytes([stream[offset + 2], stream[offset + 3]]) as usize;
        offset += 4;

        let body = stream.get(offset..offset + len).ok_or_else(|| {
            Error::Biff(format!(
                "record 0x{:04X} at {} runs past end of stream",
                record_type, stream_offset
            ))
        })?;
        offset += len;

        if record_type == records::CONTINUE {
            match records.last_mut() {
                Some(prev) => {
                    prev.continues.push(prev.data.len());
                    prev.data.extend_from_slice(body);
                }
                None => log::warn!("dropping CONTINUE record with no predecessor"),
            }
        } else {
            records.push(BiffRecord {
                record_type,
                data: body.to_vec(),
                continues: Vec::new(),
                stream_offset,
            });
        }
    }

    Ok(records)
}

/// Read `(version, substream type)` from a BOF body.
pub fn parse_bof(data: &[u8]) -> Result<(u16, u16)> {
    let mut off = 0;
    let version = read_u16(data, &mut off)?;
    let substream = read_u16(data, &mut off)?;
    Ok((version, substream))
}

fn short_read(offset: usize, need: usize) -> Error {
    Error::Biff(format!(
        "unexpected end of record at offset {}, need {} bytes",
        offset, need
    ))
}

/// Read a byte, advancing `offset`.
pub fn read_u8(data: &[u8], offset: &mut usize) -> Result<u8> {
    let v = *data.get(*offset).ok_or_else(|| short_read(*offset, 1))?;
    *offset += 1;
    Ok(v)
}

/// Read a little-endian `u16`, advancing `offset`.
pub fn read_u16(data: &[u8], offset: &mut usize) -> Result<u16> {
    let bytes = data
        .get(*offset..*offset + 2)
        .ok_or_else(|| short_read(*offset, 2))?;
    *offset += 2;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Read a little-endian `u32`, advancing `offset`.
pub fn read_u32(data: &[u8], offset: &mut usize) -> Result<u32> {
    let bytes = data
        .get(*offset..*offset + 4)
        .ok_or_else(|| short_read(*offset, 4))?;
    *offset += 4;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a little-endian IEEE 754 double, advancing `offset`.
pub fn read_f64(data: &[u8], offset: &mut usize) -> Result<f64> {
    let bytes: [u8; 8] = data
        .get(*offset..*offset + 8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| short_read(*offset, 8))?;
    *offset += 8;
    Ok(f64::from_le_bytes(bytes))
}

/// Decode an RK number.
///
/// Bit 0 divides by 100. Bit 1 selects a signed 30-bit integer in bits 2..31;
/// otherwise bits 2..31 are the high bits of a double.
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(record_type: u16, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&record_type.to_le_bytes());
        out.extend_from_slice(&(body.len() as u16).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_read_records_merges_continue() {
        let mut stream = record(records::BOF, &[0x00, 0x06, 0x05, 0x00]);
        stream.extend(record(records::SST, &[1, 2, 3]));
        stream.extend(record(records::CONTINUE, &[4, 5]));
        stream.extend(record(records::EOF, &[]));

        let recs = read_records(&stream).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[1].record_type, records::SST);
        assert_eq!(recs[1].data, vec![1, 2, 3, 4, 5]);
        assert_eq!(recs[1].continues, vec![3]);
        assert_eq!(recs[1].stream_offset, 8);
        assert_eq!(parse_bof(&recs[0].data).unwrap(), (0x0600, 0x0005));
    }

    #[test]
    fn test_truncated_record() {
        let mut stream = record(records::NUMBER, &[0; 14]);
        stream.truncate(10);
        assert!(matches!(read_records(&stream), Err(Error::Biff(_))));
    }

    #[test]
    fn test_decode_rk() {
        assert_eq!(decode_rk((42u32 << 2) | 0x02), 42.0);
        assert_eq!(decode_rk(((-5i32 << 2) as u32) | 0x02), -5.0);
        assert!((decode_rk(0x0000_04EB) - 3.14).abs() < f64::EPSILON);

        let bits = 1.5_f64.to_bits();
        assert_eq!(decode_rk(((bits >> 32) as u32) & 0xFFFF_FFFC), 1.5);
    }

    #[test]
    fn test_short_reads() {
        let data = [0x34, 0x12, 0x01];
        let mut off = 0;
        assert_eq!(read_u16(&data, &mut off).unwrap(), 0x1234);
        assert!(read_u16(&data, &mut off).is_err());
        assert_eq!(read_u8(&data, &mut off).unwrap(), 1);
        assert!(read_f64(&data, &mut 0).is_err());
    }
}
