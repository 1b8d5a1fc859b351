//! BIFF record writer for XLS files
//!
//! This module provides functions to generate BIFF8 (Binary Interchange File Format)
//! records. BIFF8 is the format used by Excel 97-2003.
//!
//! # BIFF Record Structure
//!
//! Each BIFF record consists of:
//! - Record type (2 bytes) - identifies the record
//! - Record length (2 bytes) - length of data in bytes, at most 8224
//! - Record data (variable length)
//!
//! All integers are little-endian. Payloads that would exceed the limit are
//! either rejected (`RecordTooLarge`) or split into CONTINUE records by the
//! caller (`Record::continued`, the SST writer).
//!
//! # References
//!
//! Based on Microsoft's "[MS-XLS]: Excel Binary File Format (.xls) Structure" specification.

use super::super::{XlsError, XlsResult};
use std::io::Write;

mod cells;
mod chart;
mod sst;
mod workbook;
mod worksheet;

pub use cells::{decode_rk, encode_rk};
pub(crate) use cells::{
    write_blank, write_boolerr, write_formula, write_labelsst, write_number, write_rk, write_row,
};
pub(crate) use chart::{write_begin, write_chartformat, write_end};
pub use sst::sst_records;
pub(crate) use workbook::{
    boundsheet_size, write_bof, write_boundsheet, write_builtin_styles, write_codepage,
    write_date1904, write_eof, write_format_record, write_usesel_fs, write_window1,
};
pub(crate) use worksheet::{
    write_colinfo, write_dimensions, write_hlink, write_selection, write_window2, write_wsbool,
};

/// Largest payload a single BIFF8 record may carry.
pub const MAX_RECORD_DATA: usize = 8224;

/// Largest formula token array that fits a FORMULA record after its
/// 22-byte fixed part.
pub const MAX_FORMULA_TOKENS: usize = MAX_RECORD_DATA - 22;

/// CONTINUE record type
pub const CONTINUE: u16 = 0x003C;

/// BOF substream type for the workbook globals
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
/// BOF substream type for a worksheet
pub const BOF_WORKSHEET: u16 = 0x0010;

/// A framed BIFF record: opcode plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    opcode: u16,
    payload: Vec<u8>,
}

impl Record {
    /// Record type
    #[inline]
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// Record data without the 4-byte header
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Size on disk, header included
    #[inline]
    pub fn encoded_len(&self) -> usize {
        4 + self.payload.len()
    }

    /// Framed bytes: `opcode | len | payload`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.opcode.to_le_bytes());
        out.extend_from_slice(&(self.payload.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Write the framed record.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> XlsResult<()> {
        write_record_header(writer, self.opcode, self.payload.len())?;
        writer.write_all(&self.payload)?;
        Ok(())
    }

    /// Split an opaque payload into a leading record plus CONTINUE records.
    ///
    /// Each piece carries at most [`MAX_RECORD_DATA`] bytes. An empty payload
    /// yields a single empty record.
    pub fn continued(opcode: u16, payload: &[u8]) -> Vec<Record> {
        if payload.is_empty() {
            return vec![Record {
                opcode,
                payload: Vec::new(),
            }];
        }
        let records: Vec<Record> = payload
            .chunks(MAX_RECORD_DATA)
            .enumerate()
            .map(|(idx, chunk)| Record {
                opcode: if idx == 0 { opcode } else { CONTINUE },
                payload: chunk.to_vec(),
            })
            .collect();
        if records.len() > 1 {
            log::trace!(
                "record 0x{opcode:04X} split into {} pieces ({} bytes)",
                records.len(),
                payload.len()
            );
        }
        records
    }
}

/// Frame a payload as a single record.
///
/// Fails with `RecordTooLarge` when the payload exceeds 8224 bytes.
pub fn emit(opcode: u16, payload: &[u8]) -> XlsResult<Record> {
    check_len(opcode, payload.len())?;
    Ok(Record {
        opcode,
        payload: payload.to_vec(),
    })
}

#[inline]
fn check_len(opcode: u16, len: usize) -> XlsResult<()> {
    if len > MAX_RECORD_DATA {
        return Err(XlsError::RecordTooLarge { opcode, len });
    }
    Ok(())
}

/// Write a BIFF record header
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `record_type` - BIFF record type (e.g., 0x0809 for BOF)
/// * `data_len` - Length of record data in bytes
#[inline]
pub(crate) fn write_record_header<W: Write>(
    writer: &mut W,
    record_type: u16,
    data_len: usize,
) -> XlsResult<()> {
    check_len(record_type, data_len)?;
    writer.write_all(&record_type.to_le_bytes())?;
    writer.write_all(&(data_len as u16).to_le_bytes())?;
    Ok(())
}

/// Write a complete record from an assembled payload.
#[inline]
pub(crate) fn write_record<W: Write>(writer: &mut W, record_type: u16, data: &[u8]) -> XlsResult<()> {
    write_record_header(writer, record_type, data.len())?;
    writer.write_all(data)?;
    Ok(())
}

/// True when every character fits the compressed (Latin-1) form.
#[inline]
pub(crate) fn is_compressible(s: &str) -> bool {
    s.chars().all(|c| (c as u32) <= 0xFF)
}

/// Character data of a BIFF8 unicode string: compressed flag plus bytes.
pub(crate) fn encode_string_chars(s: &str) -> (u8, Vec<u8>) {
    if is_compressible(s) {
        (0x00, s.chars().map(|c| c as u8).collect())
    } else {
        let mut buf = Vec::with_capacity(s.len() * 2);
        for unit in s.encode_utf16() {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
        (0x01, buf)
    }
}

/// Number of characters as BIFF8 counts them (UTF-16 code units).
#[inline]
pub(crate) fn char_count(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Size of an XLUnicodeString (2-byte count, flags, characters).
pub(crate) fn unicode_string_size(value: &str) -> usize {
    let n = char_count(value);
    if is_compressible(value) { 3 + n } else { 3 + n * 2 }
}

/// Append an XLUnicodeString (2-byte character count).
pub(crate) fn push_unicode_string(buf: &mut Vec<u8>, value: &str) {
    let (flag, chars) = encode_string_chars(value);
    buf.extend_from_slice(&(char_count(value) as u16).to_le_bytes());
    buf.push(flag);
    buf.extend_from_slice(&chars);
}

/// Append a ShortXLUnicodeString (1-byte character count).
pub(crate) fn push_short_unicode_string(buf: &mut Vec<u8>, value: &str) -> XlsResult<()> {
    let n = char_count(value);
    let cch = u8::try_from(n).map_err(|_| XlsError::ShortStringTooLong(n))?;
    let (flag, chars) = encode_string_chars(value);
    buf.push(cch);
    buf.push(flag);
    buf.extend_from_slice(&chars);
    Ok(())
}
