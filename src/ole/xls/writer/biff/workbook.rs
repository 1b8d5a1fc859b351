//! Workbook-globals BIFF8 record writers.

use crate::ole::xls::XlsResult;
use std::io::Write;

use super::{
    char_count, is_compressible, push_short_unicode_string, push_unicode_string, write_record,
    write_record_header,
};

/// Write BOF (Beginning of File) record
///
/// Record type: 0x0809, Length: 16
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `substream_type` - Type of substream (0x0005 = Workbook, 0x0010 = Worksheet)
pub fn write_bof<W: Write>(writer: &mut W, substream_type: u16) -> XlsResult<()> {
    write_record_header(writer, 0x0809, 16)?;

    // BIFF version (0x0600 = BIFF8)
    writer.write_all(&0x0600u16.to_le_bytes())?;
    writer.write_all(&substream_type.to_le_bytes())?;

    // Build identifier and year
    writer.write_all(&0x0DBBu16.to_le_bytes())?;
    writer.write_all(&0x07CCu16.to_le_bytes())?;

    // File history flags, lowest BIFF version
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&6u32.to_le_bytes())?;

    Ok(())
}

/// Write EOF (End of File) record
///
/// Record type: 0x000A
pub fn write_eof<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x000A, 0)
}

/// Write CODEPAGE record
///
/// Record type: 0x0042
///
/// BIFF8 files always declare 1200 (UTF-16).
pub fn write_codepage<W: Write>(writer: &mut W, codepage: u16) -> XlsResult<()> {
    write_record(writer, 0x0042, &codepage.to_le_bytes())
}

/// Write DATE1904 record
///
/// Record type: 0x0022
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `is_1904` - True for 1904 date system (Mac), false for 1900 (Windows)
pub fn write_date1904<W: Write>(writer: &mut W, is_1904: bool) -> XlsResult<()> {
    write_record(writer, 0x0022, &u16::from(is_1904).to_le_bytes())
}

/// Write WINDOW1 record (workbook window properties)
///
/// Record type: 0x003D, Length: 18
///
/// `active` is the displayed tab (itabCur), `first_tab` the leftmost
/// visible tab. Exactly one tab is selected.
pub fn write_window1<W: Write>(writer: &mut W, active: u16, first_tab: u16) -> XlsResult<()> {
    write_record_header(writer, 0x003D, 18)?;

    // xWn, yWn, dxWn, dyWn
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0x25BCu16.to_le_bytes())?;
    writer.write_all(&0x1572u16.to_le_bytes())?;

    // Horizontal and vertical scroll bars, workbook tabs
    writer.write_all(&0x0038u16.to_le_bytes())?;

    writer.write_all(&active.to_le_bytes())?;
    writer.write_all(&first_tab.to_le_bytes())?;
    // ctabSel
    writer.write_all(&1u16.to_le_bytes())?;
    // wTabRatio
    writer.write_all(&0x0258u16.to_le_bytes())?;

    Ok(())
}

/// Write FORMAT record (number format string)
///
/// Record type: 0x041E
pub fn write_format_record<W: Write>(
    writer: &mut W,
    index_code: u16,
    format_str: &str,
) -> XlsResult<()> {
    let mut data = Vec::with_capacity(2 + 3 + format_str.len() * 2);
    data.extend_from_slice(&index_code.to_le_bytes());
    push_unicode_string(&mut data, format_str);
    write_record(writer, 0x041E, &data)
}

/// Write a built-in STYLE record.
///
/// Record type: 0x0293, Length: 4
fn write_style_builtin<W: Write>(
    writer: &mut W,
    xf_index: u16,
    builtin_style_id: u8,
) -> XlsResult<()> {
    // Low 12 bits hold the XF index, bit 15 marks a built-in style.
    let xf_field: u16 = (xf_index & 0x0FFF) | 0x8000;

    write_record_header(writer, 0x0293, 4)?;
    writer.write_all(&xf_field.to_le_bytes())?;
    // Built-in style id, then outline level (0xFF = none)
    writer.write_all(&[builtin_style_id, 0xFF])?;
    Ok(())
}

/// Write the built-in STYLE records.
///
/// The XF indices assume the fixed layout of the format table:
///
/// - 0..14: style XFs
/// - 15:    default cell XF
/// - 16..20: style XFs for comma / currency / percent styles
///
/// Mapping (xf_index, builtin_style_id):
/// - (0x0010, 3)  => Comma
/// - (0x0011, 6)  => Comma [0 decimals]
/// - (0x0012, 4)  => Currency
/// - (0x0013, 7)  => Currency [0 decimals]
/// - (0x0000, 0)  => Normal
/// - (0x0014, 5)  => Percent
pub fn write_builtin_styles<W: Write>(writer: &mut W) -> XlsResult<()> {
    const MAPPINGS: &[(u16, u8)] = &[
        (0x0010, 3),
        (0x0011, 6),
        (0x0012, 4),
        (0x0013, 7),
        (0x0000, 0),
        (0x0014, 5),
    ];

    for &(xf_index, builtin_id) in MAPPINGS {
        write_style_builtin(writer, xf_index, builtin_id)?;
    }

    Ok(())
}

/// Write USESELFS (Use Natural Language Formulas) record.
///
/// Record type: 0x0160, Length: 2
pub fn write_usesel_fs<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record(writer, 0x0160, &0u16.to_le_bytes())
}

/// Encoded size of a BOUNDSHEET record for `name`, header included.
///
/// Depends only on the name, so offsets can be computed before any
/// record is written.
pub fn boundsheet_size(name: &str) -> usize {
    let n = char_count(name);
    let chars = if is_compressible(name) { n } else { n * 2 };
    4 + 4 + 2 + 2 + chars
}

/// Write BOUNDSHEET8 record (worksheet metadata)
///
/// Record type: 0x0085
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `position` - Absolute stream position of the sheet's BOF record
/// * `visibility` - 0 visible, 1 hidden, 2 very hidden
/// * `name` - Sheet name, encoded as a ShortXLUnicodeString
pub fn write_boundsheet<W: Write>(
    writer: &mut W,
    position: u32,
    visibility: u8,
    name: &str,
) -> XlsResult<()> {
    let mut data = Vec::with_capacity(boundsheet_size(name) - 4);
    data.extend_from_slice(&position.to_le_bytes());
    // hsState, then sheet type (0 = worksheet)
    data.push(visibility & 0x03);
    data.push(0x00);
    push_short_unicode_string(&mut data, name)?;
    write_record(writer, 0x0085, &data)
}
