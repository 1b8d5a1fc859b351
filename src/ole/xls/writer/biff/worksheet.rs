//! Worksheet-level BIFF8 record writers.

use crate::ole::xls::XlsResult;
use std::io::Write;

use super::{write_record, write_record_header};

/// StdLink CLSID followed by stream version 2
const HLINK_STDLINK: [u8; 20] = [
    0xD0, 0xC9, 0xEA, 0x79, 0xF9, 0xBA, 0xCE, 0x11, 0x8C, 0x82, 0x00, 0xAA, 0x00, 0x4B, 0xA9,
    0x0B, 0x02, 0x00, 0x00, 0x00,
];

/// URL moniker CLSID
const HLINK_URL_MONIKER: [u8; 16] = [
    0xE0, 0xC9, 0xEA, 0x79, 0xF9, 0xBA, 0xCE, 0x11, 0x8C, 0x82, 0x00, 0xAA, 0x00, 0x4B, 0xA9,
    0x0B,
];

/// Write WSBOOL record (Additional Workspace Information)
///
/// Record type: 0x0081, Length: 2
/// Writes default flags indicating a normal worksheet (not dialog sheet).
pub fn write_wsbool<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x0081, 2)?;
    // fShowAutoBreaks | fRowSumsBelow | fColSumsRight | fDspGuts
    writer.write_all(&0x04C1u16.to_le_bytes())?;
    Ok(())
}

/// Write COLINFO record for the inclusive column range `first..=last`.
///
/// Record type: 0x007D, Length: 12
///
/// `width` is in 1/256 of a character.
pub fn write_colinfo<W: Write>(
    writer: &mut W,
    first: u16,
    last: u16,
    width: u16,
    xf_index: u16,
    hidden: bool,
) -> XlsResult<()> {
    write_record_header(writer, 0x007D, 12)?;
    writer.write_all(&first.to_le_bytes())?;
    writer.write_all(&last.to_le_bytes())?;
    writer.write_all(&width.to_le_bytes())?;
    writer.write_all(&xf_index.to_le_bytes())?;
    writer.write_all(&u16::from(hidden).to_le_bytes())?;
    // Reserved
    writer.write_all(&0u16.to_le_bytes())?;
    Ok(())
}

/// Write DIMENSIONS record (worksheet dimensions)
///
/// Record type: 0x0200
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `first_row` - First used row
/// * `last_row` - Last used row + 1
/// * `first_col` - First used column
/// * `last_col` - Last used column + 1
pub fn write_dimensions<W: Write>(
    writer: &mut W,
    first_row: u32,
    last_row: u32,
    first_col: u16,
    last_col: u16,
) -> XlsResult<()> {
    write_record_header(writer, 0x0200, 14)?;

    writer.write_all(&first_row.to_le_bytes())?;
    writer.write_all(&last_row.to_le_bytes())?;
    writer.write_all(&first_col.to_le_bytes())?;
    writer.write_all(&last_col.to_le_bytes())?;

    // Reserved (must be 0)
    writer.write_all(&0u16.to_le_bytes())?;

    Ok(())
}

/// Write WINDOW2 record (Worksheet view settings)
///
/// Record type: 0x023E, Length: 18
///
/// The active sheet is both selected (0x0200) and displayed (0x0400).
pub fn write_window2<W: Write>(writer: &mut W, active: bool) -> XlsResult<()> {
    write_record_header(writer, 0x023E, 18)?;

    // Gridlines, headings, zeros, default header colour, outline symbols
    let mut grbit = 0x00B6u16;
    if active {
        grbit |= 0x0200 | 0x0400;
    }
    writer.write_all(&grbit.to_le_bytes())?;

    // rwTop, colLeft
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;

    // icvHdr (header colour), reserved
    writer.write_all(&0x0040u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;

    // wScaleSLV, wScaleNormal, unused, reserved
    writer.write_all(&[0u8; 8])?;

    Ok(())
}

/// Write SELECTION record
///
/// Record type: 0x001D, Length: 15
///
/// `range` is `(first_row, first_col, last_row, last_col)`.
pub fn write_selection<W: Write>(
    writer: &mut W,
    active: (u16, u16),
    range: (u16, u16, u16, u16),
) -> XlsResult<()> {
    let (r1, c1, r2, c2) = range;
    let mut data = Vec::with_capacity(15);
    // Pane 3 (the only pane when unsplit)
    data.push(3);
    data.extend_from_slice(&active.0.to_le_bytes());
    data.extend_from_slice(&active.1.to_le_bytes());
    // irefAct, cref
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&r1.to_le_bytes());
    data.extend_from_slice(&r2.to_le_bytes());
    data.push(c1 as u8);
    data.push(c2 as u8);
    write_record(writer, 0x001D, &data)
}

/// Write HLINK record for a URL hyperlink on one cell.
///
/// Record type: 0x01B8
pub fn write_hlink<W: Write>(writer: &mut W, row: u16, col: u16, url: &str) -> XlsResult<()> {
    let mut url_bytes: Vec<u8> = url.encode_utf16().flat_map(u16::to_le_bytes).collect();
    url_bytes.extend_from_slice(&[0, 0]);

    let mut data = Vec::with_capacity(8 + 20 + 4 + 16 + 4 + url_bytes.len());
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    data.extend_from_slice(&HLINK_STDLINK);
    // hlstmfHasMoniker | hlstmfIsAbsolute
    data.extend_from_slice(&0x0000_0003u32.to_le_bytes());
    data.extend_from_slice(&HLINK_URL_MONIKER);
    data.extend_from_slice(&(url_bytes.len() as u32).to_le_bytes());
    data.extend_from_slice(&url_bytes);
    write_record(writer, 0x01B8, &data)
}
