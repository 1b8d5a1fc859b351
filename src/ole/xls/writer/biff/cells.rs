//! Cell record BIFF8 writers.

use crate::ole::xls::{XlsError, XlsResult};
use std::io::Write;

use super::{write_record, write_record_header};

const RK_INT_MIN: f64 = -((1i64 << 29) as f64);
const RK_INT_MAX: f64 = (1i64 << 29) as f64;

/// BIFF8 stores row indices in 16 bits; columns must be below 256.
#[inline]
fn cell_coords(row: u32, col: u16) -> XlsResult<u16> {
    if col > 0xFF {
        return Err(XlsError::CellCoordinateOutOfRange { row, col });
    }
    u16::try_from(row).map_err(|_| XlsError::CellCoordinateOutOfRange { row, col })
}

fn cell_header(row: u32, col: u16, xf_index: u16, capacity: usize) -> XlsResult<Vec<u8>> {
    let row = cell_coords(row, col)?;
    let mut data = Vec::with_capacity(capacity);
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    data.extend_from_slice(&xf_index.to_le_bytes());
    Ok(data)
}

/// Encode a number in the 30-bit RK form when that is lossless.
///
/// Integers in `[-2^29, 2^29)` use the integer form `(n << 2) | 0x02`.
/// Doubles whose low 34 bits are zero keep their upper 30 bits.
/// Anything else (including NaN payloads that do not fit) returns `None`.
pub fn encode_rk(value: f64) -> Option<u32> {
    let negative_zero = value == 0.0 && value.is_sign_negative();
    if !negative_zero && value.fract() == 0.0 && (RK_INT_MIN..RK_INT_MAX).contains(&value) {
        let n = value as i32;
        return Some(((n << 2) as u32) | 0x02);
    }

    let bits = value.to_bits();
    if bits & 0x0000_0003_FFFF_FFFF == 0 {
        return Some((bits >> 32) as u32);
    }
    None
}

/// Decode an RK value.
///
/// Bit 0 marks a value scaled by 100, bit 1 marks the integer form.
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };
    if rk & 0x01 != 0 { value / 100.0 } else { value }
}

/// Write BLANK record (formatted empty cell)
///
/// Record type: 0x0201
pub fn write_blank<W: Write>(writer: &mut W, row: u32, col: u16, xf_index: u16) -> XlsResult<()> {
    let data = cell_header(row, col, xf_index, 6)?;
    write_record(writer, 0x0201, &data)
}

/// Write NUMBER record (floating point cell)
///
/// Record type: 0x0203
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `row` - Row index (0-based)
/// * `col` - Column index (0-based)
/// * `value` - Cell value (f64)
pub fn write_number<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: f64,
) -> XlsResult<()> {
    let mut data = cell_header(row, col, xf_index, 14)?;
    data.extend_from_slice(&value.to_le_bytes());
    write_record(writer, 0x0203, &data)
}

/// Write RK record (compact number cell)
///
/// Record type: 0x027E
pub fn write_rk<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    rk: u32,
) -> XlsResult<()> {
    let mut data = cell_header(row, col, xf_index, 10)?;
    data.extend_from_slice(&rk.to_le_bytes());
    write_record(writer, 0x027E, &data)
}

/// Write LABELSST record (string cell with reference to SST)
///
/// Record type: 0x00FD
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `row` - Row index (0-based)
/// * `col` - Column index (0-based)
/// * `sst_index` - Index into shared string table
pub fn write_labelsst<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    sst_index: u32,
) -> XlsResult<()> {
    let mut data = cell_header(row, col, xf_index, 10)?;
    data.extend_from_slice(&sst_index.to_le_bytes());
    write_record(writer, 0x00FD, &data)
}

/// Write BOOLERR record (boolean or error cell)
///
/// Record type: 0x0205
///
/// `value` is 0/1 for booleans or the error code when `is_error` is set.
pub fn write_boolerr<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: u8,
    is_error: bool,
) -> XlsResult<()> {
    let mut data = cell_header(row, col, xf_index, 8)?;
    data.push(value);
    data.push(is_error as u8);
    write_record(writer, 0x0205, &data)
}

/// Write FORMULA record
///
/// Record type: 0x0006
///
/// The cached result is stored as an IEEE double. Flags request a
/// recalculation on load so readers never trust the cached value blindly.
pub fn write_formula<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    cached: f64,
    rgce: &[u8],
) -> XlsResult<()> {
    let cce = u16::try_from(rgce.len()).map_err(|_| XlsError::RecordTooLarge {
        opcode: 0x0006,
        len: 22 + rgce.len(),
    })?;
    let mut data = cell_header(row, col, xf_index, 22 + rgce.len())?;
    data.extend_from_slice(&cached.to_le_bytes());
    // fAlwaysCalc | fCalcOnLoad
    data.extend_from_slice(&0x0003u16.to_le_bytes());
    // chn (reserved)
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&cce.to_le_bytes());
    data.extend_from_slice(rgce);
    write_record(writer, 0x0006, &data)
}

/// Write ROW record
///
/// Record type: 0x0208, Length: 16
///
/// `col_span` is `(first column, last column + 1)` of the cells in the row.
/// A `height` in twips marks the row as custom-height.
pub fn write_row<W: Write>(
    writer: &mut W,
    row: u32,
    col_span: (u16, u16),
    height: Option<u16>,
    hidden: bool,
) -> XlsResult<()> {
    let rw = cell_coords(row, 0)?;
    write_record_header(writer, 0x0208, 16)?;
    writer.write_all(&rw.to_le_bytes())?;
    writer.write_all(&col_span.0.to_le_bytes())?;
    writer.write_all(&col_span.1.to_le_bytes())?;
    writer.write_all(&height.unwrap_or(0x00FF).to_le_bytes())?;
    // irwMac, reserved
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;

    let mut grbit = 0x0100u16;
    if hidden {
        grbit |= 0x0020;
    }
    if height.is_some() {
        grbit |= 0x0040;
    }
    writer.write_all(&grbit.to_le_bytes())?;
    writer.write_all(&0x000Fu16.to_le_bytes())?;
    Ok(())
}
