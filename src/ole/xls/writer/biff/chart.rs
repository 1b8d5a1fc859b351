//! Chart substream BIFF8 record writers.

use crate::ole::xls::XlsResult;
use std::io::Write;

use super::{write_record, write_record_header};

/// Write CHARTFORMAT record (chart group header)
///
/// Record type: 0x1014, Length: 20
///
/// `order` is the drawing order of the group within the chart.
pub fn write_chartformat<W: Write>(writer: &mut W, order: u16) -> XlsResult<()> {
    let mut data = [0u8; 20];
    // 16 reserved bytes, grbit (fVaried = 0), icrt
    data[18..20].copy_from_slice(&order.to_le_bytes());
    write_record(writer, 0x1014, &data)
}

/// Write BEGIN record
///
/// Record type: 0x1033
pub fn write_begin<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x1033, 0)
}

/// Write END record
///
/// Record type: 0x1034
pub fn write_end<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x1034, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chartformat() {
        let mut buf = Vec::new();
        write_chartformat(&mut buf, 2).unwrap();
        assert_eq!(&buf[0..4], &[0x14, 0x10, 20, 0]);
        assert!(buf[4..22].iter().all(|&b| b == 0));
        assert_eq!(&buf[22..24], &[2, 0]);
    }

    #[test]
    fn test_begin_end() {
        let mut buf = Vec::new();
        write_begin(&mut buf).unwrap();
        write_end(&mut buf).unwrap();
        assert_eq!(buf, vec![0x33, 0x10, 0, 0, 0x34, 0x10, 0, 0]);
    }
}
