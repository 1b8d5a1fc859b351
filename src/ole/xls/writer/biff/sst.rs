//! Shared String Table (SST) BIFF8 writer.

use super::{CONTINUE, MAX_RECORD_DATA, Record, char_count, encode_string_chars};

/// SST record type
const SST: u16 = 0x00FC;

/// Build the SST record and its CONTINUE records.
///
/// The payload starts with `cstTotal` and `cstUnique`, followed by one
/// XLUnicodeString per entry. Splitting rules:
///
/// - a string header (`cch`, flags) never straddles two records;
/// - character data may straddle records, and every continuation starts
///   with a fresh compression flag byte;
/// - a UTF-16 code unit is never split.
pub fn sst_records(strings: &[String], cst_total: u32) -> Vec<Record> {
    let mut records = Vec::new();
    let mut opcode = SST;
    let mut current: Vec<u8> = Vec::with_capacity(MAX_RECORD_DATA);

    current.extend_from_slice(&cst_total.to_le_bytes());
    current.extend_from_slice(&(strings.len() as u32).to_le_bytes());

    let mut flush = |opcode: &mut u16, current: &mut Vec<u8>| {
        records.push(Record {
            opcode: *opcode,
            payload: std::mem::replace(current, Vec::with_capacity(MAX_RECORD_DATA)),
        });
        *opcode = CONTINUE;
    };

    for s in strings {
        let (flag, chars) = encode_string_chars(s);
        let unit = if flag == 0x01 { 2 } else { 1 };

        if MAX_RECORD_DATA - current.len() < 3 {
            flush(&mut opcode, &mut current);
        }
        current.extend_from_slice(&(char_count(s) as u16).to_le_bytes());
        current.push(flag);

        let mut rest = chars.as_slice();
        loop {
            let space = MAX_RECORD_DATA - current.len();
            let take = rest.len().min(space - space % unit);
            current.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if rest.is_empty() {
                break;
            }
            flush(&mut opcode, &mut current);
            current.push(flag);
        }
    }
    flush(&mut opcode, &mut current);

    log::trace!(
        "SST: {} unique strings, {} total references, {} records",
        strings.len(),
        cst_total,
        records.len()
    );
    records
}
