//! End-to-end tests for workbook serialization
//!
//! Workbooks are closed into complete `.xls` files, the `Workbook` stream is
//! read back through the independent `cfb` reader and its records are
//! walked one by one.

use super::*;
use crate::ole::xls::{XlsError, XlsResult};
use std::io::{Cursor, Read};

/// One BIFF record: (offset in stream, opcode, payload)
type RawRecord = (usize, u16, Vec<u8>);

const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const BOUNDSHEET: u16 = 0x0085;
const WINDOW1: u16 = 0x003D;
const WINDOW2: u16 = 0x023E;
const SST: u16 = 0x00FC;
const CONTINUE: u16 = 0x003C;
const ROW: u16 = 0x0208;
const LABELSST: u16 = 0x00FD;
const RK: u16 = 0x027E;
const NUMBER: u16 = 0x0203;
const FORMULA: u16 = 0x0006;
const BOOLERR: u16 = 0x0205;
const HLINK: u16 = 0x01B8;
const COLINFO: u16 = 0x007D;
const DIMENSIONS: u16 = 0x0200;

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn parse_records(stream: &[u8]) -> Vec<RawRecord> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < stream.len() {
        let opcode = u16_at(stream, pos);
        let len = u16_at(stream, pos + 2) as usize;
        assert!(len <= 8224, "record 0x{opcode:04X} too long");
        out.push((pos, opcode, stream[pos + 4..pos + 4 + len].to_vec()));
        pos += 4 + len;
    }
    assert_eq!(pos, stream.len());
    out
}

/// Read the `Workbook` stream back out of a compound file.
fn workbook_stream(file: &[u8]) -> Vec<u8> {
    let mut cfb = cfb::CompoundFile::open(Cursor::new(file.to_vec())).unwrap();
    let mut stream = cfb.open_stream("/Workbook").unwrap();
    let mut data = Vec::new();
    stream.read_to_end(&mut data).unwrap();
    data
}

fn close(workbook: Workbook) -> Vec<RawRecord> {
    let file = workbook.close().unwrap();
    parse_records(&workbook_stream(&file))
}

/// Records of sheet `n` (0-based), BOF through EOF.
fn sheet_records(records: &[RawRecord], n: usize) -> &[RawRecord] {
    let starts: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, (_, op, p))| *op == BOF && u16_at(p, 2) == 0x0010)
        .map(|(i, _)| i)
        .collect();
    let start = starts[n];
    let end = records[start..]
        .iter()
        .position(|(_, op, _)| *op == EOF)
        .unwrap();
    &records[start..=start + end]
}

fn find<'a>(records: &'a [RawRecord], opcode: u16) -> Vec<&'a [u8]> {
    records
        .iter()
        .filter(|(_, op, _)| *op == opcode)
        .map(|(_, _, p)| p.as_slice())
        .collect()
}

fn simple_workbook() -> XlsResult<Workbook> {
    let mut workbook = Workbook::new();
    let idx = workbook.add_worksheet(None)?;
    let mut ws = workbook.worksheet_mut(idx)?;
    ws.write(0, 0, "Hi Excel!")?;
    ws.write(2, 0, 3)?;
    ws.write(3, 0, 3.00000)?;
    ws.write(4, 0, 3.00001)?;
    ws.write(5, 0, 3.14159)?;
    ws.write(7, 0, "=A3 + A6")?;
    ws.write(8, 0, "=IF(A5>3,\"Yes\", \"No\")")?;
    ws.write(10, 0, "http://www.perl.com/")?;
    Ok(workbook)
}

#[test]
fn test_simple_workbook_records() {
    let records = close(simple_workbook().unwrap());

    // Globals
    assert_eq!(records[0].1, BOF);
    assert_eq!(u16_at(&records[0].2, 2), 0x0005);

    let sst = find(&records, SST);
    assert_eq!(sst.len(), 1);
    assert_eq!(u32_at(sst[0], 0), 2, "cstTotal");
    assert_eq!(u32_at(sst[0], 4), 2, "cstUnique");
    assert_eq!(u16_at(sst[0], 8), 9);
    assert_eq!(sst[0][10], 0x00);
    assert_eq!(&sst[0][11..20], b"Hi Excel!");

    let sheet = sheet_records(&records, 0);
    let labels = find(sheet, LABELSST);
    assert_eq!(labels.len(), 2);
    assert_eq!(u32_at(labels[0], 6), 0);
    assert_eq!(u32_at(labels[1], 6), 1);
    // Hyperlink cell uses the interned hyperlink format
    assert_eq!(u16_at(labels[1], 4), 21);

    let rks = find(sheet, RK);
    assert_eq!(rks.len(), 2);
    for rk in &rks {
        assert_eq!(biff::decode_rk(u32_at(rk, 6)), 3.0);
    }

    let numbers = find(sheet, NUMBER);
    let values: Vec<f64> = numbers
        .iter()
        .map(|p| f64::from_le_bytes(p[6..14].try_into().unwrap()))
        .collect();
    assert_eq!(values, [3.00001, 3.14159]);

    let formulas = find(sheet, FORMULA);
    assert_eq!(formulas.len(), 2);
    assert_eq!(u16_at(formulas[0], 0), 7);
    assert_eq!(u16_at(formulas[0], 14), 0x0003);
    assert_eq!(u16_at(formulas[0], 20), 11);
    assert_eq!(
        &formulas[0][22..],
        &[0x44, 0x02, 0x00, 0x00, 0xC0, 0x44, 0x05, 0x00, 0x00, 0xC0, 0x03]
    );

    let links = find(sheet, HLINK);
    assert_eq!(links.len(), 1);
    assert_eq!(u16_at(links[0], 0), 10);
    let url: Vec<u16> = "http://www.perl.com/\0".encode_utf16().collect();
    let tail: Vec<u16> = links[0][links[0].len() - url.len() * 2..]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    assert_eq!(tail, url);

    assert_eq!(sheet.last().unwrap().1, EOF);
}

#[test]
fn test_rows_serialized_in_order() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        ws.write(5, 0, 2).unwrap();
        ws.write(0, 3, 1).unwrap();
        ws.write(0, 1, 0).unwrap();
    }
    let records = close(workbook);
    let sheet = sheet_records(&records, 0);

    let sequence: Vec<(u16, u16, u16)> = sheet
        .iter()
        .filter(|(_, op, _)| matches!(*op, ROW | RK))
        .map(|(_, op, p)| (*op, u16_at(p, 0), u16_at(p, 2)))
        .collect();
    assert_eq!(
        sequence,
        [(ROW, 0, 1), (RK, 0, 1), (RK, 0, 3), (ROW, 5, 0), (RK, 5, 0)]
    );

    let rows = find(sheet, ROW);
    // First row spans columns 1..4
    assert_eq!((u16_at(rows[0], 2), u16_at(rows[0], 4)), (1, 4));

    let dims = find(sheet, DIMENSIONS)[0];
    assert_eq!((u32_at(dims, 0), u32_at(dims, 4)), (0, 6));
    assert_eq!((u16_at(dims, 8), u16_at(dims, 10)), (1, 4));
}

#[test]
fn test_empty_sheet_dimensions_and_override_rows() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        ws.set_row(4, 30.0).unwrap();
        ws.set_row_hidden(9, true).unwrap();
        ws.set_column(0, 3, 20.0).unwrap();
    }
    let records = close(workbook);
    let sheet = sheet_records(&records, 0);

    let dims = find(sheet, DIMENSIONS)[0];
    assert!(dims.iter().all(|&b| b == 0));

    let rows = find(sheet, ROW);
    assert_eq!(rows.len(), 2);
    assert_eq!(u16_at(rows[0], 0), 4);
    assert_eq!(u16_at(rows[0], 6), 600);
    assert_eq!(u16_at(rows[0], 12), 0x0100 | 0x0040);
    assert_eq!(u16_at(rows[1], 0), 9);
    assert_eq!(u16_at(rows[1], 6), 0x00FF);
    assert_eq!(u16_at(rows[1], 12), 0x0100 | 0x0020);

    // COLINFO precedes DIMENSIONS
    let colinfo_pos = sheet.iter().position(|r| r.1 == COLINFO).unwrap();
    let dims_pos = sheet.iter().position(|r| r.1 == DIMENSIONS).unwrap();
    assert!(colinfo_pos < dims_pos);
    let colinfo = find(sheet, COLINFO)[0];
    assert_eq!((u16_at(colinfo, 0), u16_at(colinfo, 2)), (0, 3));
    assert_eq!(u16_at(colinfo, 4), 20 * 256);
}

#[test]
fn test_boundsheet_offsets_point_at_bof() {
    let mut workbook = Workbook::new();
    for name in ["North", "South", "East", "West"] {
        let idx = workbook.add_worksheet(Some(name)).unwrap();
        workbook
            .worksheet_mut(idx)
            .unwrap()
            .write(0, 0, "Sales")
            .unwrap();
    }
    let file = workbook.close().unwrap();
    let stream = workbook_stream(&file);
    let records = parse_records(&stream);

    let sheets = find(&records, BOUNDSHEET);
    assert_eq!(sheets.len(), 4);
    for (payload, name) in sheets.iter().zip(["North", "South", "East", "West"]) {
        let offset = u32_at(payload, 0) as usize;
        assert_eq!(u16_at(&stream, offset), BOF);
        assert_eq!(u16_at(&stream, offset + 6), 0x0010);
        assert_eq!(payload[6] as usize, name.len());
        assert_eq!(&payload[8..], name.as_bytes());
    }

    // SST sits between the BOUNDSHEETs and the first worksheet
    let sst_offset = records.iter().find(|r| r.1 == SST).unwrap().0;
    let last_boundsheet = records.iter().rfind(|r| r.1 == BOUNDSHEET).unwrap().0;
    assert!(last_boundsheet < sst_offset);
    assert!(sst_offset < u32_at(sheets[0], 0) as usize);
    // One string shared by four cells
    assert_eq!(u32_at(find(&records, SST)[0], 0), 4);
    assert_eq!(u32_at(find(&records, SST)[0], 4), 1);
}

#[test]
fn test_hidden_and_very_hidden_flags() {
    let mut workbook = Workbook::new();
    for _ in 0..3 {
        workbook.add_worksheet(None).unwrap();
    }
    workbook.worksheet_mut(1).unwrap().hide();
    workbook.worksheet_mut(2).unwrap().very_hide();

    let records = close(workbook);
    let states: Vec<u8> = find(&records, BOUNDSHEET).iter().map(|p| p[4]).collect();
    assert_eq!(states, [0, 1, 2]);
}

#[test]
fn test_active_sheet_bits() {
    let mut workbook = Workbook::new();
    for _ in 0..3 {
        workbook.add_worksheet(None).unwrap();
    }
    workbook.worksheet_mut(1).unwrap().activate();

    let records = close(workbook);
    let window1 = find(&records, WINDOW1)[0];
    assert_eq!(u16_at(window1, 10), 1, "itabCur");
    assert_eq!(u16_at(window1, 12), 0, "itabFirst");
    assert_eq!(u16_at(window1, 14), 1, "ctabSel");

    for n in 0..3 {
        let grbit = u16_at(find(sheet_records(&records, n), WINDOW2)[0], 0);
        if n == 1 {
            assert_eq!(grbit & 0x0600, 0x0600);
        } else {
            assert_eq!(grbit & 0x0600, 0);
        }
    }
}

#[test]
fn test_hidden_first_sheet_moves_first_tab() {
    let mut workbook = Workbook::new();
    for _ in 0..3 {
        workbook.add_worksheet(None).unwrap();
    }
    workbook.worksheet_mut(2).unwrap().activate();
    workbook.worksheet_mut(0).unwrap().hide();

    let records = close(workbook);
    let window1 = find(&records, WINDOW1)[0];
    assert_eq!(u16_at(window1, 10), 2);
    assert_eq!(u16_at(window1, 12), 2);
}

#[test]
fn test_hiding_active_sheet_reactivates_first() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    workbook.add_worksheet(None).unwrap();
    workbook.worksheet_mut(1).unwrap().activate();
    workbook.worksheet_mut(1).unwrap().hide();
    assert_eq!(workbook.active_sheet(), 0);

    let records = close(workbook);
    assert_eq!(u16_at(find(&records, WINDOW1)[0], 10), 0);
}

#[test]
fn test_default_sheet_names_in_boundsheets() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    workbook.add_worksheet(Some("Data")).unwrap();
    workbook.add_worksheet(None).unwrap();

    let records = close(workbook);
    let names: Vec<String> = find(&records, BOUNDSHEET)
        .iter()
        .map(|p| String::from_utf8(p[8..].to_vec()).unwrap())
        .collect();
    assert_eq!(names, ["Sheet1", "Data", "Sheet3"]);
}

#[test]
fn test_unicode_sheet_name() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(Some("Données€")).unwrap();
    let records = close(workbook);
    let sheet = find(&records, BOUNDSHEET)[0];
    assert_eq!(sheet[6], 8);
    assert_eq!(sheet[7], 0x01);
    assert_eq!(sheet.len(), 8 + 16);
}

#[test]
fn test_compact_numbers_disabled() {
    let mut workbook = Workbook::with_options(WorkbookOptions::new().with_compact_numbers(false));
    workbook.add_worksheet(None).unwrap();
    workbook.worksheet_mut(0).unwrap().write(0, 0, 3).unwrap();

    let records = close(workbook);
    let sheet = sheet_records(&records, 0);
    assert!(find(sheet, RK).is_empty());
    assert_eq!(find(sheet, NUMBER).len(), 1);
}

#[test]
fn test_booleans_errors_and_blanks() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        ws.write_boolean(0, 0, true).unwrap();
        ws.write_error(0, 1, CellError::Div0).unwrap();
        ws.write_with_format(0, 2, "", &Format::new().set_bold())
            .unwrap();
    }
    let records = close(workbook);
    let sheet = sheet_records(&records, 0);

    let boolerr = find(sheet, BOOLERR);
    assert_eq!(&boolerr[0][6..8], &[1, 0]);
    assert_eq!(&boolerr[1][6..8], &[0x07, 1]);
    let blank = find(sheet, 0x0201);
    assert_eq!(u16_at(blank[0], 4), 21);
}

#[test]
fn test_formula_cached_value() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    workbook
        .worksheet_mut(0)
        .unwrap()
        .write_formula_with_value(0, 0, "=1+1", 2.0)
        .unwrap();
    let records = close(workbook);
    let formula = find(sheet_records(&records, 0), FORMULA)[0];
    assert_eq!(f64::from_le_bytes(formula[6..14].try_into().unwrap()), 2.0);
}

#[test]
fn test_invalid_formula_reports_cell() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(Some("Calc")).unwrap();
    workbook
        .worksheet_mut(0)
        .unwrap()
        .write(3, 2, "=NOSUCH(1)")
        .unwrap();
    match workbook.close() {
        Err(XlsError::InvalidFormula { sheet, row, col, .. }) => {
            assert_eq!((sheet.as_str(), row, col), ("Calc", 3, 2));
        },
        other => panic!("unexpected result: {other:?}"),
    }
}

struct FixedEncoder;

impl FormulaEncoder for FixedEncoder {
    fn encode(&self, _formula: &str) -> Result<Vec<u8>, String> {
        Ok(vec![0x1E, 0x2A, 0x00])
    }
}

#[test]
fn test_custom_formula_encoder() {
    let mut workbook = Workbook::new();
    workbook.set_formula_encoder(Box::new(FixedEncoder));
    workbook.add_worksheet(None).unwrap();
    workbook
        .worksheet_mut(0)
        .unwrap()
        .write(0, 0, "=anything at all")
        .unwrap();
    let records = close(workbook);
    let formula = find(sheet_records(&records, 0), FORMULA)[0];
    assert_eq!(&formula[22..], &[0x1E, 0x2A, 0x00]);
}

#[test]
fn test_overwritten_strings_not_counted() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        ws.write(0, 0, "first").unwrap();
        ws.write(0, 0, "second").unwrap();
        ws.write(1, 0, 5).unwrap();
    }
    let records = close(workbook);
    let sst = find(&records, SST)[0];
    assert_eq!(u32_at(sst, 0), 1, "cstTotal counts live cells only");
    assert_eq!(u32_at(sst, 4), 2, "cstUnique keeps interned strings");
}

#[test]
fn test_large_sst_continues() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        for row in 0..2000u32 {
            ws.write_string(row, 0, &format!("string number {row:05}"))
                .unwrap();
        }
    }
    let records = close(workbook);
    let sst_pos = records.iter().position(|r| r.1 == SST).unwrap();
    assert_eq!(records[sst_pos + 1].1, CONTINUE);
    assert_eq!(u32_at(&records[sst_pos].2, 4), 2000);
    // The global EOF follows the last CONTINUE
    let after = records[sst_pos + 1..]
        .iter()
        .find(|r| r.1 != CONTINUE)
        .unwrap();
    assert_eq!(after.1, EOF);
}

#[test]
fn test_format_records_present() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    let heading = Format::new().set_bold().set_color(Color::Blue);
    let money = Format::new().set_num_format("#,##0.000");
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        ws.write_with_format(0, 0, "Sales", &heading).unwrap();
        ws.write_with_format(1, 0, 1234.567, &money).unwrap();
        ws.write_with_format(2, 0, "More", &heading).unwrap();
    }
    let records = close(workbook);

    assert_eq!(find(&records, 0x0031).len(), 5);
    assert_eq!(find(&records, 0x041E).len(), 9);
    assert_eq!(find(&records, 0x00E0).len(), 23);

    let sheet = sheet_records(&records, 0);
    let labels = find(sheet, LABELSST);
    assert_eq!(u16_at(labels[0], 4), 21);
    assert_eq!(u16_at(labels[1], 4), 21);
    assert_eq!(u16_at(find(sheet, NUMBER)[0], 4), 22);
}

#[test]
fn test_serializer_freezes_tables() {
    let mut strings = SharedStringTable::new();
    let mut formats = FormatTable::new();
    let sheets = vec![Worksheet::new("Only".to_string())];
    let options = WorkbookOptions::default();
    let encoder = Biff8FormulaEncoder::new();

    WorkbookSerializer {
        sheets: &sheets,
        strings: &mut strings,
        formats: &mut formats,
        encoder: &encoder,
        options: &options,
        active_sheet: 0,
    }
    .serialize()
    .unwrap();

    assert_eq!(strings.state(), TableState::Frozen);
    assert!(matches!(
        formats.add(&Format::new().set_italic()),
        Err(XlsError::TableFrozen(_))
    ));
}

#[test]
fn test_container_layout() {
    let file = simple_workbook().unwrap().close().unwrap();
    assert_eq!(&file[..8], b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1");
    assert_eq!(file.len() % 512, 0);

    // Root entry CLSID in the first directory sector
    let dir_start = u32_at(&file, 48) as usize;
    let root = (dir_start + 1) * 512;
    assert_eq!(&file[root + 80..root + 96], &EXCEL_CLSID);

    let cfb = cfb::CompoundFile::open(Cursor::new(file)).unwrap();
    let names: Vec<String> = cfb
        .read_root_storage()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, ["Workbook"]);
}

#[test]
fn test_deterministic_output() {
    let a = simple_workbook().unwrap().close().unwrap();
    let b = simple_workbook().unwrap().close().unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_save_and_write_to() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simple.xls");
    simple_workbook().unwrap().save(&path).unwrap();
    let saved = std::fs::read(&path).unwrap();

    let mut written = Vec::new();
    simple_workbook().unwrap().write_to(&mut written).unwrap();
    assert_eq!(saved, written);
}

#[test]
fn test_failed_save_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xls");
    assert!(Workbook::new().save(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_v4_container() {
    let options = WorkbookOptions::new()
        .with_container(crate::ole::CompoundFileOptions::new().with_sector_size(4096));
    let mut workbook = Workbook::with_options(options);
    workbook.add_worksheet(None).unwrap();
    workbook.worksheet_mut(0).unwrap().write(0, 0, 1).unwrap();
    let file = workbook.close().unwrap();
    assert_eq!(file.len() % 4096, 0);
    assert_eq!(parse_records(&workbook_stream(&file))[0].1, BOF);
}

struct BloatedEncoder;

impl FormulaEncoder for BloatedEncoder {
    fn encode(&self, _formula: &str) -> Result<Vec<u8>, String> {
        Ok(vec![0x1E, 0x01, 0x00].repeat(3000))
    }
}

#[test]
fn test_oversized_token_array_is_invalid_formula() {
    let mut workbook = Workbook::new();
    workbook.set_formula_encoder(Box::new(BloatedEncoder));
    workbook.add_worksheet(None).unwrap();
    workbook
        .worksheet_mut(0)
        .unwrap()
        .write(2, 1, "=1")
        .unwrap();
    match workbook.close() {
        Err(XlsError::InvalidFormula { row, col, .. }) => assert_eq!((row, col), (2, 1)),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_long_url_rejected_before_close() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        let target = format!("http://{}", "x".repeat(4112));
        assert!(matches!(
            ws.write(0, 0, target.as_str()),
            Err(XlsError::UrlTooLong(4119))
        ));
        ws.write(1, 0, "http://example.com/").unwrap();
    }
    let records = close(workbook);
    assert_eq!(find(sheet_records(&records, 0), HLINK).len(), 1);
}

#[test]
fn test_font_records_match_names() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet(None).unwrap();
    {
        let mut ws = workbook.worksheet_mut(0).unwrap();
        let too_long = Format::new().set_font(&"F".repeat(300));
        assert!(matches!(
            ws.write_with_format(0, 0, "x", &too_long),
            Err(XlsError::InvalidFontName(_))
        ));
        let serif = Format::new().set_font("Times New Roman");
        ws.write_with_format(0, 0, "x", &serif).unwrap();
    }
    let records = close(workbook);
    let fonts = find(&records, 0x0031);
    assert_eq!(fonts.len(), 5);
    for font in fonts {
        // cch, flags, then exactly cch compressed characters
        let cch = font[14] as usize;
        assert_eq!(font.len(), 16 + cch);
    }
}
