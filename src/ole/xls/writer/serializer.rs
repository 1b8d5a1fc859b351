//! Two-pass BIFF8 workbook stream assembly
//!
//! Pass 1 validates the model, freezes the string and format tables and
//! serializes every worksheet into its own buffer. Those lengths, together
//! with the workbook globals (whose size never depends on sheet offsets),
//! give the absolute position of each sheet's BOF. Pass 2 concatenates:
//!
//! ```text
//! [globals prefix] [BOUNDSHEET * n] [SST, CONTINUE *, EOF] [sheet 0] .. [sheet n-1]
//! ```

use super::super::{XlsError, XlsResult};
use super::biff::{
    BOF_WORKBOOK_GLOBALS, BOF_WORKSHEET, MAX_FORMULA_TOKENS, boundsheet_size, encode_rk,
    sst_records, write_blank, write_bof, write_boolerr, write_boundsheet, write_builtin_styles,
    write_codepage, write_colinfo, write_date1904, write_dimensions, write_eof, write_formula,
    write_hlink, write_labelsst, write_number, write_rk, write_row, write_selection,
    write_usesel_fs, write_window1, write_window2, write_wsbool,
};
use super::formatting::FormatTable;
use super::formula::FormulaEncoder;
use super::options::WorkbookOptions;
use super::shared_strings::SharedStringTable;
use super::worksheet::{CellValue, MAX_COLS, MAX_ROWS, Visibility, Worksheet};
use crate::ole::OleError;
use std::collections::BTreeSet;

/// UTF-16LE code page declared in CODEPAGE
const CODEPAGE_UTF16: u16 = 0x04B0;

/// Read-only inputs shared by every worksheet serialization.
pub struct SheetContext<'a> {
    pub formats: &'a FormatTable,
    pub encoder: &'a dyn FormulaEncoder,
    pub options: &'a WorkbookOptions,
    /// Whether this sheet is the active (selected and displayed) one
    pub active: bool,
}

/// Column width in characters to COLINFO units (1/256 character).
fn column_width_units(width: f64) -> u16 {
    (width * 256.0).round().clamp(0.0, u16::MAX as f64) as u16
}

/// Row height in points to twips.
fn row_height_twips(points: f64) -> u16 {
    (points * 20.0).round().clamp(0.0, 0x7FFF as f64) as u16
}

/// Serialize one worksheet substream, BOF through EOF.
pub fn serialize_worksheet(sheet: &Worksheet, ctx: &SheetContext<'_>) -> XlsResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(256 + sheet.cells.len() * 16);
    let formats = ctx.formats;

    write_bof(&mut buf, BOF_WORKSHEET)?;
    write_wsbool(&mut buf)?;

    for (first, last, info) in sheet.column_runs() {
        write_colinfo(
            &mut buf,
            first,
            last,
            column_width_units(info.width),
            formats.xf_index(info.format),
            info.hidden,
        )?;
    }

    match sheet.cells.bounds() {
        Some((r1, r2, c1, c2)) => write_dimensions(&mut buf, r1, r2 + 1, c1, c2 + 1)?,
        None => write_dimensions(&mut buf, 0, 0, 0, 0)?,
    }

    let rows: BTreeSet<u32> = sheet
        .cells
        .iter()
        .map(|(r, _, _)| r)
        .chain(sheet.rows.keys().copied())
        .collect();

    for row in rows {
        let span = {
            let mut cols = sheet.cells.row(row).map(|(c, _)| c);
            match cols.next() {
                Some(first) => (first, cols.last().unwrap_or(first) + 1),
                None => (0, 0),
            }
        };
        let info = sheet.rows.get(&row).copied().unwrap_or_default();
        write_row(
            &mut buf,
            row,
            span,
            info.height.map(row_height_twips),
            info.hidden,
        )?;

        for (col, cell) in sheet.cells.row(row) {
            let xf = formats.xf_index(cell.format);
            match &cell.value {
                CellValue::Blank => write_blank(&mut buf, row, col, xf)?,
                CellValue::Number(n) => {
                    match encode_rk(*n).filter(|_| ctx.options.compact_numbers) {
                        Some(rk) => write_rk(&mut buf, row, col, xf, rk)?,
                        None => write_number(&mut buf, row, col, xf, *n)?,
                    }
                },
                CellValue::StringRef(idx) => write_labelsst(&mut buf, row, col, xf, *idx)?,
                CellValue::Boolean(b) => write_boolerr(&mut buf, row, col, xf, *b as u8, false)?,
                CellValue::Error(e) => write_boolerr(&mut buf, row, col, xf, e.code(), true)?,
                CellValue::Formula { text, cached } => {
                    let rgce = ctx
                        .encoder
                        .encode(text)
                        .and_then(|rgce| {
                            if rgce.len() > MAX_FORMULA_TOKENS {
                                Err(format!(
                                    "{} token bytes exceed the {MAX_FORMULA_TOKENS} a record holds",
                                    rgce.len()
                                ))
                            } else {
                                Ok(rgce)
                            }
                        })
                        .map_err(|reason| XlsError::InvalidFormula {
                            sheet: sheet.name.clone(),
                            row,
                            col,
                            reason,
                        })?;
                    write_formula(&mut buf, row, col, xf, *cached, &rgce)?;
                },
            }
        }
    }

    write_window2(&mut buf, ctx.active)?;
    let sel = sheet.selection;
    write_selection(&mut buf, sel.active, sel.range)?;

    for (&(row, col), url) in &sheet.hyperlinks {
        write_hlink(&mut buf, row as u16, col, url)?;
    }

    write_eof(&mut buf)?;
    Ok(buf)
}

/// Drives both passes over a workbook model.
pub struct WorkbookSerializer<'a> {
    pub sheets: &'a [Worksheet],
    pub strings: &'a mut SharedStringTable,
    pub formats: &'a mut FormatTable,
    pub encoder: &'a dyn FormulaEncoder,
    pub options: &'a WorkbookOptions,
    pub active_sheet: usize,
}

impl WorkbookSerializer<'_> {
    /// Check every workbook-level invariant before any byte is produced.
    pub fn validate(&self) -> XlsResult<()> {
        if self.sheets.is_empty() {
            return Err(XlsError::NoWorksheets);
        }

        for (i, sheet) in self.sheets.iter().enumerate() {
            if self.sheets[..i]
                .iter()
                .any(|other| other.name.to_lowercase() == sheet.name.to_lowercase())
            {
                return Err(XlsError::DuplicateSheetName(sheet.name.clone()));
            }
            if let Some((_, last_row, _, last_col)) = sheet.cells.bounds()
                && (last_row >= MAX_ROWS || last_col >= MAX_COLS)
            {
                return Err(XlsError::CellCoordinateOutOfRange {
                    row: last_row,
                    col: last_col,
                });
            }
        }

        let active = self
            .sheets
            .get(self.active_sheet)
            .ok_or(XlsError::SheetNotFound(self.active_sheet))?;
        if active.visibility != Visibility::Visible {
            return Err(XlsError::HiddenActiveSheet(active.name.clone()));
        }
        Ok(())
    }

    /// Run both passes and return the complete `Workbook` stream.
    pub fn serialize(mut self) -> XlsResult<Vec<u8>> {
        // Pass 1: sizing
        self.validate()?;

        let cst_total: usize = self
            .sheets
            .iter()
            .map(|s| s.cells.string_ref_count())
            .sum();
        self.formats.freeze();
        let strings = self.strings.finalize();

        let mut sheet_buffers = Vec::with_capacity(self.sheets.len());
        for (idx, sheet) in self.sheets.iter().enumerate() {
            let ctx = SheetContext {
                formats: &*self.formats,
                encoder: self.encoder,
                options: self.options,
                active: idx == self.active_sheet,
            };
            let buf = serialize_worksheet(sheet, &ctx)?;
            log::debug!(
                "serialized worksheet '{}': {} cells, {} bytes",
                sheet.name,
                sheet.cells.len(),
                buf.len()
            );
            sheet_buffers.push(buf);
        }

        let first_tab = if self.sheets[0].visibility == Visibility::Visible {
            0
        } else {
            self.active_sheet as u16
        };

        let mut prefix = Vec::with_capacity(2048);
        write_bof(&mut prefix, BOF_WORKBOOK_GLOBALS)?;
        write_codepage(&mut prefix, CODEPAGE_UTF16)?;
        write_window1(&mut prefix, self.active_sheet as u16, first_tab)?;
        write_date1904(&mut prefix, self.options.date_1904)?;
        self.formats.write_fonts(&mut prefix)?;
        self.formats.write_number_formats(&mut prefix)?;
        self.formats.write_xfs(&mut prefix)?;
        write_builtin_styles(&mut prefix)?;
        write_usesel_fs(&mut prefix)?;

        let mut suffix = Vec::new();
        let sst = sst_records(strings, cst_total as u32);
        for record in &sst {
            record.write_to(&mut suffix)?;
        }
        write_eof(&mut suffix)?;
        log::debug!(
            "shared string table: {} unique, {} total, {} records, {} bytes",
            strings.len(),
            cst_total,
            sst.len(),
            suffix.len() - 4
        );

        let boundsheets_len: usize = self.sheets.iter().map(|s| boundsheet_size(&s.name)).sum();
        let mut offsets = Vec::with_capacity(self.sheets.len());
        let mut position = prefix.len() + boundsheets_len + suffix.len();
        for buf in &sheet_buffers {
            let offset = u32::try_from(position).map_err(|_| OleError::StreamTooLarge {
                name: "Workbook".to_string(),
                size: position as u64,
            })?;
            offsets.push(offset);
            position += buf.len();
        }

        // Pass 2: assembly
        let mut stream = Vec::with_capacity(position);
        stream.extend_from_slice(&prefix);
        for (sheet, &offset) in self.sheets.iter().zip(&offsets) {
            write_boundsheet(&mut stream, offset, sheet.visibility.code(), &sheet.name)?;
        }
        stream.extend_from_slice(&suffix);
        for (buf, &offset) in sheet_buffers.iter().zip(&offsets) {
            debug_assert_eq!(stream.len(), offset as usize);
            stream.extend_from_slice(buf);
        }
        debug_assert_eq!(stream.len(), position);

        log::debug!(
            "assembled workbook stream: {} sheets, {} bytes",
            self.sheets.len(),
            stream.len()
        );
        Ok(stream)
    }
}
