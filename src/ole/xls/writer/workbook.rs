//! Workbook object model and the `.xls` output entry points.

use super::super::{XlsError, XlsResult};
use super::formatting::{Format, FormatId, FormatTable};
use super::formula::{Biff8FormulaEncoder, FormulaEncoder};
use super::options::WorkbookOptions;
use super::serializer::WorkbookSerializer;
use super::shared_strings::SharedStringTable;
use super::worksheet::{Worksheet, WorksheetMut};
use crate::ole::OleWriter;
use std::io::Write;
use std::path::Path;

/// Most worksheets a workbook can hold (width of the BIFF8 tab index)
pub const MAX_WORKSHEETS: usize = 65_535;

/// Longest sheet name, in UTF-16 units
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel rejects in sheet names
const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Name of the stream holding the BIFF8 records
pub const WORKBOOK_STREAM: &str = "Workbook";

/// CLSID `{00020820-0000-0000-C000-000000000046}` (Excel 97-2003 workbook)
pub const EXCEL_CLSID: [u8; 16] = [
    0x20, 0x08, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46,
];

/// An Excel 97-2003 workbook under construction.
///
/// The model is mutated freely; [`close`](Self::close), [`write_to`](Self::write_to)
/// and [`save`](Self::save) consume it and run the serialization once.
///
/// # Example
///
/// ```rust
/// use longan::ole::xls::{Format, Workbook};
///
/// let mut workbook = Workbook::new();
/// let sheet = workbook.add_worksheet(None)?;
/// let bold = Format::new().set_bold();
///
/// let mut ws = workbook.worksheet_mut(sheet)?;
/// ws.write_with_format(0, 0, "Total", &bold)?;
/// ws.write(0, 1, 42)?;
/// ws.write(1, 1, "=B1*2")?;
///
/// let bytes = workbook.close()?;
/// assert_eq!(&bytes[..4], &[0xD0, 0xCF, 0x11, 0xE0]);
/// # Ok::<(), longan::ole::xls::XlsError>(())
/// ```
pub struct Workbook {
    sheets: Vec<Worksheet>,
    strings: SharedStringTable,
    formats: FormatTable,
    active_sheet: usize,
    options: WorkbookOptions,
    encoder: Box<dyn FormulaEncoder>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::with_options(WorkbookOptions::default())
    }

    pub fn with_options(options: WorkbookOptions) -> Self {
        Self {
            sheets: Vec::new(),
            strings: SharedStringTable::new(),
            formats: FormatTable::new(),
            active_sheet: 0,
            options,
            encoder: Box::new(Biff8FormulaEncoder::new()),
        }
    }

    /// Replace the formula encoder used during serialization.
    pub fn set_formula_encoder(&mut self, encoder: Box<dyn FormulaEncoder>) {
        self.encoder = encoder;
    }

    pub fn options(&self) -> &WorkbookOptions {
        &self.options
    }

    /// Add a worksheet and return its index.
    ///
    /// Without a name the sheet is called `SheetN`, N being its 1-based position.
    pub fn add_worksheet(&mut self, name: Option<&str>) -> XlsResult<usize> {
        if self.sheets.len() >= MAX_WORKSHEETS {
            return Err(XlsError::SheetLimitExceeded(MAX_WORKSHEETS));
        }
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Sheet{}", self.sheets.len() + 1),
        };
        self.check_sheet_name(&name)?;

        self.sheets.push(Worksheet::new(name));
        Ok(self.sheets.len() - 1)
    }

    fn check_sheet_name(&self, name: &str) -> XlsResult<()> {
        let invalid = |reason: &str| XlsError::InvalidSheetName {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let len = name.encode_utf16().count();
        if len == 0 {
            return Err(invalid("name is empty"));
        }
        if len > MAX_SHEET_NAME_LEN {
            return Err(invalid("name is longer than 31 characters"));
        }
        if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
            return Err(XlsError::InvalidSheetName {
                name: name.to_string(),
                reason: format!("name contains '{c}'"),
            });
        }

        let lowered = name.to_lowercase();
        if self.sheets.iter().any(|s| s.name.to_lowercase() == lowered) {
            return Err(XlsError::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    /// Mutable handle on a worksheet.
    pub fn worksheet_mut(&mut self, index: usize) -> XlsResult<WorksheetMut<'_>> {
        let sheet = self
            .sheets
            .get_mut(index)
            .ok_or(XlsError::SheetNotFound(index))?;
        Ok(WorksheetMut {
            index,
            sheet,
            strings: &mut self.strings,
            formats: &mut self.formats,
            active_sheet: &mut self.active_sheet,
        })
    }

    pub fn worksheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Index of the sheet shown when the file is opened
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Intern a format; identical formats share one identifier.
    pub fn add_format(&mut self, format: &Format) -> XlsResult<FormatId> {
        self.formats.add(format)
    }

    /// Serialize the `Workbook` stream only.
    fn workbook_stream(&mut self) -> XlsResult<Vec<u8>> {
        WorkbookSerializer {
            sheets: &self.sheets,
            strings: &mut self.strings,
            formats: &mut self.formats,
            encoder: self.encoder.as_ref(),
            options: &self.options,
            active_sheet: self.active_sheet,
        }
        .serialize()
    }

    /// Serialize the workbook and return the complete `.xls` file.
    pub fn close(mut self) -> XlsResult<Vec<u8>> {
        let stream = self.workbook_stream()?;

        let mut ole = OleWriter::with_options(self.options.container)?;
        ole.set_root_clsid(EXCEL_CLSID);
        ole.create_stream(&[WORKBOOK_STREAM], &stream)?;
        Ok(ole.to_bytes()?)
    }

    /// Serialize the workbook into `writer`.
    pub fn write_to<W: Write>(self, writer: &mut W) -> XlsResult<()> {
        let bytes = self.close()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize the workbook to a file.
    ///
    /// The file is created only after serialization succeeded.
    pub fn save<P: AsRef<Path>>(self, path: P) -> XlsResult<()> {
        let bytes = self.close()?;
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("sheets", &self.sheets.len())
            .field("strings", &self.strings.len())
            .field("formats", &self.formats.len())
            .field("active_sheet", &self.active_sheet)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
