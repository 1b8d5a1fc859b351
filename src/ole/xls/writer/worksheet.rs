//! Worksheet model: cell grid, layout overrides and the mutation handle.

use super::super::{XlsError, XlsResult};
use super::formatting::{Format, FormatId, FormatTable};
use super::shared_strings::SharedStringTable;
use std::collections::BTreeMap;
use std::fmt;

/// Number of rows in a BIFF8 worksheet
pub const MAX_ROWS: u32 = 65_536;
/// Number of columns in a BIFF8 worksheet
pub const MAX_COLS: u16 = 256;
/// Longest string a cell can hold, in UTF-16 units
pub const MAX_STRING_LEN: usize = 32_767;

/// Longest hyperlink target Excel accepts, in UTF-16 units
pub const MAX_URL_LEN: usize = 2079;

/// URL schemes that `write` turns into hyperlinks
const URL_PREFIXES: [&str; 4] = ["http://", "https://", "ftp://", "mailto:"];

/// Sheet visibility as stored in BOUNDSHEET
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    /// Hidden and not listed in Excel's unhide dialog
    VeryHidden,
}

impl Visibility {
    /// BOUNDSHEET `hsState` value
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Visibility::Visible => 0,
            Visibility::Hidden => 1,
            Visibility::VeryHidden => 2,
        }
    }
}

/// Cell error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    NA,
}

impl CellError {
    /// BIFF8 error code
    pub fn code(self) -> u8 {
        match self {
            CellError::Null => 0x00,
            CellError::Div0 => 0x07,
            CellError::Value => 0x0F,
            CellError::Ref => 0x17,
            CellError::Name => 0x1D,
            CellError::Num => 0x24,
            CellError::NA => 0x2A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::NA => "#N/A",
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored cell content
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Number(f64),
    /// Formula text, encoded only during serialization
    Formula { text: String, cached: f64 },
    /// Index into the shared string table
    StringRef(u32),
    Boolean(bool),
    Error(CellError),
}

/// A cell: value plus optional format
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub format: Option<FormatId>,
}

fn check_coords(row: u32, col: u16) -> XlsResult<()> {
    if row >= MAX_ROWS || col >= MAX_COLS {
        return Err(XlsError::CellCoordinateOutOfRange { row, col });
    }
    Ok(())
}

/// Sparse cell storage ordered by (row, column).
#[derive(Debug, Clone, Default)]
pub struct CellGrid {
    cells: BTreeMap<(u32, u16), Cell>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cell, replacing whatever was at the same position.
    pub fn insert(&mut self, row: u32, col: u16, cell: Cell) -> XlsResult<()> {
        check_coords(row, col)?;
        self.cells.insert((row, col), cell);
        Ok(())
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &Cell)> {
        self.cells.iter().map(|(&(r, c), cell)| (r, c, cell))
    }

    /// Cells of one row in column order.
    pub fn row(&self, row: u32) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells
            .range((row, 0)..=(row, u16::MAX))
            .map(|(&(_, c), cell)| (c, cell))
    }

    /// `(first_row, last_row, first_col, last_col)` over written cells, inclusive.
    pub fn bounds(&self) -> Option<(u32, u32, u16, u16)> {
        let first_row = self.cells.keys().next()?.0;
        let last_row = self.cells.keys().next_back()?.0;
        let (first_col, last_col) = self
            .cells
            .keys()
            .fold((u16::MAX, 0), |(lo, hi), &(_, c)| (lo.min(c), hi.max(c)));
        Some((first_row, last_row, first_col, last_col))
    }

    /// Number of cells referencing the shared string table
    pub fn string_ref_count(&self) -> usize {
        self.cells
            .values()
            .filter(|c| matches!(c.value, CellValue::StringRef(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Column override for an inclusive run of columns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnInfo {
    /// Width in characters
    pub width: f64,
    pub hidden: bool,
    pub format: Option<FormatId>,
}

impl Default for ColumnInfo {
    fn default() -> Self {
        Self {
            width: 8.43,
            hidden: false,
            format: None,
        }
    }
}

/// Row override
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowInfo {
    /// Height in points, `None` for the default height
    pub height: Option<f64>,
    pub hidden: bool,
}

/// Selected cell and range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub active: (u16, u16),
    /// `(first_row, first_col, last_row, last_col)`
    pub range: (u16, u16, u16, u16),
}

/// A worksheet in the workbook model.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub(crate) name: String,
    pub(crate) visibility: Visibility,
    pub(crate) cells: CellGrid,
    pub(crate) columns: BTreeMap<u16, ColumnInfo>,
    pub(crate) rows: BTreeMap<u32, RowInfo>,
    pub(crate) selection: Selection,
    pub(crate) hyperlinks: BTreeMap<(u32, u16), String>,
}

impl Worksheet {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            visibility: Visibility::Visible,
            cells: CellGrid::new(),
            columns: BTreeMap::new(),
            rows: BTreeMap::new(),
            selection: Selection::default(),
            hyperlinks: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn cells(&self) -> &CellGrid {
        &self.cells
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(row, col)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn hyperlink(&self, row: u32, col: u16) -> Option<&str> {
        self.hyperlinks.get(&(row, col)).map(String::as_str)
    }

    /// Column overrides coalesced into `(first, last, info)` runs of equal settings.
    pub fn column_runs(&self) -> Vec<(u16, u16, ColumnInfo)> {
        let mut runs: Vec<(u16, u16, ColumnInfo)> = Vec::new();
        for (&col, info) in &self.columns {
            match runs.last_mut() {
                Some((_, last, prev)) if *last + 1 == col && prev == info => *last = col,
                _ => runs.push((col, col, *info)),
            }
        }
        runs
    }
}

/// Value handed to [`WorksheetMut::write`].
///
/// String conversions dispatch on the text: an empty string is a blank, a
/// leading `=` a formula, a URL a hyperlink, a numeric literal a number and
/// anything else a string.
#[derive(Debug, Clone, PartialEq)]
pub enum CellInput {
    Blank,
    Number(f64),
    Text(String),
    Formula(String),
    Boolean(bool),
    Error(CellError),
    Url(String),
}

/// Whether `s` matches `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?`.
fn is_numeric_literal(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }
    if i < b.len() && matches!(b[i], b'e' | b'E') {
        i += 1;
        if matches!(b.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == b.len()
}

impl CellInput {
    /// Classify a text token.
    pub fn from_token(token: &str) -> Self {
        if token.is_empty() {
            return CellInput::Blank;
        }
        if token.starts_with('=') {
            return CellInput::Formula(token.to_string());
        }
        if URL_PREFIXES.iter().any(|p| token.starts_with(p)) {
            return CellInput::Url(token.to_string());
        }
        if is_numeric_literal(token)
            && let Ok(value) = fast_float2::parse::<f64, _>(token)
        {
            return CellInput::Number(value);
        }
        CellInput::Text(token.to_string())
    }
}

impl From<&str> for CellInput {
    fn from(value: &str) -> Self {
        CellInput::from_token(value)
    }
}

impl From<String> for CellInput {
    fn from(value: String) -> Self {
        CellInput::from_token(&value)
    }
}

impl From<&String> for CellInput {
    fn from(value: &String) -> Self {
        CellInput::from_token(value)
    }
}

impl From<f64> for CellInput {
    fn from(value: f64) -> Self {
        CellInput::Number(value)
    }
}

impl From<f32> for CellInput {
    fn from(value: f32) -> Self {
        CellInput::Number(value as f64)
    }
}

impl From<i32> for CellInput {
    fn from(value: i32) -> Self {
        CellInput::Number(value as f64)
    }
}

impl From<i64> for CellInput {
    fn from(value: i64) -> Self {
        CellInput::Number(value as f64)
    }
}

impl From<u32> for CellInput {
    fn from(value: u32) -> Self {
        CellInput::Number(value as f64)
    }
}

impl From<bool> for CellInput {
    fn from(value: bool) -> Self {
        CellInput::Boolean(value)
    }
}

impl From<CellError> for CellInput {
    fn from(value: CellError) -> Self {
        CellInput::Error(value)
    }
}

/// Mutable handle on one worksheet together with the workbook tables it
/// writes into.
///
/// Obtained from [`Workbook::worksheet_mut`](super::Workbook::worksheet_mut).
pub struct WorksheetMut<'a> {
    pub(crate) index: usize,
    pub(crate) sheet: &'a mut Worksheet,
    pub(crate) strings: &'a mut SharedStringTable,
    pub(crate) formats: &'a mut FormatTable,
    pub(crate) active_sheet: &'a mut usize,
}

impl WorksheetMut<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.sheet.name
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.sheet.cell(row, col)
    }

    /// Write a value, dispatching strings on their content.
    pub fn write(&mut self, row: u32, col: u16, value: impl Into<CellInput>) -> XlsResult<()> {
        self.put(row, col, value.into(), None)
    }

    pub fn write_with_format(
        &mut self,
        row: u32,
        col: u16,
        value: impl Into<CellInput>,
        format: &Format,
    ) -> XlsResult<()> {
        let id = self.formats.add(format)?;
        self.put(row, col, value.into(), Some(id))
    }

    pub fn write_number(&mut self, row: u32, col: u16, value: f64) -> XlsResult<()> {
        self.put(row, col, CellInput::Number(value), None)
    }

    /// Write a string cell without any dispatch on its content.
    pub fn write_string(&mut self, row: u32, col: u16, value: &str) -> XlsResult<()> {
        self.put(row, col, CellInput::Text(value.to_string()), None)
    }

    /// Write a formula whose cached value is 0.
    pub fn write_formula(&mut self, row: u32, col: u16, formula: &str) -> XlsResult<()> {
        self.write_formula_with_value(row, col, formula, 0.0)
    }

    pub fn write_formula_with_value(
        &mut self,
        row: u32,
        col: u16,
        formula: &str,
        cached: f64,
    ) -> XlsResult<()> {
        check_coords(row, col)?;
        self.store(
            row,
            col,
            CellValue::Formula {
                text: formula.to_string(),
                cached,
            },
            None,
        )
    }

    pub fn write_boolean(&mut self, row: u32, col: u16, value: bool) -> XlsResult<()> {
        self.put(row, col, CellInput::Boolean(value), None)
    }

    pub fn write_error(&mut self, row: u32, col: u16, value: CellError) -> XlsResult<()> {
        self.put(row, col, CellInput::Error(value), None)
    }

    pub fn write_blank(&mut self, row: u32, col: u16) -> XlsResult<()> {
        self.put(row, col, CellInput::Blank, None)
    }

    /// Write a hyperlink whose cell text is the URL itself.
    pub fn write_url(&mut self, row: u32, col: u16, url: &str) -> XlsResult<()> {
        self.put(row, col, CellInput::Url(url.to_string()), None)
    }

    /// Set the width of columns `first..=last`, in characters.
    pub fn set_column(&mut self, first: u16, last: u16, width: f64) -> XlsResult<()> {
        self.update_columns(first, last, |info| info.width = width)
    }

    pub fn set_column_hidden(&mut self, first: u16, last: u16, hidden: bool) -> XlsResult<()> {
        self.update_columns(first, last, |info| info.hidden = hidden)
    }

    /// Default format for columns `first..=last`.
    pub fn set_column_format(&mut self, first: u16, last: u16, format: &Format) -> XlsResult<()> {
        let id = self.formats.add(format)?;
        self.update_columns(first, last, |info| info.format = Some(id))
    }

    /// Set a row height in points.
    pub fn set_row(&mut self, row: u32, height: f64) -> XlsResult<()> {
        check_coords(row, 0)?;
        self.sheet.rows.entry(row).or_default().height = Some(height);
        Ok(())
    }

    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) -> XlsResult<()> {
        check_coords(row, 0)?;
        self.sheet.rows.entry(row).or_default().hidden = hidden;
        Ok(())
    }

    /// Hide the sheet. Hiding the active sheet moves activation to sheet 0.
    pub fn hide(&mut self) {
        self.set_hidden(Visibility::Hidden);
    }

    /// Hide the sheet so it cannot be unhidden from Excel's UI.
    pub fn very_hide(&mut self) {
        self.set_hidden(Visibility::VeryHidden);
    }

    /// Make this the active sheet, unhiding it if needed.
    pub fn activate(&mut self) {
        self.sheet.visibility = Visibility::Visible;
        *self.active_sheet = self.index;
    }

    pub fn set_selection(&mut self, row: u32, col: u16) -> XlsResult<()> {
        self.set_selection_range(row, col, row, col)
    }

    /// Select `(first_row, first_col)..=(last_row, last_col)`; the first cell is active.
    pub fn set_selection_range(
        &mut self,
        first_row: u32,
        first_col: u16,
        last_row: u32,
        last_col: u16,
    ) -> XlsResult<()> {
        check_coords(first_row, first_col)?;
        check_coords(last_row, last_col)?;
        let (r1, r2) = (first_row.min(last_row) as u16, first_row.max(last_row) as u16);
        let (c1, c2) = (first_col.min(last_col), first_col.max(last_col));
        self.sheet.selection = Selection {
            active: (first_row as u16, first_col),
            range: (r1, c1, r2, c2),
        };
        Ok(())
    }

    fn set_hidden(&mut self, visibility: Visibility) {
        self.sheet.visibility = visibility;
        if *self.active_sheet == self.index && self.index != 0 {
            log::warn!(
                "worksheet '{}' was active and is now hidden; activating sheet 0",
                self.sheet.name
            );
            *self.active_sheet = 0;
        }
    }

    fn update_columns(
        &mut self,
        first: u16,
        last: u16,
        mut update: impl FnMut(&mut ColumnInfo),
    ) -> XlsResult<()> {
        let (first, last) = (first.min(last), first.max(last));
        check_coords(0, last)?;
        for col in first..=last {
            update(self.sheet.columns.entry(col).or_default());
        }
        Ok(())
    }

    fn put(
        &mut self,
        row: u32,
        col: u16,
        input: CellInput,
        format: Option<FormatId>,
    ) -> XlsResult<()> {
        check_coords(row, col)?;
        let value = match input {
            CellInput::Blank => CellValue::Blank,
            CellInput::Number(n) => CellValue::Number(n),
            CellInput::Boolean(b) => CellValue::Boolean(b),
            CellInput::Error(e) => CellValue::Error(e),
            CellInput::Formula(text) => CellValue::Formula { text, cached: 0.0 },
            CellInput::Text(text) => CellValue::StringRef(self.intern(&text)?),
            CellInput::Url(url) => {
                let len = url.encode_utf16().count();
                if len > MAX_URL_LEN {
                    return Err(XlsError::UrlTooLong(len));
                }
                let idx = self.intern(&url)?;
                let format = match format {
                    Some(id) => id,
                    None => self.formats.add(&Format::hyperlink())?,
                };
                self.sheet.cells.insert(
                    row,
                    col,
                    Cell {
                        value: CellValue::StringRef(idx),
                        format: Some(format),
                    },
                )?;
                self.sheet.hyperlinks.insert((row, col), url);
                return Ok(());
            },
        };
        self.store(row, col, value, format)
    }

    fn store(
        &mut self,
        row: u32,
        col: u16,
        value: CellValue,
        format: Option<FormatId>,
    ) -> XlsResult<()> {
        self.sheet.cells.insert(row, col, Cell { value, format })?;
        self.sheet.hyperlinks.remove(&(row, col));
        Ok(())
    }

    fn intern(&mut self, text: &str) -> XlsResult<u32> {
        let len = text.encode_utf16().count();
        if len > MAX_STRING_LEN {
            return Err(XlsError::StringTooLong(len));
        }
        self.strings.intern(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    struct Fixture {
        sheet: Worksheet,
        strings: SharedStringTable,
        formats: FormatTable,
        active: usize,
    }

    impl Fixture {
        fn new(index_active: usize) -> Self {
            Self {
                sheet: Worksheet::new("Sheet1".to_string()),
                strings: SharedStringTable::new(),
                formats: FormatTable::new(),
                active: index_active,
            }
        }

        fn handle(&mut self, index: usize) -> WorksheetMut<'_> {
            WorksheetMut {
                index,
                sheet: &mut self.sheet,
                strings: &mut self.strings,
                formats: &mut self.formats,
                active_sheet: &mut self.active,
            }
        }
    }

    #[rstest]
    #[case("", CellInput::Blank)]
    #[case("=A1+1", CellInput::Formula("=A1+1".to_string()))]
    #[case("http://www.perl.com/", CellInput::Url("http://www.perl.com/".to_string()))]
    #[case("mailto:a@b.c", CellInput::Url("mailto:a@b.c".to_string()))]
    #[case("3", CellInput::Number(3.0))]
    #[case("-3.00001", CellInput::Number(-3.00001))]
    #[case(".5", CellInput::Number(0.5))]
    #[case("1e3", CellInput::Number(1000.0))]
    #[case("+2.5E-1", CellInput::Number(0.25))]
    #[case("1e", CellInput::Text("1e".to_string()))]
    #[case(".", CellInput::Text(".".to_string()))]
    #[case("12abc", CellInput::Text("12abc".to_string()))]
    #[case("Hi Excel!", CellInput::Text("Hi Excel!".to_string()))]
    #[case("www.example.com", CellInput::Text("www.example.com".to_string()))]
    fn test_token_dispatch(#[case] token: &str, #[case] expected: CellInput) {
        assert_eq!(CellInput::from(token), expected);
    }

    #[test]
    fn test_write_dispatch_into_grid() {
        let mut fx = Fixture::new(0);
        let mut ws = fx.handle(0);
        ws.write(0, 0, "Hi Excel!").unwrap();
        ws.write(2, 0, 3).unwrap();
        ws.write(7, 0, "=A3 + A6").unwrap();
        ws.write(10, 0, "http://www.perl.com/").unwrap();
        ws.write(11, 0, true).unwrap();

        assert_eq!(ws.cell(0, 0).unwrap().value, CellValue::StringRef(0));
        assert_eq!(ws.cell(2, 0).unwrap().value, CellValue::Number(3.0));
        assert_eq!(
            ws.cell(7, 0).unwrap().value,
            CellValue::Formula {
                text: "=A3 + A6".to_string(),
                cached: 0.0
            }
        );
        assert_eq!(ws.cell(10, 0).unwrap().value, CellValue::StringRef(1));
        assert!(ws.cell(10, 0).unwrap().format.is_some());
        assert_eq!(ws.cell(11, 0).unwrap().value, CellValue::Boolean(true));

        assert_eq!(fx.sheet.hyperlink(10, 0), Some("http://www.perl.com/"));
        assert_eq!(fx.strings.len(), 2);
    }

    #[test]
    fn test_overwrite_drops_hyperlink() {
        let mut fx = Fixture::new(0);
        let mut ws = fx.handle(0);
        ws.write_url(1, 1, "https://example.com").unwrap();
        ws.write_number(1, 1, 5.0).unwrap();
        assert!(fx.sheet.hyperlinks.is_empty());
        assert_eq!(fx.sheet.cells.string_ref_count(), 0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut fx = Fixture::new(0);
        let mut ws = fx.handle(0);
        assert!(matches!(
            ws.write_number(65_536, 0, 1.0),
            Err(XlsError::CellCoordinateOutOfRange { row: 65_536, col: 0 })
        ));
        assert!(matches!(
            ws.write(0, 256, "x"),
            Err(XlsError::CellCoordinateOutOfRange { .. })
        ));
        assert!(ws.write(65_535, 255, "corner").is_ok());
        assert!(ws.set_row(70_000, 20.0).is_err());
        assert!(ws.set_column(0, 300, 10.0).is_err());
    }

    #[test]
    fn test_string_too_long() {
        let mut fx = Fixture::new(0);
        let mut ws = fx.handle(0);
        let long = "x".repeat(MAX_STRING_LEN + 1);
        assert!(matches!(
            ws.write_string(0, 0, &long),
            Err(XlsError::StringTooLong(32_768))
        ));
        assert!(ws.write_string(0, 0, &long[1..]).is_ok());
    }

    #[test]
    fn test_url_too_long() {
        let mut fx = Fixture::new(0);
        let mut ws = fx.handle(0);
        let target = format!("http://{}", "a".repeat(MAX_URL_LEN));
        assert!(matches!(
            ws.write(0, 0, target.as_str()),
            Err(XlsError::UrlTooLong(2086))
        ));
        assert!(matches!(
            ws.write_url(0, 0, &target),
            Err(XlsError::UrlTooLong(_))
        ));
        assert!(ws.cell(0, 0).is_none());
        assert!(ws.write_url(0, 0, &target[..MAX_URL_LEN]).is_ok());
    }

    #[test]
    fn test_hide_active_falls_back_to_first() {
        let mut fx = Fixture::new(2);
        fx.handle(2).hide();
        assert_eq!(fx.active, 0);
        assert_eq!(fx.sheet.visibility, Visibility::Hidden);

        fx.handle(2).activate();
        assert_eq!(fx.active, 2);
        assert_eq!(fx.sheet.visibility, Visibility::Visible);

        fx.handle(2).very_hide();
        assert_eq!(fx.sheet.visibility.code(), 2);
    }

    #[test]
    fn test_column_runs_coalesce() {
        let mut fx = Fixture::new(0);
        let mut ws = fx.handle(0);
        ws.set_column(0, 2, 20.0).unwrap();
        ws.set_column(3, 3, 20.0).unwrap();
        ws.set_column(5, 5, 20.0).unwrap();
        ws.set_column_hidden(2, 2, true).unwrap();

        let runs: Vec<_> = fx
            .sheet
            .column_runs()
            .into_iter()
            .map(|(a, b, info)| (a, b, info.hidden))
            .collect();
        assert_eq!(runs, [(0, 1, false), (2, 2, true), (3, 3, false), (5, 5, false)]);
    }

    #[test]
    fn test_selection_range_normalized() {
        let mut fx = Fixture::new(0);
        let mut ws = fx.handle(0);
        ws.set_selection_range(5, 3, 1, 1).unwrap();
        let sel = fx.sheet.selection();
        assert_eq!(sel.active, (5, 3));
        assert_eq!(sel.range, (1, 1, 5, 3));
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = CellGrid::new();
        assert_eq!(grid.bounds(), None);
        let blank = Cell {
            value: CellValue::Blank,
            format: None,
        };
        grid.insert(5, 0, blank.clone()).unwrap();
        grid.insert(0, 7, blank.clone()).unwrap();
        grid.insert(3, 2, blank).unwrap();
        assert_eq!(grid.bounds(), Some((0, 5, 0, 7)));
        assert_eq!(grid.row(3).map(|(c, _)| c).collect::<Vec<_>>(), [2]);
    }

    proptest! {
        #[test]
        fn prop_grid_last_write_wins_and_sorted(
            writes in prop::collection::vec((0u32..50, 0u16..20, any::<i32>()), 1..200)
        ) {
            let mut grid = CellGrid::new();
            let mut expected = std::collections::HashMap::new();
            for &(r, c, v) in &writes {
                grid.insert(r, c, Cell { value: CellValue::Number(v as f64), format: None }).unwrap();
                expected.insert((r, c), v as f64);
            }
            prop_assert_eq!(grid.len(), expected.len());

            let keys: Vec<_> = grid.iter().map(|(r, c, _)| (r, c)).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(keys, sorted);

            for (r, c, cell) in grid.iter() {
                prop_assert_eq!(&cell.value, &CellValue::Number(expected[&(r, c)]));
            }
        }
    }
}
