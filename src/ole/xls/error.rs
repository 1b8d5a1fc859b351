//! Error types for XLS workbook generation

use crate::ole::OleError;
use thiserror::Error;

/// Result type alias for XLS operations
pub type XlsResult<T> = Result<T, XlsError>;

/// Errors that can occur while building or serializing a workbook
#[derive(Error, Debug)]
pub enum XlsError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compound file container error
    #[error("OLE container error: {0}")]
    Ole(#[from] OleError),

    /// A record payload exceeds the BIFF8 limit of 8224 bytes
    #[error("record 0x{opcode:04X} payload of {len} bytes exceeds 8224")]
    RecordTooLarge { opcode: u16, len: usize },

    /// An interning table was used after it was frozen for serialization
    #[error("{0} is frozen")]
    TableFrozen(&'static str),

    /// Unknown colour name
    #[error("unknown colour '{0}'")]
    UnknownColor(String),

    /// Palette index outside the BIFF8 colour table
    #[error("colour index {0} is outside the palette (8..=63, 64, 65)")]
    InvalidColorIndex(u8),

    /// Font name empty or longer than 31 characters
    #[error("invalid font name '{0}': must be 1 to 31 characters")]
    InvalidFontName(String),

    /// Too many distinct cell formats for the XF table
    #[error("workbook already holds the maximum of {0} cell formats")]
    FormatLimitExceeded(usize),

    /// Unknown chart kind or invalid kind/subtype combination
    #[error("unsupported chart type: {0}")]
    UnsupportedChartType(String),

    /// Two sheets share a name (compared case-insensitively)
    #[error("duplicate worksheet name '{0}'")]
    DuplicateSheetName(String),

    /// Sheet name is empty, too long, or contains a reserved character
    #[error("invalid worksheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// Too many worksheets for a BIFF8 tab index
    #[error("workbook already holds the maximum of {0} worksheets")]
    SheetLimitExceeded(usize),

    /// Cell text longer than the 32767 characters Excel accepts
    #[error("string of {0} UTF-16 units exceeds 32767")]
    StringTooLong(usize),

    /// Hyperlink longer than the 2079 characters Excel accepts
    #[error("URL of {0} UTF-16 units exceeds 2079")]
    UrlTooLong(usize),

    /// Text for a 1-byte length field is longer than 255 characters
    #[error("short string of {0} UTF-16 units exceeds 255")]
    ShortStringTooLong(usize),

    /// Cell position beyond BIFF8 limits (65536 rows, 256 columns)
    #[error("cell ({row}, {col}) is outside the 65536 x 256 grid")]
    CellCoordinateOutOfRange { row: u32, col: u16 },

    /// The formula encoder rejected a formula
    #[error("invalid formula in '{sheet}' at ({row}, {col}): {reason}")]
    InvalidFormula {
        sheet: String,
        row: u32,
        col: u16,
        reason: String,
    },

    /// Workbook has no worksheets at close
    #[error("workbook has no worksheets")]
    NoWorksheets,

    /// The active sheet is hidden at close
    #[error("active worksheet '{0}' is hidden")]
    HiddenActiveSheet(String),

    /// Worksheet index out of range
    #[error("worksheet index {0} not found")]
    SheetNotFound(usize),
}
