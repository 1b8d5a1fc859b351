//! XLS file writing module
//!
//! Builds Excel 97-2003 workbooks: an in-memory model (worksheets, shared
//! strings, formats) is serialized into BIFF8 records in two passes and
//! packed into an OLE2 compound file under the `Workbook` stream.

/// BIFF8 record generation
pub mod biff;

/// Chart type records
pub mod chart;

/// Cell formatting (fonts, fills, borders)
pub mod formatting;

/// Formula encoding
pub mod formula;

/// Serialization options
mod options;

/// Two-pass workbook stream assembly
pub mod serializer;

/// Shared string table
pub mod shared_strings;

/// Workbook object model
mod workbook;

/// Worksheet object model
pub mod worksheet;

#[cfg(test)]
mod tests;

pub use chart::{Chart, ChartKind, ChartSubtype, chart_group_records};
pub use formatting::{
    Border, BorderStyle, Borders, Color, Fill, FillPattern, Font, Format, FormatId, FormatTable,
    HorizontalAlignment, Script, Underline, VerticalAlignment,
};
pub use formula::{Biff8FormulaEncoder, FormulaEncoder, Ptg};
pub use options::WorkbookOptions;
pub use serializer::{WorkbookSerializer, serialize_worksheet};
pub use shared_strings::{SharedStringTable, TableState};
pub use workbook::{EXCEL_CLSID, MAX_WORKSHEETS, WORKBOOK_STREAM, Workbook};
pub use worksheet::{
    Cell, CellError, CellGrid, CellInput, CellValue, ColumnInfo, RowInfo, Selection, Visibility,
    Worksheet, WorksheetMut,
};
