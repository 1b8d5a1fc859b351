//! Legacy Excel (.xls) workbook writer
//!
//! Produces BIFF8 workbooks, the binary format of Excel 97-2003. The
//! BIFF record stream is wrapped in an OLE2 compound document by
//! [`crate::ole::OleWriter`].
//!
//! # Example
//!
//! ```rust
//! use longan::ole::xls::{Color, Format, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_worksheet(Some("Regions"))?;
//! let caption = Format::new().set_bold().set_color(Color::Blue);
//!
//! let mut ws = workbook.worksheet_mut(sheet)?;
//! ws.write_with_format(0, 0, "Sales", &caption)?;
//! ws.write(1, 0, 24.9)?;
//! ws.write(2, 0, "=SUM(A2:A2)")?;
//!
//! let bytes = workbook.close()?;
//! assert_eq!(bytes.len() % 512, 0);
//! # Ok::<(), longan::ole::xls::XlsError>(())
//! ```

/// Error types for XLS generation
mod error;

/// Workbook serialization
pub mod writer;

pub use error::{XlsError, XlsResult};
pub use writer::*;
