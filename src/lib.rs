//! Longan - A Rust library for writing legacy Microsoft Excel workbooks
//!
//! This library produces `.xls` files: BIFF8 records (the binary format of
//! Excel 97-2003) packed into an OLE2 compound document.
//!
//! # Features
//!
//! - **Workbook model**: worksheets, cell values, formats, hyperlinks, row and column layout
//! - **BIFF8 serializer**: two-pass assembly with precomputed sheet offsets
//! - **Shared string table**: deduplicated strings with correct CONTINUE splitting
//! - **Formula encoder**: infix text to RPN parse tokens, replaceable through a trait
//! - **Compound file writer**: deterministic OLE2 layout usable on its own
//!
//! # Example - Writing a workbook
//!
//! ```no_run
//! use longan::ole::xls::{Format, Workbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_worksheet(None)?;
//!
//! let mut ws = workbook.worksheet_mut(sheet)?;
//! ws.write(0, 0, "Hi Excel!")?;
//! ws.write(2, 0, 3)?;
//! ws.write(7, 0, "=A3 + A6")?;
//! ws.write(10, 0, "http://www.perl.com/")?;
//! ws.write_with_format(12, 0, "Total", &Format::new().set_bold())?;
//!
//! workbook.save("a_simple.xls")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Packing raw streams
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = longan::ole::pack(&[("Workbook", b"\x09\x08\x10\x00".as_slice())])?;
//! assert_eq!(&bytes[..8], b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1");
//! # Ok(())
//! # }
//! ```

/// OLE2 (Object Linking and Embedding) compound file writer
///
/// The `ole` module also contains the `xls` submodule, since .xls files are
/// OLE2-based.
pub mod ole;

// Re-export commonly used types for convenience
pub use ole::xls;
pub use ole::xls::{Format, Workbook, XlsError, XlsResult};
