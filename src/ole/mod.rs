/// Constants for OLE file format
pub mod consts;

/// Compound file error types
mod error;

/// OLE2 compound document writer
///
/// Packs named byte streams into sectors, a FAT/MiniFAT allocation table and
/// a red-black ordered directory tree.
pub mod writer;

/// Legacy Excel workbook (.xls) writer
///
/// Serializes a workbook model into BIFF8 records and wraps them in an
/// OLE2 container.
pub mod xls;

// Re-export public types for convenient access
pub use error::{OleError, OleResult};
pub use writer::{CompoundFileOptions, OleWriter, pack};
