//! OLE2 compound file writing
//!
//! Packs named byte streams (and optional storages) into a Compound File
//! Binary container. Version 3 files (512-byte sectors) are the default;
//! version 4 (4096-byte sectors) is available through
//! [`CompoundFileOptions`].

/// FAT (File Allocation Table) generation
mod fat;

/// MiniFAT (Mini File Allocation Table) generation
mod minifat;

/// DIFAT (Double Indirect FAT) generation
mod difat;

/// Directory tree generation
mod directory;

/// OLE2 header generation
mod header;

mod options;

/// Core OLE writer implementation
mod core;


pub use core::{OleWriter, pack};
pub use options::CompoundFileOptions;
