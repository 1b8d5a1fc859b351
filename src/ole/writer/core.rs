//! OLE file writer implementation
//!
//! This module packs named byte streams into an OLE2 structured storage file.
//! Streams and storages are accumulated in memory and laid out in one pass
//! when `to_bytes()`, `write_to()` or `save()` is called.
//!
//! # Stream Allocation vs Directory Ordering
//!
//! 1. **Stream ALLOCATION order** determines which sector each stream occupies.
//!    Large streams receive sectors in the order they were added, followed by
//!    the mini stream (holding every small stream, again in insertion order),
//!    the directory, the MiniFAT, the DIFAT and finally the FAT itself.
//!    Because allocation is strictly sequential the file is emitted front to
//!    back without seeking.
//!
//! 2. **Directory ENTRY order** is the SID order: explicitly created storages
//!    first, then streams in insertion order. Sibling trees are linked
//!    independently of SID order (see `DirectoryBuilder`).
//!
//! ## Example: XLS File Structure
//!
//! ```text
//! Stream creation order:
//!   1. create_stream(["Workbook"], 9 KiB) → sectors 0..=17
//!
//! Sectors: [0..=17 Workbook] [18 Directory] [19 FAT]
//! Directory: Root Entry (SID 0) └─ Workbook (SID 1)
//! ```
//!
//! # Example
//!
//! ```rust
//! use longan::ole::OleWriter;
//!
//! let mut writer = OleWriter::new();
//! writer.create_stream(&["MyStream"], b"Hello, World!")?;
//! writer.create_storage(&["MyStorage"])?;
//! writer.create_stream(&["MyStorage", "NestedStream"], b"Nested content")?;
//!
//! let bytes = writer.to_bytes()?;
//! assert_eq!(&bytes[..8], b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1");
//! # Ok::<(), longan::ole::OleError>(())
//! ```
use super::super::consts::*;
use super::difat::DifatBuilder;
use super::directory::{DirectoryBuilder, names_equal, validate_name};
use super::fat::FatBuilder;
use super::header::HeaderBuilder;
use super::minifat::MiniFatBuilder;
use super::options::CompoundFileOptions;
use crate::ole::{OleError, OleResult};
use std::io::Write;

/// OLE file writer
///
/// Provides methods to build OLE2 structured storage files.
/// All operations are buffered in memory until the file is produced.
#[derive(Debug, Clone, Default)]
pub struct OleWriter {
    options: CompoundFileOptions,
    /// CLSID written into the root entry
    root_clsid: [u8; 16],
    /// Stream data in insertion order (path, data)
    streams: Vec<(Vec<String>, Vec<u8>)>,
    /// Explicitly created storages in creation order
    storages: Vec<Vec<String>>,
}

fn same_path(a: &[String], b: &[&str]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| names_equal(x, y))
}

impl OleWriter {
    /// Create a new empty OLE writer with default settings (512-byte sectors)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new OLE writer with explicit layout options
    pub fn with_options(options: CompoundFileOptions) -> OleResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    /// Set the CLSID (Class ID) for the root entry
    ///
    /// Office applications use it to recognize the document type.
    /// Excel 97-2003 workbooks use `{00020820-0000-0000-C000-000000000046}`.
    pub fn set_root_clsid(&mut self, clsid: [u8; 16]) {
        self.root_clsid = clsid;
    }

    /// Create a new stream at the specified path
    ///
    /// If a stream already exists at this path (names compared
    /// case-insensitively), its contents are replaced.
    ///
    /// # Arguments
    ///
    /// * `path` - Path components (e.g., `&["MyStorage", "MyStream"]`)
    /// * `data` - Stream contents
    pub fn create_stream(&mut self, path: &[&str], data: &[u8]) -> OleResult<()> {
        if path.is_empty() {
            return Err(OleError::InvalidName("empty stream path".to_string()));
        }
        for component in path {
            validate_name(component)?;
        }

        if self.options.sector_size == SECTOR_SIZE_V3 && data.len() as u64 > MAX_STREAM_SIZE_V3 {
            return Err(OleError::StreamTooLarge {
                name: path.join("/"),
                size: data.len() as u64,
            });
        }

        if let Some((_, existing)) = self
            .streams
            .iter_mut()
            .find(|(p, _)| same_path(p, path))
        {
            *existing = data.to_vec();
        } else {
            self.streams
                .push((path.iter().map(|s| s.to_string()).collect(), data.to_vec()));
        }

        Ok(())
    }

    /// Create a new storage (directory) at the specified path
    ///
    /// Parent storages are created automatically if they don't exist.
    pub fn create_storage(&mut self, path: &[&str]) -> OleResult<()> {
        if path.is_empty() {
            return Err(OleError::InvalidName("empty storage path".to_string()));
        }
        for component in path {
            validate_name(component)?;
        }

        if !self.storages.iter().any(|p| same_path(p, path)) {
            self.storages
                .push(path.iter().map(|s| s.to_string()).collect());
        }

        Ok(())
    }

    /// Lay out the compound file and return its bytes.
    ///
    /// The process follows these steps:
    /// 1. Allocate FAT chains for large streams (>= cutoff) in insertion order
    /// 2. Pack small streams into the mini stream and allocate its chain
    /// 3. Build the directory tree and allocate its chain
    /// 4. Allocate the MiniFAT, then solve for and reserve DIFAT and FAT sectors
    /// 5. Emit header and sectors in allocation order
    pub fn to_bytes(&self) -> OleResult<Vec<u8>> {
        let sector_size = self.options.sector_size;
        let cutoff = self.options.mini_stream_cutoff as usize;

        let mut fat = FatBuilder::new(sector_size);
        let mut minifat = MiniFatBuilder::new();

        let mut start_sectors = vec![ENDOFCHAIN; self.streams.len()];
        for (idx, (_, data)) in self.streams.iter().enumerate() {
            if data.len() >= cutoff {
                start_sectors[idx] = fat.allocate_chain(data.len());
            }
        }
        for (idx, (_, data)) in self.streams.iter().enumerate() {
            if data.len() < cutoff {
                start_sectors[idx] = minifat.allocate_mini_chain(data);
            }
        }
        let ministream_start = fat.allocate_chain(minifat.ministream_data().len());

        let mut directory = DirectoryBuilder::new();
        directory.set_root_clsid(self.root_clsid);
        directory.set_ministream(ministream_start, minifat.ministream_size());
        for storage in &self.storages {
            directory.add_storage_path(storage)?;
        }
        for ((path, data), &start) in self.streams.iter().zip(&start_sectors) {
            directory.add_stream_path(path, start, data.len() as u64)?;
        }
        let dir_stream = directory.generate_directory_stream(sector_size);
        let dir_sector_count = (dir_stream.len() / sector_size) as u32;
        let dir_start = fat.allocate_chain(dir_stream.len());

        let minifat_sectors = minifat.generate_minifat_sectors(sector_size);
        let minifat_start = fat.allocate_chain(minifat_sectors.len() * sector_size);

        let (n_fat, n_difat) = fat.required_fat_and_difat();
        let difat_start = fat.allocate_special(n_difat, DIFSECT);
        let fat_start = fat.allocate_special(n_fat, FATSECT);

        fat.validate()
            .map_err(|e| OleError::InvalidData(format!("FAT validation failed: {e}")))?;

        let fat_sector_ids: Vec<u32> = (fat_start..fat_start + n_fat).collect();
        let difat = DifatBuilder::new(sector_size, &fat_sector_ids);
        let difat_sectors = difat.generate_difat_sectors(difat_start);
        debug_assert_eq!(difat.sector_count(), n_difat);
        let fat_sectors = fat.generate_fat_sectors();

        let mut header = HeaderBuilder::new(sector_size, self.options.mini_stream_cutoff);
        header.set_directory(dir_start, dir_sector_count);
        header.set_minifat(minifat_start, minifat_sectors.len() as u32);
        if n_difat > 0 {
            header.set_difat(difat_start, n_difat);
        }
        header.set_fat_sectors(&fat_sector_ids);

        let total_len = (fat.total_sectors() as usize + 1) * sector_size;
        let mut out = Vec::with_capacity(total_len);
        out.extend_from_slice(&header.generate());

        let pad = |out: &mut Vec<u8>| {
            let rem = out.len() % sector_size;
            if rem != 0 {
                out.resize(out.len() + sector_size - rem, 0);
            }
        };
        for (_, data) in self.streams.iter().filter(|(_, d)| d.len() >= cutoff) {
            out.extend_from_slice(data);
            pad(&mut out);
        }
        out.extend_from_slice(minifat.ministream_data());
        pad(&mut out);
        out.extend_from_slice(&dir_stream);
        for sector in minifat_sectors.iter().chain(&difat_sectors).chain(&fat_sectors) {
            out.extend_from_slice(sector);
        }
        debug_assert_eq!(out.len(), total_len);

        log::debug!(
            "packed compound file: {} streams, {} directory entries, {} sectors ({} FAT, {} DIFAT)",
            self.streams.len(),
            directory.entry_count(),
            fat.total_sectors(),
            n_fat,
            n_difat
        );

        Ok(out)
    }

    /// Write the OLE file to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> OleResult<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Save the OLE file to a file path
    ///
    /// The file is only created once the whole layout has succeeded.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> OleResult<()> {
        let bytes = self.to_bytes()?;
        let file = std::fs::File::create(path)?;
        let mut buffered = std::io::BufWriter::new(file);
        buffered.write_all(&bytes)?;
        buffered.flush()?;
        Ok(())
    }
}

/// Pack an ordered list of named root-level streams into a compound file.
///
/// Sector assignment follows the input order; the output is deterministic.
///
/// ```rust
/// let bytes = longan::ole::pack(&[("Workbook", b"\x09\x08".as_slice())])?;
/// assert_eq!(bytes.len() % 512, 0);
/// # Ok::<(), longan::ole::OleError>(())
/// ```
pub fn pack(streams: &[(&str, &[u8])]) -> OleResult<Vec<u8>> {
    let mut writer = OleWriter::new();
    for (name, data) in streams {
        writer.create_stream(&[name], data)?;
    }
    writer.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_stream_replaces_case_insensitively() {
        let mut writer = OleWriter::new();
        writer.create_stream(&["Test"], b"Hello").unwrap();
        writer.create_stream(&["TEST"], b"World!").unwrap();
        assert_eq!(writer.streams.len(), 1);
        assert_eq!(writer.streams[0].1, b"World!");
    }

    #[test]
    fn test_create_storage_once() {
        let mut writer = OleWriter::new();
        writer.create_storage(&["Storage"]).unwrap();
        writer.create_storage(&["storage"]).unwrap();
        assert_eq!(writer.storages.len(), 1);
    }

    #[test]
    fn test_invalid_sector_size() {
        let options = CompoundFileOptions::new().with_sector_size(1024);
        assert!(matches!(
            OleWriter::with_options(options),
            Err(OleError::InvalidData(_))
        ));
    }

    #[test]
    fn test_stream_storage_conflict() {
        let mut writer = OleWriter::new();
        writer.create_stream(&["Data"], b"x").unwrap();
        writer.create_storage(&["DATA"]).unwrap();
        assert!(matches!(
            writer.to_bytes(),
            Err(OleError::DuplicateEntry(_))
        ));
    }
}
