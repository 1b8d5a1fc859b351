//! Directory tree generation for OLE2 files
//!
//! Entries live in a flat arena whose index is the SID written on disk; the
//! root storage is always SID 0. Each storage's children form a binary search
//! tree over the compound file collation:
//!
//! 1. shorter names (in UTF-16 code units) sort first;
//! 2. names of equal length compare code unit by code unit after upper-casing.
//!
//! The children of every storage are linked as a size-balanced tree built
//! from the sorted sibling list (the middle element becomes the subtree root).
//! All nodes are black except those on an incomplete deepest level, which are
//! red; that colouring satisfies the red-black invariants readers may check.
//!
//! ```text
//! Sorted siblings: [A, BB, CCC, DDDD]
//!
//!          CCC (black)
//!         /    \
//!     BB (black) DDDD (black)
//!      /
//!   A (red)
//! ```

use super::super::consts::*;
use crate::ole::{OleError, OleResult};
use std::cmp::Ordering;

/// Compare two entry names with the compound file collation.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let a_len = a.encode_utf16().count();
    let b_len = b.encode_utf16().count();
    a_len
        .cmp(&b_len)
        .then_with(|| upper_utf16(a).cmp(upper_utf16(b)))
}

fn upper_utf16(name: &str) -> impl Iterator<Item = u16> + '_ {
    name.chars().flat_map(|c| {
        let mut upper = c.to_uppercase();
        let mapped = match (upper.next(), upper.next()) {
            (Some(u), None) => u,
            _ => c,
        };
        let mut buf = [0u16; 2];
        mapped.encode_utf16(&mut buf).to_vec()
    })
}

/// Whether two sibling names collide under the collation.
pub fn names_equal(a: &str, b: &str) -> bool {
    compare_names(a, b) == Ordering::Equal
}

/// Validate a stream or storage name.
pub fn validate_name(name: &str) -> OleResult<()> {
    if name.is_empty() {
        return Err(OleError::InvalidName("empty name".to_string()));
    }
    if name.encode_utf16().count() > MAX_NAME_LEN {
        return Err(OleError::InvalidName(format!(
            "'{name}' exceeds {MAX_NAME_LEN} UTF-16 code units"
        )));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '/' | '\\' | ':' | '!')) {
        return Err(OleError::InvalidName(format!(
            "'{name}' contains reserved character '{c}'"
        )));
    }
    Ok(())
}

/// Directory entry builder
#[derive(Debug, Clone)]
pub struct DirectoryEntryBuilder {
    pub name: String,
    /// Entry type (STGTY_ROOT, STGTY_STORAGE, STGTY_STREAM)
    pub entry_type: u8,
    /// Node colour in the sibling red-black tree
    pub color: u8,
    pub start_sector: u32,
    pub size: u64,
    pub sid_left: u32,
    pub sid_right: u32,
    pub sid_child: u32,
    pub clsid: [u8; 16],
}

impl DirectoryEntryBuilder {
    fn new(name: String, entry_type: u8, start_sector: u32, size: u64) -> Self {
        Self {
            name,
            entry_type,
            color: COLOR_BLACK,
            start_sector,
            size,
            sid_left: NOSTREAM,
            sid_right: NOSTREAM,
            sid_child: NOSTREAM,
            clsid: [0; 16],
        }
    }

    pub fn root() -> Self {
        Self::new("Root Entry".to_string(), STGTY_ROOT, ENDOFCHAIN, 0)
    }

    pub fn stream(name: String, start_sector: u32, size: u64) -> Self {
        Self::new(name, STGTY_STREAM, start_sector, size)
    }

    pub fn storage(name: String) -> Self {
        Self::new(name, STGTY_STORAGE, 0, 0)
    }

    /// Serialize to the 128-byte on-disk layout
    pub fn to_bytes(&self) -> [u8; DIRENTRY_SIZE] {
        let mut data = [0u8; DIRENTRY_SIZE];

        let units: Vec<u16> = self.name.encode_utf16().take(MAX_NAME_LEN).collect();
        for (slot, unit) in data[..64].chunks_exact_mut(2).zip(&units) {
            slot.copy_from_slice(&unit.to_le_bytes());
        }
        // Name length in bytes, including the terminating NUL
        let name_len_bytes = ((units.len() + 1) * 2) as u16;
        data[64..66].copy_from_slice(&name_len_bytes.to_le_bytes());

        data[66] = self.entry_type;
        data[67] = self.color;
        data[68..72].copy_from_slice(&self.sid_left.to_le_bytes());
        data[72..76].copy_from_slice(&self.sid_right.to_le_bytes());
        data[76..80].copy_from_slice(&self.sid_child.to_le_bytes());
        data[80..96].copy_from_slice(&self.clsid);
        // data[96..116]: state bits and timestamps, left zero
        data[116..120].copy_from_slice(&self.start_sector.to_le_bytes());
        data[120..128].copy_from_slice(&self.size.to_le_bytes());

        data
    }

    /// Bytes of an unused directory slot
    pub fn unused_bytes() -> [u8; DIRENTRY_SIZE] {
        let mut data = [0u8; DIRENTRY_SIZE];
        data[68..80].fill(0xFF);
        data
    }
}

/// Directory tree builder
#[derive(Debug)]
pub struct DirectoryBuilder {
    /// List of directory entries; index is the SID
    entries: Vec<DirectoryEntryBuilder>,
    /// Children SIDs per parent SID, in insertion order
    children: Vec<Vec<u32>>,
}

impl DirectoryBuilder {
    pub fn new() -> Self {
        Self {
            entries: vec![DirectoryEntryBuilder::root()],
            children: vec![Vec::new()],
        }
    }

    pub fn set_root_clsid(&mut self, clsid: [u8; 16]) {
        self.entries[0].clsid = clsid;
    }

    /// Record where the mini stream lives
    pub fn set_ministream(&mut self, start_sector: u32, size: u64) {
        self.entries[0].start_sector = start_sector;
        self.entries[0].size = size;
    }

    fn find_child(&self, parent: u32, name: &str) -> Option<u32> {
        self.children[parent as usize]
            .iter()
            .copied()
            .find(|&sid| names_equal(&self.entries[sid as usize].name, name))
    }

    fn push_child(&mut self, parent: u32, entry: DirectoryEntryBuilder) -> OleResult<u32> {
        let sid = self.entries.len();
        if sid as u64 > MAXREGSID as u64 {
            return Err(OleError::TooManyEntries(sid + 1));
        }
        self.entries.push(entry);
        self.children.push(Vec::new());
        self.children[parent as usize].push(sid as u32);
        Ok(sid as u32)
    }

    /// Ensure a storage path exists, creating missing storages.
    /// Returns the SID of the storage at the given path.
    pub fn add_storage_path<S: AsRef<str>>(&mut self, path: &[S]) -> OleResult<u32> {
        let mut parent = 0u32;
        for component in path {
            let component = component.as_ref();
            validate_name(component)?;
            parent = match self.find_child(parent, component) {
                Some(sid) if self.entries[sid as usize].entry_type == STGTY_STORAGE => sid,
                Some(_) => return Err(OleError::DuplicateEntry(component.to_string())),
                None => {
                    self.push_child(parent, DirectoryEntryBuilder::storage(component.to_string()))?
                },
            };
        }
        Ok(parent)
    }

    /// Add a stream at the given full path; parent storages are created automatically.
    pub fn add_stream_path<S: AsRef<str>>(
        &mut self,
        path: &[S],
        start_sector: u32,
        size: u64,
    ) -> OleResult<u32> {
        let Some((name, parents)) = path.split_last() else {
            return Err(OleError::InvalidName("empty stream path".to_string()));
        };
        let name = name.as_ref();
        validate_name(name)?;
        let parent = self.add_storage_path(parents)?;
        if self.find_child(parent, name).is_some() {
            return Err(OleError::DuplicateEntry(name.to_string()));
        }
        self.push_child(
            parent,
            DirectoryEntryBuilder::stream(name.to_string(), start_sector, size),
        )
    }

    /// Number of directory entries, including the root
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Link all sibling trees and serialize the directory, padded to whole sectors.
    pub fn generate_directory_stream(&mut self, sector_size: usize) -> Vec<u8> {
        for parent in 0..self.entries.len() {
            let mut sorted = std::mem::take(&mut self.children[parent]);
            sorted.sort_by(|&a, &b| {
                compare_names(&self.entries[a as usize].name, &self.entries[b as usize].name)
            });
            let child = self.link_subtree(&sorted, 0, tree_shape(sorted.len()));
            self.entries[parent].sid_child = child;
            self.children[parent] = sorted;
        }

        let per_sector = sector_size / DIRENTRY_SIZE;
        let slots = self.entries.len().div_ceil(per_sector) * per_sector;
        let mut data = Vec::with_capacity(slots * DIRENTRY_SIZE);
        for entry in &self.entries {
            data.extend_from_slice(&entry.to_bytes());
        }
        for _ in self.entries.len()..slots {
            data.extend_from_slice(&DirectoryEntryBuilder::unused_bytes());
        }
        data
    }

    fn link_subtree(&mut self, sorted: &[u32], depth: u32, shape: TreeShape) -> u32 {
        if sorted.is_empty() {
            return NOSTREAM;
        }
        let mid = sorted.len() / 2;
        let sid = sorted[mid];
        let left = self.link_subtree(&sorted[..mid], depth + 1, shape);
        let right = self.link_subtree(&sorted[mid + 1..], depth + 1, shape);

        let entry = &mut self.entries[sid as usize];
        entry.sid_left = left;
        entry.sid_right = right;
        entry.color = if shape.red_depth == Some(depth) {
            COLOR_RED
        } else {
            COLOR_BLACK
        };
        sid
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[DirectoryEntryBuilder] {
        &self.entries
    }
}

impl Default for DirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct TreeShape {
    /// Depth whose nodes are coloured red, if the deepest level is incomplete
    red_depth: Option<u32>,
}

fn tree_shape(count: usize) -> TreeShape {
    if count == 0 || (count + 1).is_power_of_two() {
        return TreeShape { red_depth: None };
    }
    let height = usize::BITS - count.leading_zeros();
    TreeShape {
        red_depth: Some(height - 1),
    }
}
