//! MiniFAT (Mini File Allocation Table) generation for OLE2 files
//!
//! Streams below the mini stream cutoff are packed into 64-byte mini sectors
//! inside the mini stream, which itself is stored as a regular FAT chain
//! referenced from the root entry.

use super::super::consts::*;

/// MiniFAT builder for small stream allocation
#[derive(Debug, Default)]
pub struct MiniFatBuilder {
    /// The MiniFAT table (maps mini sector ID to next mini sector in chain)
    minifat: Vec<u32>,
    /// Ministream data (concatenated small streams, each padded to a mini sector)
    ministream: Vec<u8>,
}

impl MiniFatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` to the mini stream and chain its mini sectors.
    ///
    /// Returns the starting mini sector, or ENDOFCHAIN for empty data.
    pub fn allocate_mini_chain(&mut self, data: &[u8]) -> u32 {
        if data.is_empty() {
            return ENDOFCHAIN;
        }

        let num_mini_sectors = data.len().div_ceil(MINI_SECTOR_SIZE);
        let start = self.minifat.len() as u32;
        for i in 0..num_mini_sectors {
            let next_value = if i + 1 < num_mini_sectors {
                start + i as u32 + 1
            } else {
                ENDOFCHAIN
            };
            self.minifat.push(next_value);
        }

        let offset = self.ministream.len();
        self.ministream
            .resize(offset + num_mini_sectors * MINI_SECTOR_SIZE, 0);
        self.ministream[offset..offset + data.len()].copy_from_slice(data);

        start
    }

    pub fn is_empty(&self) -> bool {
        self.minifat.is_empty()
    }

    /// Ministream contents, to be written to regular sectors
    pub fn ministream_data(&self) -> &[u8] {
        &self.ministream
    }

    /// Ministream size recorded in the root entry
    pub fn ministream_size(&self) -> u64 {
        self.ministream.len() as u64
    }

    /// Generate MiniFAT sectors, padding the last one with FREESECT.
    pub fn generate_minifat_sectors(&self, sector_size: usize) -> Vec<Vec<u8>> {
        self.minifat
            .chunks(sector_size / 4)
            .map(|chunk| {
                let mut sector = vec![0xFFu8; sector_size];
                for (slot, value) in sector.chunks_exact_mut(4).zip(chunk) {
                    slot.copy_from_slice(&value.to_le_bytes());
                }
                sector
            })
            .collect()
    }
}
