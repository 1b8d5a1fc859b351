//! FAT (File Allocation Table) generation for OLE2 files
//!
//! The FAT maps sector numbers to the next sector in a chain, enabling
//! variable-length streams to be stored in the compound file.
//!
//! Sectors are handed out strictly sequentially, so the caller can emit
//! sector contents in allocation order without seeking:
//! - Regular sectors use positive chain values
//! - FAT sectors are marked with FATSECT (0xFFFFFFFD)
//! - DIFAT sectors are marked with DIFSECT (0xFFFFFFFC)
//! - End of chain is marked with ENDOFCHAIN (0xFFFFFFFE)
//! - Free sectors are marked with FREESECT (0xFFFFFFFF)

use super::super::consts::*;

/// FAT builder for sequential sector allocation
#[derive(Debug)]
pub struct FatBuilder {
    /// The FAT table (maps sector ID to next sector in chain)
    fat: Vec<u32>,
    /// Sector size for this FAT
    sector_size: usize,
}

impl FatBuilder {
    /// Create a new FAT builder for `sector_size`-byte sectors.
    pub fn new(sector_size: usize) -> Self {
        Self {
            fat: Vec::new(),
            sector_size,
        }
    }

    /// Allocate a chain of sectors large enough for `size` bytes.
    ///
    /// Returns the first sector of the chain, or ENDOFCHAIN for an empty stream.
    pub fn allocate_chain(&mut self, size: usize) -> u32 {
        if size == 0 {
            return ENDOFCHAIN;
        }

        let num_sectors = size.div_ceil(self.sector_size);
        let start_sector = self.fat.len() as u32;
        self.fat.reserve(num_sectors);

        for i in 0..num_sectors {
            let next_value = if i + 1 < num_sectors {
                start_sector + i as u32 + 1
            } else {
                ENDOFCHAIN
            };
            self.fat.push(next_value);
        }

        start_sector
    }

    /// Reserve `count` contiguous sectors marked with `marker` (FATSECT or DIFSECT).
    pub fn allocate_special(&mut self, count: u32, marker: u32) -> u32 {
        if count == 0 {
            return ENDOFCHAIN;
        }

        let start = self.fat.len() as u32;
        self.fat
            .extend(std::iter::repeat_n(marker, count as usize));
        start
    }

    /// Number of sectors allocated so far
    pub fn total_sectors(&self) -> u32 {
        self.fat.len() as u32
    }

    /// Number of FAT entries one sector holds
    pub fn entries_per_sector(&self) -> u32 {
        (self.sector_size / 4) as u32
    }

    /// Solve for the number of FAT and DIFAT sectors needed to describe
    /// every sector allocated so far plus the FAT and DIFAT sectors themselves.
    ///
    /// Returns `(fat_sectors, difat_sectors)`.
    pub fn required_fat_and_difat(&self) -> (u32, u32) {
        let per_fat = self.entries_per_sector();
        let per_difat = per_fat - 1; // last slot chains to the next DIFAT sector
        let used = self.total_sectors();

        let mut n_fat = 0u32;
        let mut n_difat = 0u32;
        loop {
            let new_fat = (used + n_fat + n_difat).div_ceil(per_fat);
            let new_difat = new_fat
                .saturating_sub(HEADER_DIFAT_SLOTS as u32)
                .div_ceil(per_difat);
            if new_fat == n_fat && new_difat == n_difat {
                return (n_fat, n_difat);
            }
            n_fat = new_fat;
            n_difat = new_difat;
        }
    }

    /// Generate FAT sectors as bytes, padding the last sector with FREESECT.
    pub fn generate_fat_sectors(&self) -> Vec<Vec<u8>> {
        let per_sector = self.entries_per_sector() as usize;
        self.fat
            .chunks(per_sector)
            .map(|chunk| {
                let mut sector = vec![0xFFu8; self.sector_size];
                for (slot, value) in sector.chunks_exact_mut(4).zip(chunk) {
                    slot.copy_from_slice(&value.to_le_bytes());
                }
                sector
            })
            .collect()
    }

    /// Check that every chain terminates and no sector is claimed twice.
    pub fn validate(&self) -> Result<(), String> {
        let len = self.fat.len() as u32;
        let mut referenced = vec![false; self.fat.len()];
        for (sector, &next) in self.fat.iter().enumerate() {
            if next > MAXREGSECT {
                continue;
            }
            if next >= len {
                return Err(format!(
                    "sector {sector} points past the end of the FAT ({next})"
                ));
            }
            if std::mem::replace(&mut referenced[next as usize], true) {
                return Err(format!("sector {next} is linked from two chains"));
            }
        }
        Ok(())
    }

    /// Borrow the raw table
    #[cfg(test)]
    pub fn fat(&self) -> &[u32] {
        &self.fat
    }
}
