//! DIFAT (Double Indirect FAT) generation for OLE2 files
//!
//! The header lists the first 109 FAT sectors. Any further FAT sector IDs are
//! stored in a chain of DIFAT sectors; each holds `sector_size / 4 - 1` IDs
//! followed by the sector ID of the next DIFAT sector (ENDOFCHAIN on the last).

use super::super::consts::*;

/// DIFAT builder for files with more than 109 FAT sectors
#[derive(Debug)]
pub struct DifatBuilder<'a> {
    /// FAT sector IDs that did not fit into the header
    overflow: &'a [u32],
    sector_size: usize,
}

impl<'a> DifatBuilder<'a> {
    /// Build from the complete list of FAT sector IDs; the first 109 are skipped.
    pub fn new(sector_size: usize, fat_sectors: &'a [u32]) -> Self {
        let overflow = fat_sectors.get(HEADER_DIFAT_SLOTS..).unwrap_or(&[]);
        Self {
            overflow,
            sector_size,
        }
    }

    fn ids_per_sector(&self) -> usize {
        self.sector_size / 4 - 1
    }

    /// Number of DIFAT sectors needed
    pub fn sector_count(&self) -> u32 {
        self.overflow.len().div_ceil(self.ids_per_sector()) as u32
    }

    /// Generate the DIFAT chain starting at `first_difat_sector`.
    pub fn generate_difat_sectors(&self, first_difat_sector: u32) -> Vec<Vec<u8>> {
        let count = self.sector_count();
        self.overflow
            .chunks(self.ids_per_sector())
            .enumerate()
            .map(|(idx, ids)| {
                let mut sector = vec![0xFFu8; self.sector_size];
                for (slot, id) in sector.chunks_exact_mut(4).zip(ids) {
                    slot.copy_from_slice(&id.to_le_bytes());
                }
                let next = if (idx as u32) + 1 < count {
                    first_difat_sector + idx as u32 + 1
                } else {
                    ENDOFCHAIN
                };
                let tail = self.sector_size - 4;
                sector[tail..].copy_from_slice(&next.to_le_bytes());
                sector
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn test_no_difat_needed() {
        let ids: Vec<u32> = (0..109).collect();
        let difat = DifatBuilder::new(512, &ids);
        assert_eq!(difat.sector_count(), 0);
        assert!(difat.generate_difat_sectors(0).is_empty());
    }

    #[test]
    fn test_single_difat_sector() {
        let ids: Vec<u32> = (0..150).collect();
        let difat = DifatBuilder::new(512, &ids);
        assert_eq!(difat.sector_count(), 1);

        let sectors = difat.generate_difat_sectors(200);
        assert_eq!(sectors.len(), 1);
        assert_eq!(read_u32(&sectors[0], 0), 109);
        assert_eq!(read_u32(&sectors[0], 40 * 4), 149);
        assert_eq!(read_u32(&sectors[0], 41 * 4), FREESECT);
        assert_eq!(read_u32(&sectors[0], 508), ENDOFCHAIN);
    }

    #[test]
    fn test_difat_chain_links() {
        // 141 overflow IDs need 127 + 14
        let ids: Vec<u32> = (0..250).collect();
        let difat = DifatBuilder::new(512, &ids);
        assert_eq!(difat.sector_count(), 2);

        let sectors = difat.generate_difat_sectors(300);
        assert_eq!(read_u32(&sectors[0], 508), 301);
        assert_eq!(read_u32(&sectors[1], 508), ENDOFCHAIN);
    }

    #[test]
    fn test_difat_4096_sectors() {
        // 1091 overflow IDs need 1023 + 68
        let ids: Vec<u32> = (0..1200).collect();
        assert_eq!(DifatBuilder::new(4096, &ids).sector_count(), 2);
    }
}
