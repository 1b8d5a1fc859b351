//! OLE2 header generation
//!
//! Generates the compound file header with magic bytes, version information,
//! and FAT/MiniFAT/DIFAT/directory locations.

use super::super::consts::*;

/// OLE2 header builder
pub struct HeaderBuilder {
    /// Sector size (512 or 4096)
    sector_size: usize,
    /// Mini stream cutoff written at offset 56
    mini_stream_cutoff: u32,
    /// First sector of directory stream
    first_dir_sector: u32,
    /// Number of directory sectors (csectDir). For 512-byte sector files, must be 0.
    num_dir_sectors: u32,
    first_minifat_sector: u32,
    num_minifat_sectors: u32,
    first_difat_sector: u32,
    num_difat_sectors: u32,
    /// All FAT sector IDs; only the first 109 are stored in the header
    fat_sectors: Vec<u32>,
}

impl HeaderBuilder {
    pub fn new(sector_size: usize, mini_stream_cutoff: u32) -> Self {
        Self {
            sector_size,
            mini_stream_cutoff,
            first_dir_sector: ENDOFCHAIN,
            num_dir_sectors: 0,
            first_minifat_sector: ENDOFCHAIN,
            num_minifat_sectors: 0,
            first_difat_sector: ENDOFCHAIN,
            num_difat_sectors: 0,
            fat_sectors: Vec::new(),
        }
    }

    pub fn set_directory(&mut self, first_sector: u32, num_sectors: u32) {
        self.first_dir_sector = first_sector;
        self.num_dir_sectors = if self.sector_size == SECTOR_SIZE_V3 {
            0
        } else {
            num_sectors
        };
    }

    pub fn set_minifat(&mut self, first_sector: u32, num_sectors: u32) {
        self.first_minifat_sector = first_sector;
        self.num_minifat_sectors = num_sectors;
    }

    pub fn set_difat(&mut self, first_sector: u32, num_sectors: u32) {
        self.first_difat_sector = first_sector;
        self.num_difat_sectors = num_sectors;
    }

    pub fn set_fat_sectors(&mut self, sectors: &[u32]) {
        self.fat_sectors = sectors.to_vec();
    }

    /// Generate the header block, sized to one full sector.
    pub fn generate(&self) -> Vec<u8> {
        let mut header = vec![0u8; self.sector_size];

        header[0..8].copy_from_slice(MAGIC);
        // header[8..24]: header CLSID, always zero

        // Minor version, then major version (3 for 512-byte sectors, 4 for 4096)
        header[24..26].copy_from_slice(&0x003Eu16.to_le_bytes());
        let (major, shift) = if self.sector_size == SECTOR_SIZE_V3 {
            (3u16, 9u16)
        } else {
            (4u16, 12u16)
        };
        header[26..28].copy_from_slice(&major.to_le_bytes());
        header[28..30].copy_from_slice(&0xFFFEu16.to_le_bytes());
        header[30..32].copy_from_slice(&shift.to_le_bytes());
        header[32..34].copy_from_slice(&6u16.to_le_bytes());
        // header[34..40]: reserved

        header[40..44].copy_from_slice(&self.num_dir_sectors.to_le_bytes());
        header[44..48].copy_from_slice(&(self.fat_sectors.len() as u32).to_le_bytes());
        header[48..52].copy_from_slice(&self.first_dir_sector.to_le_bytes());
        // header[52..56]: transaction signature
        header[56..60].copy_from_slice(&self.mini_stream_cutoff.to_le_bytes());
        header[60..64].copy_from_slice(&self.first_minifat_sector.to_le_bytes());
        header[64..68].copy_from_slice(&self.num_minifat_sectors.to_le_bytes());
        header[68..72].copy_from_slice(&self.first_difat_sector.to_le_bytes());
        header[72..76].copy_from_slice(&self.num_difat_sectors.to_le_bytes());

        for slot in 0..HEADER_DIFAT_SLOTS {
            let id = self.fat_sectors.get(slot).copied().unwrap_or(FREESECT);
            let offset = 76 + slot * 4;
            header[offset..offset + 4].copy_from_slice(&id.to_le_bytes());
        }

        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_generation() {
        let mut builder = HeaderBuilder::new(512, MINI_STREAM_CUTOFF);
        builder.set_directory(10, 1);
        builder.set_fat_sectors(&[1, 2, 3]);

        let header = builder.generate();

        assert_eq!(header.len(), 512);
        assert_eq!(&header[0..8], MAGIC);
        assert_eq!(&header[28..30], &0xFFFEu16.to_le_bytes());
        assert_eq!(&header[40..44], &0u32.to_le_bytes()); // csectDir is 0 for v3
        assert_eq!(&header[44..48], &3u32.to_le_bytes());
        assert_eq!(&header[48..52], &10u32.to_le_bytes());
        assert_eq!(&header[56..60], &4096u32.to_le_bytes());
        assert_eq!(&header[76..80], &1u32.to_le_bytes());
        assert_eq!(&header[88..92], &FREESECT.to_le_bytes());
        assert_eq!(&header[508..512], &FREESECT.to_le_bytes());
    }

    #[test]
    fn test_sector_size_512() {
        let header = HeaderBuilder::new(512, MINI_STREAM_CUTOFF).generate();
        assert_eq!(&header[26..28], &3u16.to_le_bytes());
        assert_eq!(&header[30..32], &9u16.to_le_bytes());
        assert_eq!(&header[32..34], &6u16.to_le_bytes());
    }

    #[test]
    fn test_sector_size_4096() {
        let mut builder = HeaderBuilder::new(4096, MINI_STREAM_CUTOFF);
        builder.set_directory(2, 1);
        let header = builder.generate();

        assert_eq!(header.len(), 4096);
        assert_eq!(&header[26..28], &4u16.to_le_bytes());
        assert_eq!(&header[30..32], &12u16.to_le_bytes());
        assert_eq!(&header[40..44], &1u32.to_le_bytes());
        assert!(header[512..].iter().all(|&b| b == 0));
    }
}
