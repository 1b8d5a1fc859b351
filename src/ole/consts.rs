//! Fixed values of the compound file binary format.

/// File signature at offset 0
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Bytes per directory entry
pub const DIRENTRY_SIZE: usize = 128;

/// Sector size of a version 3 file (sector shift 9)
pub const SECTOR_SIZE_V3: usize = 512;

/// Sector size of a version 4 file (sector shift 12)
pub const SECTOR_SIZE_V4: usize = 4096;

/// Mini sectors are always 64 bytes (mini sector shift 6)
pub const MINI_SECTOR_SIZE: usize = 64;

/// Streams strictly below this size are stored in the ministream
pub const MINI_STREAM_CUTOFF: u32 = 4096;

/// FAT sector locations kept in the header before DIFAT sectors are needed
pub const HEADER_DIFAT_SLOTS: usize = 109;

/// Longest entry name in UTF-16 units, terminator excluded
pub const MAX_NAME_LEN: usize = 31;

/// Version 3 stream sizes are limited to 2 GiB
pub const MAX_STREAM_SIZE_V3: u64 = 0x8000_0000;

// Special sector numbers
pub const MAXREGSECT: u32 = 0xFFFF_FFFA;
pub const DIFSECT: u32 = 0xFFFF_FFFC;
pub const FATSECT: u32 = 0xFFFF_FFFD;
pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
pub const FREESECT: u32 = 0xFFFF_FFFF;

// Special directory stream ids
pub const MAXREGSID: u32 = 0xFFFF_FFFA;
pub const NOSTREAM: u32 = 0xFFFF_FFFF;

// Directory entry object types
pub const STGTY_EMPTY: u8 = 0;
pub const STGTY_STORAGE: u8 = 1;
pub const STGTY_STREAM: u8 = 2;
pub const STGTY_ROOT: u8 = 5;

// Directory tree node colours
pub const COLOR_RED: u8 = 0;
pub const COLOR_BLACK: u8 = 1;
