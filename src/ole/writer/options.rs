//! Configuration types for compound file generation.
use super::super::consts::{MINI_STREAM_CUTOFF, SECTOR_SIZE_V3, SECTOR_SIZE_V4};
use crate::ole::{OleError, OleResult};
use serde::{Deserialize, Serialize};

/// Layout options for [`OleWriter`](super::OleWriter).
///
/// # Examples
///
/// ```rust
/// use longan::ole::CompoundFileOptions;
///
/// let options = CompoundFileOptions::new().with_sector_size(4096);
/// assert_eq!(options.sector_size, 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompoundFileOptions {
    /// Sector size in bytes: 512 (version 3) or 4096 (version 4)
    pub sector_size: usize,
    /// Streams strictly smaller than this are stored in the mini stream
    pub mini_stream_cutoff: u32,
}

impl Default for CompoundFileOptions {
    fn default() -> Self {
        Self {
            sector_size: SECTOR_SIZE_V3,
            mini_stream_cutoff: MINI_STREAM_CUTOFF,
        }
    }
}

impl CompoundFileOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sector size (512 or 4096).
    #[inline]
    pub fn with_sector_size(mut self, sector_size: usize) -> Self {
        self.sector_size = sector_size;
        self
    }

    /// Set the mini stream cutoff.
    ///
    /// Readers assume 4096; other values are only useful for experiments.
    #[inline]
    pub fn with_mini_stream_cutoff(mut self, cutoff: u32) -> Self {
        self.mini_stream_cutoff = cutoff;
        self
    }

    pub(crate) fn validate(&self) -> OleResult<()> {
        if self.sector_size != SECTOR_SIZE_V3 && self.sector_size != SECTOR_SIZE_V4 {
            return Err(OleError::InvalidData(format!(
                "sector size must be 512 or 4096, got {}",
                self.sector_size
            )));
        }
        Ok(())
    }
}
