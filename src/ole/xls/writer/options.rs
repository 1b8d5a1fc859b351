//! Workbook serialization options.
use crate::ole::CompoundFileOptions;
use serde::{Deserialize, Serialize};

/// Options controlling how a [`Workbook`](super::Workbook) is serialized.
///
/// Derives serde so hosts can embed it in their own configuration files.
///
/// ```rust
/// use longan::ole::xls::WorkbookOptions;
///
/// let options = WorkbookOptions::new().with_compact_numbers(false).with_date_1904(true);
/// assert!(!options.compact_numbers);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookOptions {
    /// Store numbers as RK records when lossless
    pub compact_numbers: bool,
    /// Use the 1904 date system
    pub date_1904: bool,
    /// Layout of the enclosing compound file
    pub container: CompoundFileOptions,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            compact_numbers: true,
            date_1904: false,
            container: CompoundFileOptions::default(),
        }
    }
}

impl WorkbookOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_compact_numbers(mut self, enabled: bool) -> Self {
        self.compact_numbers = enabled;
        self
    }

    #[inline]
    pub fn with_date_1904(mut self, enabled: bool) -> Self {
        self.date_1904 = enabled;
        self
    }

    #[inline]
    pub fn with_container(mut self, container: CompoundFileOptions) -> Self {
        self.container = container;
        self
    }
}
