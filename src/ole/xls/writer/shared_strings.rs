//! Workbook-wide shared string table.

use super::super::{XlsError, XlsResult};
use std::collections::HashMap;

/// Lifecycle of an append-only interning table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableState {
    /// Accepting new entries
    #[default]
    Open,
    /// Serialization has begun; indices are final
    Frozen,
}

/// Deduplicating table of cell strings.
///
/// Indices are assigned in first-seen order and never change. Once
/// [`finalize`](Self::finalize) runs the table is frozen and further
/// interning fails with `TableFrozen`.
#[derive(Debug, Default)]
pub struct SharedStringTable {
    strings: Vec<String>,
    index: HashMap<String, u32>,
    state: TableState,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `s`, adding it if unseen.
    pub fn intern(&mut self, s: &str) -> XlsResult<u32> {
        if let Some(&idx) = self.index.get(s) {
            return Ok(idx);
        }
        if self.state == TableState::Frozen {
            return Err(XlsError::TableFrozen("shared string table"));
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        Ok(idx)
    }

    /// Freeze the table and return its entries in index order.
    pub fn finalize(&mut self) -> &[String] {
        self.state = TableState::Frozen;
        &self.strings
    }

    #[inline]
    pub fn state(&self) -> TableState {
        self.state
    }

    /// Number of unique strings (cstUnique)
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn get(&self, idx: u32) -> Option<&str> {
        self.strings.get(idx as usize).map(String::as_str)
    }
}
