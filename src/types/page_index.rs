//! Page index type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical number of a page within a store.
///
/// Index 0 is reserved for the store's own header, so a stored pointer of 0
/// never refers to a table page.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct PageIndex(pub u32);

impl PageIndex {
    /// Sentinel for "no page"
    pub const INVALID: PageIndex = PageIndex(u32::MAX);

    /// Index of the store header page
    pub const HEADER: PageIndex = PageIndex(0);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index value
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Byte offset of this page in a store with the given page size
    pub const fn byte_offset(self, page_size: usize) -> u64 {
        self.0 as u64 * page_size as u64
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "INVALID")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u32> for PageIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<PageIndex> for u32 {
    fn from(index: PageIndex) -> Self {
        index.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_offset() {
        assert_eq!(PageIndex::new(3).byte_offset(64), 192);
        assert_eq!(PageIndex::HEADER.byte_offset(4096), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(PageIndex::new(7).to_string(), "7");
        assert_eq!(PageIndex::INVALID.to_string(), "INVALID");
        assert!(!PageIndex::INVALID.is_valid());
    }
}
