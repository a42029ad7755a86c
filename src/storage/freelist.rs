//! Free page tracking.
//!
//! Freed pages are zeroed in the backing medium and queued here for reuse.
//! The queue lives in memory only; pages freed before a reopen are not
//! reclaimed.

use crate::types::PageIndex;
use std::collections::VecDeque;

/// Queue of freed page indices, reused oldest first
#[derive(Debug, Default)]
pub struct FreeList {
    pages: VecDeque<PageIndex>,
}

impl FreeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page; a page already queued is not added twice
    pub fn push(&mut self, index: PageIndex) -> bool {
        if self.pages.contains(&index) {
            return false;
        }
        self.pages.push_back(index);
        true
    }

    pub fn pop(&mut self) -> Option<PageIndex> {
        self.pages.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
