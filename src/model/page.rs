//! Page references.

use serde::{Deserialize, Serialize};

/// A page of the request's document, by 1-based ordinal.
///
/// The document itself is passed alongside; a `Page` never outlives the
/// request and is never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Page(u32);

impl Page {
    /// Create a page reference. Page numbers start at 1.
    pub fn new(number: u32) -> Self {
        debug_assert!(number >= 1, "page numbers are 1-based");
        Self(number)
    }

    /// 1-based page number.
    pub fn number(self) -> u32 {
        self.0
    }

    /// 0-based index, for indexing into per-page vectors.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// All pages of a document with `count` pages, in document order.
    pub fn all(count: u32) -> impl Iterator<Item = Page> + Clone {
        (1..=count).map(Page)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbering() {
        let page = Page::new(3);
        assert_eq!(page.number(), 3);
        assert_eq!(page.index(), 2);
        assert_eq!(page.to_string(), "page 3");
    }

    #[test]
    fn test_all_pages() {
        let numbers: Vec<u32> = Page::all(3).map(Page::number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(Page::all(0).count(), 0);
    }
}
