//! Native and OCR text results.

use serde::{Deserialize, Serialize};

use super::Page;

/// Text embedded in one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Page the text came from
    pub page: Page,
    /// Text as returned by the native extractor
    pub text: String,
}

/// Native text of a document, one fragment per page that yielded text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    fragments: Vec<TextFragment>,
}

impl TextResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the text of the next page.
    ///
    /// Empty fragments are dropped; they leave no gap in the ordering since
    /// fragments carry their page.
    pub fn push(&mut self, page: Page, text: String) {
        if text.is_empty() {
            return;
        }
        debug_assert!(
            self.fragments.last().map_or(true, |f| f.page < page),
            "fragments must arrive in page order"
        );
        self.fragments.push(TextFragment { page, text });
    }

    /// Fragments in page order.
    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Check if no page yielded text.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Concatenated native text; every fragment is followed by a newline.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.fragments.iter().map(|f| f.text.len() + 1).sum());
        for fragment in &self.fragments {
            out.push_str(&fragment.text);
            out.push('\n');
        }
        out
    }

    /// Number of characters left after trimming surrounding whitespace.
    pub fn trimmed_len(&self) -> usize {
        self.text().trim().chars().count()
    }
}

impl FromIterator<(Page, String)> for TextResult {
    fn from_iter<I: IntoIterator<Item = (Page, String)>>(iter: I) -> Self {
        let mut result = TextResult::new();
        for (page, text) in iter {
            result.push(page, text);
        }
        result
    }
}

/// OCR output for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrPage {
    /// Page that was rasterized
    pub page: Page,
    /// Recognized text (empty when the page failed in isolation)
    pub text: String,
}

/// OCR output of a document, ordered by page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    pages: Vec<OcrPage>,
}

impl OcrResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-page results produced in any order.
    ///
    /// Pages are sorted and duplicates keep their first occurrence, so the
    /// page numbers are strictly increasing afterwards.
    pub fn from_pages(mut pages: Vec<OcrPage>) -> Self {
        pages.sort_by_key(|p| p.page);
        pages.dedup_by_key(|p| p.page);
        Self { pages }
    }

    /// Per-page results in page order.
    pub fn pages(&self) -> &[OcrPage] {
        &self.pages
    }

    /// Check if OCR produced no page at all.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Concatenated OCR text with a `--- Page N ---` header before every page.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            out.push_str(&page_header(page.page));
            out.push_str(&page.text);
        }
        out
    }
}

/// Page delimiter written before each OCR page.
pub fn page_header(page: Page) -> String {
    format!("\n--- Page {} ---\n", page.number())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_text_concatenation() {
        let result: TextResult = vec![
            (Page::new(1), "Alpha".to_string()),
            (Page::new(2), String::new()),
            (Page::new(3), "Beta".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(result.fragments().len(), 2);
        assert_eq!(result.fragments()[1].page, Page::new(3));
        assert_eq!(result.text(), "Alpha\nBeta\n");
        assert_eq!(result.trimmed_len(), "Alpha\nBeta".len());
    }

    #[test]
    fn test_trimmed_len_counts_chars() {
        let mut result = TextResult::new();
        result.push(Page::new(1), "  héllo  ".to_string());
        assert_eq!(result.trimmed_len(), 5);
    }

    #[test]
    fn test_ocr_text_headers() {
        let ocr = OcrResult::from_pages(vec![
            OcrPage {
                page: Page::new(2),
                text: "two".to_string(),
            },
            OcrPage {
                page: Page::new(1),
                text: "one".to_string(),
            },
        ]);

        assert_eq!(ocr.text(), "\n--- Page 1 ---\none\n--- Page 2 ---\ntwo");
    }

    #[test]
    fn test_ocr_dedup() {
        let page = |n: u32| OcrPage {
            page: Page::new(n),
            text: format!("p{}", n),
        };
        let ocr = OcrResult::from_pages(vec![page(1), page(1), page(2)]);
        assert_eq!(ocr.pages().len(), 2);
    }

    #[test]
    fn test_empty_results() {
        assert!(TextResult::new().is_empty());
        assert_eq!(TextResult::new().text(), "");
        assert!(OcrResult::new().is_empty());
        assert_eq!(OcrResult::new().text(), "");
    }
}
