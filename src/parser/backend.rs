//! Capability contracts consumed by the extraction pipeline.
//!
//! Each trait isolates one external engine (native-text parser, page
//! rasterizer, OCR engine, table-geometry detector) from the orchestration
//! logic. Every call returns an explicit [`CapabilityError`] whose scope the
//! orchestrator uses to decide between degrading and failing.
//!
//! Implementations must be `Send + Sync`: pages may be processed on a rayon
//! pool.

use crate::error::CapabilityError;
use crate::model::{DetectionStrategy, Document, Page, TableGrid};

/// Result of a capability call.
pub type CapabilityResult<T> = std::result::Result<T, CapabilityError>;

/// A rendered page image handed to OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// PNG-encoded pixels
    pub png: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Resolution the page was rendered at
    pub dpi: u32,
}

impl Bitmap {
    /// Check if the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pulls text already embedded in the PDF, page by page.
pub trait NativeTextExtractor: Send + Sync {
    /// Number of pages in the document.
    ///
    /// A failure here means the document cannot be opened at all and aborts
    /// the request.
    fn page_count(&self, document: &Document<'_>) -> CapabilityResult<u32>;

    /// Embedded text of one page (empty when the page has none).
    fn extract_page_text(&self, document: &Document<'_>, page: Page) -> CapabilityResult<String>;

    /// Whether the engine needs the document on disk ([`Document::path`]).
    fn requires_file(&self) -> bool {
        false
    }
}

/// Renders a page to pixels for OCR.
pub trait PageRasterizer: Send + Sync {
    /// Render `page` at `dpi` dots per inch.
    ///
    /// Return [`CapabilityError::Document`] when the document itself cannot
    /// be opened by the rendering backend; the OCR pass is then abandoned.
    fn rasterize_page(
        &self,
        document: &Document<'_>,
        page: Page,
        dpi: u32,
    ) -> CapabilityResult<Bitmap>;

    /// Whether the engine needs the document on disk ([`Document::path`]).
    fn requires_file(&self) -> bool {
        false
    }
}

/// Recognizes text in a page image.
pub trait TextRecognizer: Send + Sync {
    /// Plain text found in `bitmap`.
    fn recognize_text(&self, bitmap: &Bitmap) -> CapabilityResult<String>;
}

/// Finds tables across the whole document with one strategy.
pub trait TableDetector: Send + Sync {
    /// Tables in document order (top of the first page first).
    fn detect_tables(
        &self,
        document: &Document<'_>,
        strategy: DetectionStrategy,
    ) -> CapabilityResult<Vec<TableGrid>>;

    /// Whether the engine needs the document on disk ([`Document::path`]).
    fn requires_file(&self) -> bool {
        false
    }
}
