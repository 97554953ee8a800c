//! Optional progress reporting.

use crate::model::{Page, Warning};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading embedded text page by page
    NativeText,
    /// Rasterizing and recognizing pages
    Ocr,
    /// Running table detection
    Tables,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::NativeText => "native text",
            Stage::Ocr => "OCR",
            Stage::Tables => "tables",
        })
    }
}

/// Receives progress events from an extraction.
///
/// Every method has an empty default; implement only what you need.
/// Per-page events may arrive from several threads at once and out of
/// page order.
pub trait ProgressObserver: Send + Sync {
    /// A stage began.
    fn stage_started(&self, _stage: Stage) {}

    /// A stage completed.
    fn stage_finished(&self, _stage: Stage) {}

    /// One page of a per-page stage completed, successfully or not.
    fn page_finished(&self, _stage: Stage, _page: Page) {}

    /// Native text was short enough to run OCR.
    fn ocr_triggered(&self, _trimmed_len: usize, _threshold: usize) {}

    /// Lattice detection found nothing; stream detection runs next.
    fn table_fallback(&self) {}

    /// A recoverable failure was recorded.
    fn warning(&self, _warning: &Warning) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
