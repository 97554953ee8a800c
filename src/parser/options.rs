//! Extraction options and configuration.

use std::path::PathBuf;

use super::table_detector::{LatticeConfig, StreamConfig};

/// Default trimmed-length below which OCR runs.
pub const DEFAULT_OCR_THRESHOLD: usize = 100;

/// Default rasterization resolution for OCR.
pub const DEFAULT_OCR_DPI: u32 = 200;

/// Default label of the header cell on the `Text` sheet.
pub const DEFAULT_TEXT_HEADER: &str = "Extracted Text";

/// Options for extracting a PDF document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// OCR runs when the trimmed native text has fewer characters than this
    pub ocr_threshold: usize,

    /// Resolution pages are rasterized at for OCR
    pub ocr_dpi: u32,

    /// What a failing page does to the rest of the OCR pass
    pub ocr_failure: OcrFailurePolicy,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Header cell label of the `Text` sheet
    pub text_header: String,

    /// Directory for the per-request scratch file (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,

    /// Write the scratch file even when no capability needs it
    pub materialize: bool,

    /// Stream table detector tuning
    pub stream: StreamConfig,

    /// Lattice table detector tuning
    pub lattice: LatticeConfig,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OCR trigger threshold.
    pub fn with_ocr_threshold(mut self, chars: usize) -> Self {
        self.ocr_threshold = chars;
        self
    }

    /// Never run OCR.
    pub fn without_ocr(mut self) -> Self {
        self.ocr_threshold = 0;
        self
    }

    /// Set the OCR rasterization resolution.
    pub fn with_ocr_dpi(mut self, dpi: u32) -> Self {
        self.ocr_dpi = dpi;
        self
    }

    /// Set the OCR failure policy.
    pub fn with_ocr_failure(mut self, policy: OcrFailurePolicy) -> Self {
        self.ocr_failure = policy;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the `Text` sheet header label.
    pub fn with_text_header(mut self, label: impl Into<String>) -> Self {
        self.text_header = label.into();
        self
    }

    /// Put scratch files in `dir`.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Always write the document to a scratch file.
    pub fn materialized(mut self) -> Self {
        self.materialize = true;
        self
    }

    /// Set stream detector tuning.
    pub fn with_stream_config(mut self, config: StreamConfig) -> Self {
        self.stream = config;
        self
    }

    /// Set lattice detector tuning.
    pub fn with_lattice_config(mut self, config: LatticeConfig) -> Self {
        self.lattice = config;
        self
    }

    /// Whether native text of `trimmed_len` characters triggers OCR.
    pub fn needs_ocr(&self, trimmed_len: usize) -> bool {
        trimmed_len < self.ocr_threshold
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            ocr_threshold: DEFAULT_OCR_THRESHOLD,
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_failure: OcrFailurePolicy::default(),
            parallel: true,
            text_header: DEFAULT_TEXT_HEADER.to_string(),
            scratch_dir: None,
            materialize: false,
            stream: StreamConfig::default(),
            lattice: LatticeConfig::default(),
        }
    }
}

/// How the OCR pass reacts to a page that fails to rasterize or recognize.
///
/// A failure that concerns the whole document (the rasterizer cannot open
/// it, the OCR engine is missing) always ends the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrFailurePolicy {
    /// Keep the failed page with empty text and continue
    #[default]
    IsolatePage,
    /// Discard all OCR output
    AbortPass,
}
