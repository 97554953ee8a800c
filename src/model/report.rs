//! The canonical extraction result.

use serde::{Deserialize, Serialize};

use super::{DetectionStrategy, Page, TableGrid, TableStrategy};

/// Where the final text of a report came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    /// Text embedded in the PDF
    Native,
    /// Text recognized from page images
    Ocr,
    /// Neither path produced any text
    #[default]
    None,
}

/// A recoverable failure that was absorbed during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Native text extraction failed for one page.
    PageText {
        /// Affected page
        page: Page,
        /// Capability error message
        message: String,
    },
    /// The OCR pass could not process the document and was abandoned.
    OcrDocument {
        /// Capability error message
        message: String,
    },
    /// Rasterizing or recognizing one page failed.
    OcrPage {
        /// Affected page
        page: Page,
        /// Capability error message
        message: String,
    },
    /// A table-detection strategy failed to run.
    TableStrategy {
        /// Strategy that failed
        strategy: DetectionStrategy,
        /// Capability error message
        message: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::PageText { page, message } => {
                write!(f, "text extraction failed on {}: {}", page, message)
            }
            Warning::OcrDocument { message } => write!(f, "OCR extraction failed: {}", message),
            Warning::OcrPage { page, message } => write!(f, "OCR failed on {}: {}", page, message),
            Warning::TableStrategy { strategy, message } => {
                write!(f, "{} table extraction failed: {}", strategy, message)
            }
        }
    }
}

/// Result of extracting one document.
///
/// Built once by the aggregator and read-only afterwards; the workbook and
/// JSON renderers consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    final_text: String,
    tables: Vec<TableGrid>,
    used_ocr: bool,
    ocr_attempted: bool,
    text_source: TextSource,
    table_strategy: TableStrategy,
    page_count: u32,
    warnings: Vec<Warning>,
}

impl ExtractionReport {
    pub(crate) fn new(
        final_text: String,
        text_source: TextSource,
        tables: Vec<TableGrid>,
        table_strategy: TableStrategy,
    ) -> Self {
        Self {
            final_text,
            tables,
            used_ocr: text_source == TextSource::Ocr,
            ocr_attempted: false,
            text_source,
            table_strategy,
            page_count: 0,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_provenance(
        mut self,
        ocr_attempted: bool,
        page_count: u32,
        warnings: Vec<Warning>,
    ) -> Self {
        self.ocr_attempted = ocr_attempted;
        self.page_count = page_count;
        self.warnings = warnings;
        self
    }

    /// Text chosen for the report (native when present, OCR otherwise).
    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    /// Check if any text was found. An empty report is still a success.
    pub fn has_text(&self) -> bool {
        !self.final_text.is_empty()
    }

    /// Detected tables in document order; table `i` is named `Table_{i+1}`.
    pub fn tables(&self) -> &[TableGrid] {
        &self.tables
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Iterate tables with their 1-based index.
    pub fn numbered_tables(&self) -> impl Iterator<Item = (usize, &TableGrid)> {
        self.tables.iter().enumerate().map(|(i, t)| (i + 1, t))
    }

    /// Whether the final text was recognized from page images.
    pub fn used_ocr(&self) -> bool {
        self.used_ocr
    }

    /// Whether the OCR pass ran, regardless of which text was kept.
    pub fn ocr_attempted(&self) -> bool {
        self.ocr_attempted
    }

    /// Where the final text came from.
    pub fn text_source(&self) -> TextSource {
        self.text_source
    }

    /// Strategy that supplied the tables.
    pub fn table_strategy(&self) -> TableStrategy {
        self.table_strategy
    }

    /// Number of pages in the source document.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Recoverable failures absorbed during extraction.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
