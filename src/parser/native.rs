//! Default native-text and table capabilities backed by lopdf.

use std::sync::Arc;

use crate::model::{DetectionStrategy, Document, Page, TableGrid};

use super::backend::{CapabilityResult, NativeTextExtractor, TableDetector};
use super::layout::DocumentLayout;
use super::options::ExtractOptions;
use super::table_detector::{LatticeConfig, LatticeDetector, StreamConfig, StreamDetector};

/// Reads embedded text and detects tables from the PDF object model.
///
/// Both capabilities share the page layout memoized on the [`Document`], so
/// content streams are parsed once per request.
#[derive(Debug, Clone, Default)]
pub struct LopdfBackend {
    stream: StreamDetector,
    lattice: LatticeDetector,
}

impl LopdfBackend {
    /// Create a backend with default detector tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with custom detector tuning.
    pub fn with_configs(stream: StreamConfig, lattice: LatticeConfig) -> Self {
        Self {
            stream: StreamDetector::with_config(stream),
            lattice: LatticeDetector::with_config(lattice),
        }
    }

    /// Create a backend tuned by extraction options.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::with_configs(options.stream.clone(), options.lattice.clone())
    }

    fn layout(&self, document: &Document<'_>) -> CapabilityResult<Arc<DocumentLayout>> {
        document.layout_or_init(DocumentLayout::from_bytes)
    }
}

impl NativeTextExtractor for LopdfBackend {
    fn page_count(&self, document: &Document<'_>) -> CapabilityResult<u32> {
        Ok(self.layout(document)?.page_count())
    }

    fn extract_page_text(&self, document: &Document<'_>, page: Page) -> CapabilityResult<String> {
        Ok(self.layout(document)?.page(page)?.text())
    }
}

impl TableDetector for LopdfBackend {
    fn detect_tables(
        &self,
        document: &Document<'_>,
        strategy: DetectionStrategy,
    ) -> CapabilityResult<Vec<TableGrid>> {
        let layout = self.layout(document)?;
        let mut tables = Vec::new();

        for page in &layout.pages {
            let content = match &page.content {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("{} tables: skipping {}: {}", strategy, page.page, e);
                    continue;
                }
            };

            let found = match strategy {
                DetectionStrategy::Lattice => self.lattice.detect_page(content),
                DetectionStrategy::Stream => self.stream.detect_page(content),
            };
            if !found.is_empty() {
                log::debug!("{} tables: {} on {}", strategy, found.len(), page.page);
            }
            tables.extend(found);
        }

        Ok(tables)
    }
}
