//! The extraction pipeline: native text, OCR fallback, table detection.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{
    DetectionStrategy, Document, ExtractionReport, OcrPage, OcrResult, Page, TableGrid,
    TableStrategy, TextResult, Warning,
};
use crate::parser::{
    CapabilityResult, EmbeddedImageRasterizer, ExtractOptions, LopdfBackend, NativeTextExtractor,
    OcrFailurePolicy, PageRasterizer, TableDetector, TesseractCommand, TextRecognizer,
};

use super::aggregate::aggregate;
use super::observer::{ProgressObserver, Stage};
use super::scratch::ScratchFile;

/// Runs the extraction pipeline over one document at a time.
///
/// An `Extractor` holds no per-request state and can serve concurrent
/// requests from several threads.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::{Extractor, ExtractOptions};
///
/// let extractor = Extractor::with_options(ExtractOptions::new().with_ocr_dpi(300));
/// let report = extractor.extract_file("scan.pdf")?;
/// println!("{} tables", report.table_count());
/// # Ok::<(), pdfsheet::Error>(())
/// ```
pub struct Extractor {
    native: Box<dyn NativeTextExtractor>,
    rasterizer: Box<dyn PageRasterizer>,
    recognizer: Box<dyn TextRecognizer>,
    table_detector: Box<dyn TableDetector>,
    observer: Option<Arc<dyn ProgressObserver>>,
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor with the default capabilities and options.
    pub fn new() -> Self {
        Self::with_options(ExtractOptions::default())
    }

    /// Create an extractor with the default capabilities and custom options.
    pub fn with_options(options: ExtractOptions) -> Self {
        let backend = LopdfBackend::from_options(&options);
        Self {
            native: Box::new(backend.clone()),
            rasterizer: Box::new(EmbeddedImageRasterizer::new()),
            recognizer: Box::new(TesseractCommand::new()),
            table_detector: Box::new(backend),
            observer: None,
            options,
        }
    }

    /// Replace the native text extractor.
    pub fn with_native_text(mut self, native: impl NativeTextExtractor + 'static) -> Self {
        self.native = Box::new(native);
        self
    }

    /// Replace the page rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: impl PageRasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    /// Replace the OCR engine.
    pub fn with_recognizer(mut self, recognizer: impl TextRecognizer + 'static) -> Self {
        self.recognizer = Box::new(recognizer);
        self
    }

    /// Replace the table detector.
    pub fn with_table_detector(mut self, detector: impl TableDetector + 'static) -> Self {
        self.table_detector = Box::new(detector);
        self
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract from a file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionReport> {
        let bytes = std::fs::read(path)?;
        self.extract(&bytes)
    }

    /// Extract from a reader.
    pub fn extract_reader<R: Read>(&self, mut reader: R) -> Result<ExtractionReport> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.extract(&bytes)
    }

    /// Extract text and tables from PDF bytes.
    ///
    /// Fails only when the document cannot be opened. Every later failure
    /// degrades to an empty partial result and is listed in
    /// [`ExtractionReport::warnings`].
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractionReport> {
        let format = detect_format_from_bytes(bytes)?;
        log::debug!("extracting {} ({} bytes)", format, bytes.len());

        let scratch = if self.needs_file() {
            let dir = self.options.scratch_dir.as_deref();
            Some(ScratchFile::create(bytes, dir).map_err(Error::Scratch)?)
        } else {
            None
        };

        let result = {
            let document = match &scratch {
                Some(scratch) => Document::new(bytes).with_path(scratch.path()),
                None => Document::new(bytes),
            };
            self.run(&document)
        };

        if let Some(scratch) = scratch {
            if let Err(e) = scratch.release() {
                log::warn!("failed to remove scratch file: {}", e);
            }
        }

        result
    }

    fn needs_file(&self) -> bool {
        self.options.materialize
            || self.native.requires_file()
            || self.rasterizer.requires_file()
            || self.table_detector.requires_file()
    }

    fn run(&self, document: &Document<'_>) -> Result<ExtractionReport> {
        let page_count = self.native.page_count(document).map_err(|e| {
            log::error!("cannot open document: {}", e);
            Error::from(e)
        })?;
        if page_count == 0 {
            return Err(Error::DocumentOpen {
                reason: "document has no pages".to_string(),
            });
        }
        log::info!("document has {} pages", page_count);

        let mut warnings = Vec::new();

        self.notify(|o| o.stage_started(Stage::NativeText));
        let native = self.native_text(document, page_count, &mut warnings);
        self.notify(|o| o.stage_finished(Stage::NativeText));

        let trimmed_len = native.trimmed_len();
        let ocr_attempted = self.options.needs_ocr(trimmed_len);
        let ocr = if ocr_attempted {
            log::info!(
                "native text has {} characters (< {}), running OCR",
                trimmed_len,
                self.options.ocr_threshold
            );
            self.notify(|o| o.ocr_triggered(trimmed_len, self.options.ocr_threshold));
            self.notify(|o| o.stage_started(Stage::Ocr));
            let ocr = self.ocr(document, page_count, &mut warnings);
            self.notify(|o| o.stage_finished(Stage::Ocr));
            ocr
        } else {
            OcrResult::new()
        };

        self.notify(|o| o.stage_started(Stage::Tables));
        let (tables, table_strategy) = self.tables(document, &mut warnings);
        self.notify(|o| o.stage_finished(Stage::Tables));

        let report = aggregate(native.text(), ocr.text(), tables, table_strategy)
            .with_provenance(ocr_attempted, page_count, warnings);

        log::info!(
            "extracted {} characters ({:?}), {} tables ({:?}), {} warnings",
            report.final_text().chars().count(),
            report.text_source(),
            report.table_count(),
            report.table_strategy(),
            report.warnings().len()
        );
        Ok(report)
    }

    /// Native text of every page, failed pages contributing nothing.
    fn native_text(
        &self,
        document: &Document<'_>,
        page_count: u32,
        warnings: &mut Vec<Warning>,
    ) -> TextResult {
        let extract_page = |page: Page| {
            let text = self.native.extract_page_text(document, page);
            self.notify(|o| o.page_finished(Stage::NativeText, page));
            (page, text)
        };

        let pages: Vec<(Page, CapabilityResult<String>)> = if self.options.parallel {
            (1..=page_count)
                .into_par_iter()
                .map(|n| extract_page(Page::new(n)))
                .collect()
        } else {
            Page::all(page_count).map(extract_page).collect()
        };

        let mut native = TextResult::new();
        for (page, text) in pages {
            match text {
                Ok(text) => native.push(page, text),
                Err(e) => self.warn(
                    warnings,
                    Warning::PageText {
                        page,
                        message: e.to_string(),
                    },
                ),
            }
        }
        native
    }

    /// OCR every page at the configured resolution.
    fn ocr(
        &self,
        document: &Document<'_>,
        page_count: u32,
        warnings: &mut Vec<Warning>,
    ) -> OcrResult {
        let dpi = self.options.ocr_dpi;
        let ocr_page = |page: Page| {
            let text = self
                .rasterizer
                .rasterize_page(document, page, dpi)
                .and_then(|bitmap| self.recognizer.recognize_text(&bitmap));
            self.notify(|o| o.page_finished(Stage::Ocr, page));
            (page, text)
        };

        if self.options.parallel {
            let pages: Vec<(Page, CapabilityResult<String>)> = (1..=page_count)
                .into_par_iter()
                .map(|n| ocr_page(Page::new(n)))
                .collect();
            self.collect_ocr(pages.into_iter(), warnings)
        } else {
            // Lazy, so an aborting failure stops further engine calls.
            self.collect_ocr(Page::all(page_count).map(ocr_page), warnings)
        }
    }

    /// Fold per-page OCR outcomes in page order, applying the failure policy.
    fn collect_ocr(
        &self,
        pages: impl Iterator<Item = (Page, CapabilityResult<String>)>,
        warnings: &mut Vec<Warning>,
    ) -> OcrResult {
        let mut recognized = Vec::new();

        for (page, text) in pages {
            match text {
                Ok(text) => recognized.push(OcrPage { page, text }),
                Err(e)
                    if e.is_document_level()
                        || self.options.ocr_failure == OcrFailurePolicy::AbortPass =>
                {
                    self.warn(
                        warnings,
                        Warning::OcrDocument {
                            message: e.to_string(),
                        },
                    );
                    return OcrResult::new();
                }
                Err(e) => {
                    self.warn(
                        warnings,
                        Warning::OcrPage {
                            page,
                            message: e.to_string(),
                        },
                    );
                    recognized.push(OcrPage {
                        page,
                        text: String::new(),
                    });
                }
            }
        }

        OcrResult::from_pages(recognized)
    }

    /// Lattice first; stream only when lattice found nothing.
    fn tables(
        &self,
        document: &Document<'_>,
        warnings: &mut Vec<Warning>,
    ) -> (Vec<TableGrid>, TableStrategy) {
        let lattice = self.detect(document, DetectionStrategy::Lattice, warnings);
        if !lattice.is_empty() {
            return (lattice, TableStrategy::Lattice);
        }

        log::info!("no lattice tables, falling back to stream detection");
        self.notify(|o| o.table_fallback());

        let stream = self.detect(document, DetectionStrategy::Stream, warnings);
        let strategy = if stream.is_empty() {
            TableStrategy::None
        } else {
            TableStrategy::Stream
        };
        (stream, strategy)
    }

    fn detect(
        &self,
        document: &Document<'_>,
        strategy: DetectionStrategy,
        warnings: &mut Vec<Warning>,
    ) -> Vec<TableGrid> {
        match self.table_detector.detect_tables(document, strategy) {
            Ok(tables) => {
                log::debug!("{} detection found {} tables", strategy, tables.len());
                tables
            }
            Err(e) => {
                self.warn(
                    warnings,
                    Warning::TableStrategy {
                        strategy,
                        message: e.to_string(),
                    },
                );
                Vec::new()
            }
        }
    }

    fn warn(&self, warnings: &mut Vec<Warning>, warning: Warning) {
        log::warn!("{}", warning);
        self.notify(|o| o.warning(&warning));
        warnings.push(warning);
    }

    fn notify(&self, event: impl FnOnce(&dyn ProgressObserver)) {
        if let Some(observer) = &self.observer {
            event(observer.as_ref());
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("options", &self.options)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapabilityError;
    use crate::parser::Bitmap;

    struct Pages(Vec<&'static str>);

    impl NativeTextExtractor for Pages {
        fn page_count(&self, _document: &Document<'_>) -> CapabilityResult<u32> {
            Ok(self.0.len() as u32)
        }

        fn extract_page_text(
            &self,
            _document: &Document<'_>,
            page: Page,
        ) -> CapabilityResult<String> {
            match self.0[page.index()] {
                "!" => Err(CapabilityError::page(page.number(), "broken")),
                text => Ok(text.to_string()),
            }
        }
    }

    struct Blank;

    impl PageRasterizer for Blank {
        fn rasterize_page(
            &self,
            _document: &Document<'_>,
            _page: Page,
            dpi: u32,
        ) -> CapabilityResult<Bitmap> {
            Ok(Bitmap {
                png: vec![1],
                width: 1,
                height: 1,
                dpi,
            })
        }
    }

    struct Echo;

    impl TextRecognizer for Echo {
        fn recognize_text(&self, bitmap: &Bitmap) -> CapabilityResult<String> {
            Ok(format!("ocr@{}", bitmap.dpi))
        }
    }

    struct NoTables;

    impl TableDetector for NoTables {
        fn detect_tables(
            &self,
            _document: &Document<'_>,
            _strategy: DetectionStrategy,
        ) -> CapabilityResult<Vec<TableGrid>> {
            Ok(vec![])
        }
    }

    fn extractor(pages: Vec<&'static str>) -> Extractor {
        Extractor::new()
            .with_native_text(Pages(pages))
            .with_rasterizer(Blank)
            .with_recognizer(Echo)
            .with_table_detector(NoTables)
    }

    #[test]
    fn test_rejects_non_pdf() {
        let result = extractor(vec!["a"]).extract(b"GIF89a");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_zero_pages_is_fatal() {
        let result = extractor(vec![]).extract(b"%PDF-1.4");
        assert!(matches!(result, Err(Error::DocumentOpen { .. })));
    }

    #[test]
    fn test_page_failure_recorded() {
        let report = extractor(vec!["one", "!", "three"])
            .extract(b"%PDF-1.4")
            .unwrap();
        assert_eq!(report.final_text(), "one\nthree\n");
        assert_eq!(
            report.warnings(),
            &[Warning::PageText {
                page: Page::new(2),
                message: "page 2: broken".into(),
            }]
        );
    }

    #[test]
    fn test_ocr_uses_configured_dpi() {
        let report = extractor(vec![""]).extract(b"%PDF-1.4").unwrap();
        assert_eq!(report.final_text(), "\n--- Page 1 ---\nocr@200");

        let options = ExtractOptions::new().with_ocr_dpi(300).sequential();
        let report = Extractor::with_options(options)
            .with_native_text(Pages(vec![""]))
            .with_rasterizer(Blank)
            .with_recognizer(Echo)
            .with_table_detector(NoTables)
            .extract(b"%PDF-1.4")
            .unwrap();
        assert_eq!(report.final_text(), "\n--- Page 1 ---\nocr@300");
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let pages = vec!["a", "", "c", "!", "e"];
        let parallel = extractor(pages.clone()).extract(b"%PDF-1.4").unwrap();
        let sequential = Extractor::with_options(ExtractOptions::new().sequential())
            .with_native_text(Pages(pages))
            .with_rasterizer(Blank)
            .with_recognizer(Echo)
            .with_table_detector(NoTables)
            .extract(b"%PDF-1.4")
            .unwrap();
        assert_eq!(parallel, sequential);
    }
}
