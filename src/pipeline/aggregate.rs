//! Combining stage outputs into the final report.

use crate::model::{ExtractionReport, TableGrid, TableStrategy, TextSource};

/// Pick the final text: native when it has any non-whitespace character,
/// OCR otherwise. The two are never combined.
pub fn select_text(native_text: String, ocr_text: String) -> (String, TextSource) {
    if !native_text.trim().is_empty() {
        (native_text, TextSource::Native)
    } else if !ocr_text.is_empty() {
        (ocr_text, TextSource::Ocr)
    } else {
        (String::new(), TextSource::None)
    }
}

/// Build the report from concatenated native text, concatenated OCR text,
/// and the tables of the winning strategy.
pub fn aggregate(
    native_text: String,
    ocr_text: String,
    tables: Vec<TableGrid>,
    table_strategy: TableStrategy,
) -> ExtractionReport {
    let (final_text, source) = select_text(native_text, ocr_text);
    ExtractionReport::new(final_text, source, tables, table_strategy)
}
