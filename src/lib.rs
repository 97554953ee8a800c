//! # pdfsheet
//!
//! Extract text and tables from digital or scanned PDFs into an XLSX
//! workbook.
//!
//! Text embedded in the document is used when there is enough of it;
//! otherwise each page is rasterized and run through OCR. Tables are
//! detected from ruling lines first and from column alignment only when no
//! ruled table exists. The result is one [`ExtractionReport`] which renders
//! to a workbook with a `Text` sheet and one `Table_N` sheet per table.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsheet::{extract_file, render};
//!
//! fn main() -> pdfsheet::Result<()> {
//!     let report = extract_file("scan.pdf")?;
//!     println!("{} tables, OCR used: {}", report.table_count(), report.used_ocr());
//!
//!     let download = render::to_download(&report, &render::WorkbookOptions::default())?;
//!     std::fs::write(&download.file_name, &download.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **OCR fallback**: pages are recognized when native text is shorter
//!   than a threshold (100 characters by default)
//! - **Table detection**: lattice (ruled) with a stream (whitespace) fallback
//! - **Pluggable capabilities**: every stage sits behind a trait
//! - **Parallel processing**: uses Rayon for multi-page documents
//! - **Async**: `extract_file_async` behind the `async` feature

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, is_pdf_bytes, PdfFormat};
pub use error::{CapabilityError, Error, Result};
pub use model::{
    DetectionStrategy, Document, ExtractionReport, OcrResult, Page, TableGrid, TableStrategy,
    TextResult, TextSource, Warning,
};
pub use parser::{
    Bitmap, ExtractOptions, NativeTextExtractor, OcrFailurePolicy, PageRasterizer, TableDetector,
    TextRecognizer,
};
pub use pipeline::{Extractor, ProgressObserver, Stage};
pub use render::{Download, JsonFormat, WorkbookOptions};

use std::io::Read;
use std::path::Path;

/// Extract text and tables from a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::extract_file;
///
/// let report = extract_file("document.pdf").unwrap();
/// println!("{}", report.final_text());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractionReport> {
    Extractor::new().extract_file(path)
}

/// Extract from a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::{extract_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new()
///     .with_ocr_dpi(300)
///     .sequential();
/// let report = extract_file_with_options("scan.pdf", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<ExtractionReport> {
    Extractor::with_options(options).extract_file(path)
}

/// Extract from PDF bytes.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::extract_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let report = extract_bytes(&data).unwrap();
/// ```
pub fn extract_bytes(data: &[u8]) -> Result<ExtractionReport> {
    Extractor::new().extract(data)
}

/// Extract from PDF bytes with custom options.
pub fn extract_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<ExtractionReport> {
    Extractor::with_options(options).extract(data)
}

/// Extract from a reader.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::extract_reader;
/// use std::fs::File;
///
/// let file = File::open("document.pdf").unwrap();
/// let report = extract_reader(file).unwrap();
/// ```
pub fn extract_reader<R: Read>(reader: R) -> Result<ExtractionReport> {
    Extractor::new().extract_reader(reader)
}

/// Extract from a reader with custom options.
pub fn extract_reader_with_options<R: Read>(
    reader: R,
    options: ExtractOptions,
) -> Result<ExtractionReport> {
    Extractor::with_options(options).extract_reader(reader)
}

/// Convert PDF bytes to a downloadable workbook in one call.
///
/// The `Text` sheet header comes from `options.text_header`.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::{convert_bytes, ExtractOptions};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let download = convert_bytes(&data, ExtractOptions::default()).unwrap();
/// std::fs::write(&download.file_name, &download.bytes).unwrap();
/// ```
pub fn convert_bytes(data: &[u8], options: ExtractOptions) -> Result<Download> {
    let workbook = WorkbookOptions::from(&options);
    let report = Extractor::with_options(options).extract(data)?;
    render::to_download(&report, &workbook)
}

/// Convert a PDF file to XLSX bytes.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::to_xlsx;
///
/// let xlsx = to_xlsx("document.pdf").unwrap();
/// std::fs::write("output.xlsx", xlsx).unwrap();
/// ```
pub fn to_xlsx<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let report = extract_file(path)?;
    render::to_xlsx(&report, &WorkbookOptions::default())
}

/// Convert a PDF file to a JSON report.
///
/// # Example
///
/// ```no_run
/// use pdfsheet::{to_json, JsonFormat};
///
/// let json = to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let report = extract_file(path)?;
    render::to_json(&report, format)
}

/// Extract from a PDF file without blocking the async runtime.
///
/// The file is read with `tokio::fs` and the pipeline runs on the blocking
/// thread pool.
#[cfg(feature = "async")]
pub async fn extract_file_async<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<ExtractionReport> {
    let data = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || Extractor::with_options(options).extract(&data)).await?
}
