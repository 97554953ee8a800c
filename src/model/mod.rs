//! Data model shared by the pipeline stages.
//!
//! Everything here lives for a single extraction request: a borrowed
//! [`Document`] goes in, an immutable [`ExtractionReport`] comes out.

mod document;
mod page;
mod report;
mod table;
mod text;

pub use document::Document;
pub use page::Page;
pub use report::{ExtractionReport, TextSource, Warning};
pub use table::{DetectionStrategy, TableGrid, TableStrategy};
pub use text::{page_header, OcrPage, OcrResult, TextFragment, TextResult};
