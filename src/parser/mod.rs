//! PDF capabilities: contracts and their default implementations.

mod backend;
pub mod layout;
mod native;
mod ocr;
mod options;
mod raster;
mod table_detector;

pub use backend::{
    Bitmap, CapabilityResult, NativeTextExtractor, PageRasterizer, TableDetector, TextRecognizer,
};
pub use layout::{DocumentLayout, PageContent, Segment, TextLine, TextSpan};
pub use native::LopdfBackend;
pub use ocr::TesseractCommand;
pub use options::{
    ExtractOptions, OcrFailurePolicy, DEFAULT_OCR_DPI, DEFAULT_OCR_THRESHOLD, DEFAULT_TEXT_HEADER,
};
pub use raster::EmbeddedImageRasterizer;
pub use table_detector::{
    DetectedTable, LatticeConfig, LatticeDetector, RuledGrid, StreamConfig, StreamDetector,
    TableRowData,
};
