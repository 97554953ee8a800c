//! Extraction pipeline.
//!
//! The [`Extractor`] drives the capabilities in a fixed order: native text
//! for every page, OCR when that text is too short, then lattice table
//! detection with a single stream fallback. [`aggregate`] turns the stage
//! outputs into an [`ExtractionReport`](crate::ExtractionReport).

mod aggregate;
mod observer;
mod orchestrator;
mod scratch;

pub use aggregate::{aggregate, select_text};
pub use observer::{NoopObserver, ProgressObserver, Stage};
pub use orchestrator::Extractor;
pub use scratch::ScratchFile;
