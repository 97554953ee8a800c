//! JSON rendering for extraction reports.

use crate::error::Result;
use crate::model::ExtractionReport;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a report to JSON.
pub fn to_json(report: &ExtractionReport, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(report)?,
        JsonFormat::Compact => serde_json::to_string(report)?,
    };
    Ok(json)
}
