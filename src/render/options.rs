//! Workbook rendering options.

use crate::parser::{ExtractOptions, DEFAULT_TEXT_HEADER};

/// Default file name offered with a workbook download.
pub const DEFAULT_FILE_NAME: &str = "pdf_extracted_data.xlsx";

/// Options for rendering an extraction report as a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookOptions {
    /// Column header written above the text on the `Text` sheet
    pub text_header: String,

    /// File name used by [`to_download`](super::to_download)
    pub file_name: String,

    /// Write `docProps/core.xml` with creator and creation time
    pub document_properties: bool,

    /// Column width of the text column, in characters
    pub text_column_width: f64,
}

impl WorkbookOptions {
    /// Create new workbook options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header label of the `Text` sheet.
    pub fn with_text_header(mut self, label: impl Into<String>) -> Self {
        self.text_header = label.into();
        self
    }

    /// Set the download file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Include or omit document properties.
    pub fn with_document_properties(mut self, include: bool) -> Self {
        self.document_properties = include;
        self
    }

    /// Set the width of the text column.
    pub fn with_text_column_width(mut self, width: f64) -> Self {
        self.text_column_width = width;
        self
    }
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            text_header: DEFAULT_TEXT_HEADER.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            document_properties: true,
            text_column_width: 100.0,
        }
    }
}

impl From<&ExtractOptions> for WorkbookOptions {
    fn from(options: &ExtractOptions) -> Self {
        Self::default().with_text_header(options.text_header.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = WorkbookOptions::default();
        assert_eq!(options.text_header, "Extracted Text");
        assert_eq!(options.file_name, "pdf_extracted_data.xlsx");
        assert!(options.document_properties);
    }

    #[test]
    fn test_header_follows_extract_options() {
        let extract = ExtractOptions::new().with_text_header("Text (OCR enabled)");
        let options = WorkbookOptions::from(&extract);
        assert_eq!(options.text_header, "Text (OCR enabled)");
        assert_eq!(options.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_builder_and_comparison() {
        let options = WorkbookOptions::new()
            .with_file_name("report.xlsx")
            .with_document_properties(false)
            .with_text_column_width(80.5);
        assert_eq!(options.text_column_width, 80.5);
        assert_eq!(options.clone(), options);
        assert_ne!(options, WorkbookOptions::default());
    }
}
