//! Rendering of extraction reports.
//!
//! The workbook is the deliverable; JSON is offered for callers that want
//! the report itself.

mod json;
mod options;
mod workbook;

pub use json::{to_json, JsonFormat};
pub use options::{WorkbookOptions, DEFAULT_FILE_NAME};
pub use workbook::{
    column_name, table_sheet_name, to_download, to_xlsx, Download, Sheet, Workbook, TEXT_SHEET,
    XLSX_MIME_TYPE,
};
