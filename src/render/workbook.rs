//! XLSX rendering.
//!
//! The workbook is written as a SpreadsheetML package directly into a zip
//! container. Every cell, blank ones included, is a shared string. The
//! layout is fixed:
//!
//! * `Text`: the header label in `A1` and the final text in `A2`.
//! * `Table_1` .. `Table_N`: one sheet per detected table, rows written
//!   verbatim starting at `A1`, with no synthetic header row and no index
//!   column.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::{Error as XmlError, Writer};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::model::ExtractionReport;

use super::options::WorkbookOptions;

/// MIME type of an XLSX workbook.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Name of the sheet holding the final text.
pub const TEXT_SHEET: &str = "Text";

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const CORE_PROPERTIES_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";

const STYLE_DEFAULT: u32 = 0;
const STYLE_HEADER: u32 = 1;
const STYLE_WRAPPED: u32 = 2;

type XmlWriter = Writer<Vec<u8>>;

/// Name of the sheet holding the table with the given 1-based index.
pub fn table_sheet_name(index: usize) -> String {
    format!("Table_{}", index)
}

/// One worksheet: a name and rows of string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<String>>,
    header_rows: usize,
    wrap_text: bool,
    column_width: Option<f64>,
}

impl Sheet {
    /// Create a sheet with plain rows.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
            header_rows: 0,
            wrap_text: false,
            column_width: None,
        }
    }

    /// Sheet name as shown in the workbook.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows in write order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn style_for(&self, row: usize) -> u32 {
        if row < self.header_rows {
            STYLE_HEADER
        } else if self.wrap_text {
            STYLE_WRAPPED
        } else {
            STYLE_DEFAULT
        }
    }
}

/// An in-memory workbook ready to be serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    created: Option<DateTime<Utc>>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            created: None,
        }
    }

    /// Lay out a report: the `Text` sheet first, then one sheet per table.
    pub fn from_report(report: &ExtractionReport, options: &WorkbookOptions) -> Self {
        let mut workbook = Self::new();
        if options.document_properties {
            workbook.created = Some(Utc::now());
        }

        workbook.sheets.push(Sheet {
            name: TEXT_SHEET.to_string(),
            rows: vec![
                vec![options.text_header.clone()],
                vec![report.final_text().to_string()],
            ],
            header_rows: 1,
            wrap_text: true,
            column_width: Some(options.text_column_width),
        });

        for (index, table) in report.numbered_tables() {
            workbook.add_sheet(Sheet::new(table_sheet_name(index), table.rows().to_vec()));
        }

        workbook
    }

    /// Append a sheet.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Serialize the workbook to XLSX bytes.
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        if self.sheets.is_empty() {
            return Err(Error::Serialization(
                "a workbook needs at least one sheet".to_string(),
            ));
        }

        let mut strings = SharedStrings::default();
        let worksheets = self
            .sheets
            .iter()
            .map(|sheet| worksheet_xml(sheet, &mut strings))
            .collect::<Result<Vec<_>>>()?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        write_part(&mut zip, options, "[Content_Types].xml", &self.content_types_xml()?)?;
        write_part(&mut zip, options, "_rels/.rels", &self.root_rels_xml()?)?;
        write_part(&mut zip, options, "xl/workbook.xml", &self.workbook_xml()?)?;
        write_part(
            &mut zip,
            options,
            "xl/_rels/workbook.xml.rels",
            &self.workbook_rels_xml()?,
        )?;
        write_part(&mut zip, options, "xl/styles.xml", &styles_xml()?)?;
        write_part(&mut zip, options, "xl/sharedStrings.xml", &strings.to_xml()?)?;
        for (i, xml) in worksheets.iter().enumerate() {
            let name = format!("xl/worksheets/sheet{}.xml", i + 1);
            write_part(&mut zip, options, &name, xml)?;
        }
        if let Some(created) = self.created {
            write_part(&mut zip, options, "docProps/core.xml", &core_xml(created)?)?;
        }

        let cursor = zip.finish()?;
        let bytes = cursor.into_inner();
        log::debug!(
            "workbook: {} sheets, {} shared strings, {} bytes",
            self.sheets.len(),
            strings.unique_count(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn content_types_xml(&self) -> Result<Vec<u8>> {
        xml_part(|w| {
            w.create_element("Types")
                .with_attribute(("xmlns", CONTENT_TYPES_NS))
                .write_inner_content::<_, XmlError>(|w| {
                    for (extension, content_type) in [("rels", CT_RELS), ("xml", "application/xml")] {
                        w.create_element("Default")
                            .with_attribute(("Extension", extension))
                            .with_attribute(("ContentType", content_type))
                            .write_empty()?;
                    }

                    let mut overrides = vec![("/xl/workbook.xml".to_string(), CT_WORKBOOK)];
                    for i in 1..=self.sheets.len() {
                        overrides.push((format!("/xl/worksheets/sheet{}.xml", i), CT_WORKSHEET));
                    }
                    overrides.push(("/xl/styles.xml".to_string(), CT_STYLES));
                    overrides.push(("/xl/sharedStrings.xml".to_string(), CT_SHARED_STRINGS));
                    if self.created.is_some() {
                        overrides.push(("/docProps/core.xml".to_string(), CT_CORE));
                    }

                    for (part, content_type) in &overrides {
                        w.create_element("Override")
                            .with_attribute(("PartName", part.as_str()))
                            .with_attribute(("ContentType", *content_type))
                            .write_empty()?;
                    }
                    Ok(())
                })?;
            Ok(())
        })
    }

    fn root_rels_xml(&self) -> Result<Vec<u8>> {
        let mut rels = vec![(
            format!("{}/officeDocument", REL_NS),
            "xl/workbook.xml".to_string(),
        )];
        if self.created.is_some() {
            rels.push((
                format!("{}/metadata/core-properties", PACKAGE_REL_NS),
                "docProps/core.xml".to_string(),
            ));
        }
        relationships_xml(&rels)
    }

    fn workbook_xml(&self) -> Result<Vec<u8>> {
        xml_part(|w| {
            w.create_element("workbook")
                .with_attribute(("xmlns", MAIN_NS))
                .with_attribute(("xmlns:r", REL_NS))
                .write_inner_content::<_, XmlError>(|w| {
                    w.create_element("sheets").write_inner_content::<_, XmlError>(|w| {
                        for (i, sheet) in self.sheets.iter().enumerate() {
                            let id = (i + 1).to_string();
                            let rel = format!("rId{}", i + 1);
                            let name = xml_chars(&sheet.name);
                            w.create_element("sheet")
                                .with_attribute(("name", name.as_ref()))
                                .with_attribute(("sheetId", id.as_str()))
                                .with_attribute(("r:id", rel.as_str()))
                                .write_empty()?;
                        }
                        Ok(())
                    })?;
                    Ok(())
                })?;
            Ok(())
        })
    }

    fn workbook_rels_xml(&self) -> Result<Vec<u8>> {
        let mut rels: Vec<(String, String)> = (1..=self.sheets.len())
            .map(|i| {
                (
                    format!("{}/worksheet", REL_NS),
                    format!("worksheets/sheet{}.xml", i),
                )
            })
            .collect();
        rels.push((format!("{}/styles", REL_NS), "styles.xml".to_string()));
        rels.push((
            format!("{}/sharedStrings", REL_NS),
            "sharedStrings.xml".to_string(),
        ));
        relationships_xml(&rels)
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// A serialized workbook with what a caller needs to offer it for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// XLSX bytes
    pub bytes: Vec<u8>,
    /// Suggested file name
    pub file_name: String,
    /// MIME type of `bytes`
    pub mime_type: &'static str,
}

/// Convert a report to XLSX bytes.
pub fn to_xlsx(report: &ExtractionReport, options: &WorkbookOptions) -> Result<Vec<u8>> {
    Workbook::from_report(report, options).to_xlsx()
}

/// Convert a report to a downloadable workbook.
pub fn to_download(report: &ExtractionReport, options: &WorkbookOptions) -> Result<Download> {
    Ok(Download {
        bytes: to_xlsx(report, options)?,
        file_name: options.file_name.clone(),
        mime_type: XLSX_MIME_TYPE,
    })
}

fn write_part(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    name: &str,
    content: &[u8],
) -> Result<()> {
    zip.start_file(name, options)?;
    zip.write_all(content)
        .map_err(|e| Error::Serialization(format!("cannot write {}: {}", name, e)))
}

/// Build one XML part: the standalone declaration followed by `body`.
fn xml_part<F>(body: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut XmlWriter) -> quick_xml::Result<()>,
{
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    body(&mut writer)?;
    Ok(writer.into_inner())
}

/// A relationships part; ids are assigned in order from `rId1`.
fn relationships_xml(rels: &[(String, String)]) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("Relationships")
            .with_attribute(("xmlns", PACKAGE_REL_NS))
            .write_inner_content::<_, XmlError>(|w| {
                for (i, (rel_type, target)) in rels.iter().enumerate() {
                    let id = format!("rId{}", i + 1);
                    w.create_element("Relationship")
                        .with_attribute(("Id", id.as_str()))
                        .with_attribute(("Type", rel_type.as_str()))
                        .with_attribute(("Target", target.as_str()))
                        .write_empty()?;
                }
                Ok(())
            })?;
        Ok(())
    })
}

/// Shared string table, deduplicated in first-seen order.
#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, usize>,
    total: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> usize {
        self.total += 1;
        if let Some(&i) = self.index.get(value) {
            return i;
        }
        let i = self.strings.len();
        self.strings.push(value.to_string());
        self.index.insert(value.to_string(), i);
        i
    }

    fn unique_count(&self) -> usize {
        self.strings.len()
    }

    fn to_xml(&self) -> Result<Vec<u8>> {
        let count = self.total.to_string();
        let unique = self.strings.len().to_string();
        xml_part(|w| {
            w.create_element("sst")
                .with_attribute(("xmlns", MAIN_NS))
                .with_attribute(("count", count.as_str()))
                .with_attribute(("uniqueCount", unique.as_str()))
                .write_inner_content::<_, XmlError>(|w| {
                    for s in &self.strings {
                        w.create_element("si").write_inner_content::<_, XmlError>(|w| {
                            w.create_element("t")
                                .with_attribute(("xml:space", "preserve"))
                                .write_text_content(BytesText::new(&xml_chars(s)))?;
                            Ok(())
                        })?;
                    }
                    Ok(())
                })?;
            Ok(())
        })
    }
}

fn worksheet_xml(sheet: &Sheet, strings: &mut SharedStrings) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("worksheet")
            .with_attribute(("xmlns", MAIN_NS))
            .write_inner_content::<_, XmlError>(|w| {
                if let Some(width) = sheet.column_width {
                    let width = width.to_string();
                    w.create_element("cols").write_inner_content::<_, XmlError>(|w| {
                        w.create_element("col")
                            .with_attributes([
                                ("min", "1"),
                                ("max", "1"),
                                ("width", width.as_str()),
                                ("customWidth", "1"),
                            ])
                            .write_empty()?;
                        Ok(())
                    })?;
                }

                if sheet.rows.is_empty() {
                    w.create_element("sheetData").write_empty()?;
                    return Ok(());
                }

                w.create_element("sheetData").write_inner_content::<_, XmlError>(|w| {
                    for (r, row) in sheet.rows.iter().enumerate() {
                        write_row(w, r + 1, row, sheet.style_for(r), strings)?;
                    }
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(())
    })
}

fn write_row(
    w: &mut XmlWriter,
    row_number: usize,
    cells: &[String],
    style: u32,
    strings: &mut SharedStrings,
) -> quick_xml::Result<()> {
    let number = row_number.to_string();
    let style = style.to_string();
    w.create_element("row")
        .with_attribute(("r", number.as_str()))
        .write_inner_content::<_, XmlError>(|w| {
            for (c, value) in cells.iter().enumerate() {
                let reference = format!("{}{}", column_name(c), row_number);
                let index = strings.intern(value).to_string();

                let mut cell = w
                    .create_element("c")
                    .with_attribute(("r", reference.as_str()));
                if style != "0" {
                    cell = cell.with_attribute(("s", style.as_str()));
                }
                cell.with_attribute(("t", "s")).write_inner_content::<_, XmlError>(|w| {
                    w.create_element("v")
                        .write_text_content(BytesText::new(&index))?;
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    Ok(())
}

fn core_xml(created: DateTime<Utc>) -> Result<Vec<u8>> {
    let stamp = created.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    xml_part(|w| {
        w.create_element("cp:coreProperties")
            .with_attributes([
                ("xmlns:cp", CORE_PROPERTIES_NS),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:dcterms", "http://purl.org/dc/terms/"),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ])
            .write_inner_content::<_, XmlError>(|w| {
                w.create_element("dc:creator")
                    .write_text_content(BytesText::new("pdfsheet"))?;
                for name in ["dcterms:created", "dcterms:modified"] {
                    w.create_element(name)
                        .with_attribute(("xsi:type", "dcterms:W3CDTF"))
                        .write_text_content(BytesText::new(&stamp))?;
                }
                Ok(())
            })?;
        Ok(())
    })
}

/// Styles: 0 default, 1 bold header, 2 top-aligned wrapped text.
fn styles_xml() -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("styleSheet")
            .with_attribute(("xmlns", MAIN_NS))
            .write_inner_content::<_, XmlError>(|w| {
                w.create_element("fonts")
                    .with_attribute(("count", "2"))
                    .write_inner_content::<_, XmlError>(|w| {
                        for bold in [false, true] {
                            w.create_element("font").write_inner_content::<_, XmlError>(|w| {
                                if bold {
                                    w.create_element("b").write_empty()?;
                                }
                                w.create_element("sz")
                                    .with_attribute(("val", "11"))
                                    .write_empty()?;
                                w.create_element("name")
                                    .with_attribute(("val", "Calibri"))
                                    .write_empty()?;
                                Ok(())
                            })?;
                        }
                        Ok(())
                    })?;

                w.create_element("fills")
                    .with_attribute(("count", "2"))
                    .write_inner_content::<_, XmlError>(|w| {
                        for pattern in ["none", "gray125"] {
                            w.create_element("fill").write_inner_content::<_, XmlError>(|w| {
                                w.create_element("patternFill")
                                    .with_attribute(("patternType", pattern))
                                    .write_empty()?;
                                Ok(())
                            })?;
                        }
                        Ok(())
                    })?;

                w.create_element("borders")
                    .with_attribute(("count", "1"))
                    .write_inner_content::<_, XmlError>(|w| {
                        w.create_element("border").write_inner_content::<_, XmlError>(|w| {
                            for side in ["left", "right", "top", "bottom", "diagonal"] {
                                w.create_element(side).write_empty()?;
                            }
                            Ok(())
                        })?;
                        Ok(())
                    })?;

                let base = [
                    ("numFmtId", "0"),
                    ("fontId", "0"),
                    ("fillId", "0"),
                    ("borderId", "0"),
                ];
                w.create_element("cellStyleXfs")
                    .with_attribute(("count", "1"))
                    .write_inner_content::<_, XmlError>(|w| {
                        w.create_element("xf").with_attributes(base).write_empty()?;
                        Ok(())
                    })?;

                w.create_element("cellXfs")
                    .with_attribute(("count", "3"))
                    .write_inner_content::<_, XmlError>(|w| {
                        w.create_element("xf")
                            .with_attributes(base)
                            .with_attribute(("xfId", "0"))
                            .write_empty()?;
                        w.create_element("xf")
                            .with_attributes([
                                ("numFmtId", "0"),
                                ("fontId", "1"),
                                ("fillId", "0"),
                                ("borderId", "0"),
                                ("xfId", "0"),
                                ("applyFont", "1"),
                            ])
                            .write_empty()?;
                        w.create_element("xf")
                            .with_attributes(base)
                            .with_attribute(("xfId", "0"))
                            .with_attribute(("applyAlignment", "1"))
                            .write_inner_content::<_, XmlError>(|w| {
                                w.create_element("alignment")
                                    .with_attribute(("vertical", "top"))
                                    .with_attribute(("wrapText", "1"))
                                    .write_empty()?;
                                Ok(())
                            })?;
                        Ok(())
                    })?;

                w.create_element("cellStyles")
                    .with_attribute(("count", "1"))
                    .write_inner_content::<_, XmlError>(|w| {
                        w.create_element("cellStyle")
                            .with_attributes([("name", "Normal"), ("xfId", "0"), ("builtinId", "0")])
                            .write_empty()?;
                        Ok(())
                    })?;
                Ok(())
            })?;
        Ok(())
    })
}

/// Spreadsheet column letters for a 0-based index (0 = `A`, 26 = `AA`).
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Drop characters XML 1.0 cannot carry. Escaping is left to the writer.
fn xml_chars(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}
