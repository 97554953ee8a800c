//! Page layout analysis over the lopdf object model.
//!
//! Walks each page's content stream once and records two things: text spans
//! with their position and size, and the straight path segments that can act
//! as table rulings. Native text extraction and both table-detection
//! strategies work from this layout.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::CapabilityError;
use crate::model::Page;

/// Approximate glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Filled rectangles thinner than this (points) are treated as rules.
const RULE_THICKNESS: f32 = 2.0;

/// A text span with position information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span, estimating its width from the glyph count.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A straight path segment, stored as its bounding coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Segment {
    /// Segment between two points.
    pub fn new(from: (f32, f32), to: (f32, f32)) -> Self {
        Self {
            x0: from.0.min(to.0),
            y0: from.1.min(to.1),
            x1: from.0.max(to.0),
            y1: from.1.max(to.1),
        }
    }

    /// Horizontal segment at `y` spanning `x0..x1`.
    pub fn horizontal(x0: f32, x1: f32, y: f32) -> Self {
        Self::new((x0, y), (x1, y))
    }

    /// Vertical segment at `x` spanning `y0..y1`.
    pub fn vertical(x: f32, y0: f32, y1: f32) -> Self {
        Self::new((x, y0), (x, y1))
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Runs left to right within `tolerance` of a constant Y.
    pub fn is_horizontal(&self, tolerance: f32) -> bool {
        self.height() <= tolerance && self.width() > tolerance
    }

    /// Runs bottom to top within `tolerance` of a constant X.
    pub fn is_vertical(&self, tolerance: f32) -> bool {
        self.width() <= tolerance && self.height() > tolerance
    }
}

/// Everything read from one page's content stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Text spans in content-stream order
    pub spans: Vec<TextSpan>,
    /// Stroked or filled straight segments
    pub segments: Vec<Segment>,
}

impl PageContent {
    /// Reading-order text of the page, one line per text line.
    pub fn text(&self) -> String {
        group_into_lines(&self.spans)
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Layout of one page, or the reason it could not be read.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub page: Page,
    pub content: Result<PageContent, CapabilityError>,
}

/// Layout of every page of a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// Parse PDF bytes and analyze every page.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CapabilityError> {
        let doc = LopdfDocument::load_mem(bytes)?;
        Self::from_lopdf(&doc)
    }

    /// Analyze every page of an already loaded document.
    ///
    /// Fails only when the document has no pages; an unreadable page is
    /// recorded on that page and the rest still get analyzed.
    pub fn from_lopdf(doc: &LopdfDocument) -> Result<Self, CapabilityError> {
        let page_ids = doc.get_pages();
        if page_ids.is_empty() {
            return Err(CapabilityError::Document(
                "document has no pages".to_string(),
            ));
        }

        let pages = page_ids
            .into_iter()
            .map(|(number, page_id)| {
                let content = read_page(doc, page_id).map_err(|e| {
                    log::debug!("layout: page {} unreadable: {}", number, e);
                    CapabilityError::page(number, e.to_string())
                });
                PageLayout {
                    page: Page::new(number),
                    content,
                }
            })
            .collect();

        Ok(Self { pages })
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Content of one page.
    pub fn page(&self, page: Page) -> Result<&PageContent, CapabilityError> {
        let layout = self.pages.get(page.index()).ok_or_else(|| {
            CapabilityError::page(
                page.number(),
                format!("out of range (document has {} pages)", self.pages.len()),
            )
        })?;
        layout.content.as_ref().map_err(Clone::clone)
    }
}

/// Read and walk the content stream of one page.
fn read_page(doc: &LopdfDocument, page_id: ObjectId) -> lopdf::Result<PageContent> {
    let data = page_content(doc, page_id)?;
    if data.is_empty() {
        return Ok(PageContent::default());
    }

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let content = Content::decode(&data)?;

    let mut walker = ContentWalker::new(doc, fonts);
    for op in &content.operations {
        walker.apply(op);
    }
    Ok(walker.finish())
}

/// Concatenated, decompressed content streams of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> lopdf::Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;

    // A page without /Contents is blank, not broken.
    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    let mut data = Vec::new();
    let refs: Vec<&Object> = match contents {
        Object::Array(arr) => arr.iter().collect(),
        other => vec![other],
    };

    for obj in refs {
        let stream = match obj {
            Object::Reference(r) => match doc.get_object(*r)? {
                Object::Stream(s) => s,
                _ => continue,
            },
            Object::Stream(s) => s,
            _ => continue,
        };
        // Uncompressed streams have no /Filter and fail to "decompress".
        let bytes = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        data.extend_from_slice(&bytes);
        data.push(b' ');
    }

    Ok(data)
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Matrix {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text object state (PDF 32000-1 §9.3, §9.4).
#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: Option<f32>,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: None,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // No TL seen: assume the usual 120% leading rather than overprinting.
        let leading = self.leading.unwrap_or(self.font_size * 1.2);
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

/// Path under construction, flushed into segments when painted.
#[derive(Debug, Default)]
struct PathBuilder {
    current: Option<(f32, f32)>,
    start: Option<(f32, f32)>,
    pending: Vec<Segment>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f32, f32)) {
        self.current = Some(p);
        self.start = Some(p);
    }

    fn line_to(&mut self, p: (f32, f32)) {
        if let Some(from) = self.current {
            self.pending.push(Segment::new(from, p));
        }
        self.current = Some(p);
    }

    fn curve_to(&mut self, p: (f32, f32)) {
        self.current = Some(p);
    }

    fn close(&mut self) {
        if let (Some(from), Some(start)) = (self.current, self.start) {
            if from != start {
                self.pending.push(Segment::new(from, start));
            }
        }
        self.current = self.start;
    }

    fn rect(&mut self, corners: [(f32, f32); 4]) {
        let xs = corners.map(|p| p.0);
        let ys = corners.map(|p| p.1);
        let left = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let right = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let bottom = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let top = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let width = right - left;
        let height = top - bottom;

        if height <= RULE_THICKNESS && width > RULE_THICKNESS {
            self.pending
                .push(Segment::horizontal(left, right, (bottom + top) / 2.0));
        } else if width <= RULE_THICKNESS && height > RULE_THICKNESS {
            self.pending
                .push(Segment::vertical((left + right) / 2.0, bottom, top));
        } else if width > RULE_THICKNESS && height > RULE_THICKNESS {
            self.pending.push(Segment::horizontal(left, right, bottom));
            self.pending.push(Segment::horizontal(left, right, top));
            self.pending.push(Segment::vertical(left, bottom, top));
            self.pending.push(Segment::vertical(right, bottom, top));
        }

        self.move_to(corners[0]);
    }

    fn take(&mut self) -> Vec<Segment> {
        self.current = None;
        self.start = None;
        std::mem::take(&mut self.pending)
    }
}

/// Interprets the subset of content-stream operators that affect text
/// position and straight-line geometry.
struct ContentWalker<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text: TextState,
    path: PathBuilder,
    spans: Vec<TextSpan>,
    segments: Vec<Segment>,
}

impl<'a> ContentWalker<'a> {
    fn new(doc: &'a LopdfDocument, fonts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text: TextState::default(),
            path: PathBuilder::default(),
            spans: Vec::new(),
            segments: Vec::new(),
        }
    }

    fn finish(self) -> PageContent {
        PageContent {
            spans: self.spans,
            segments: self.segments,
        }
    }

    fn point(&self, operands: &[Object], at: usize) -> Option<(f32, f32)> {
        let x = get_number(operands.get(at)?)?;
        let y = get_number(operands.get(at + 1)?)?;
        Some(self.ctm.apply(x, y))
    }

    fn apply(&mut self, op: &Operation) {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            // Graphics state
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.then(&self.ctm);
                }
            }

            // Text state and positioning
            "BT" => self.text.begin(),
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.text.font = name.clone();
                }
                if let Some(size) = operands.get(1).and_then(get_number) {
                    self.text.font_size = size;
                }
            }
            "TL" => self.text.leading = operands.first().and_then(get_number),
            "Td" | "TD" => {
                let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                if op.operator == "TD" {
                    self.text.leading = Some(-ty);
                }
                self.text.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text.line_matrix = m;
                    self.text.matrix = m;
                }
            }
            "T*" => self.text.next_line(),

            // Text showing
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.show(text);
                }
            }
            "'" => {
                self.text.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.show(text);
                }
            }
            "\"" => {
                self.text.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    let text = self.decode(bytes);
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.decode_array(items);
                    self.show(text);
                }
            }

            // Path construction
            "m" => {
                if let Some(p) = self.point(operands, 0) {
                    self.path.move_to(p);
                }
            }
            "l" => {
                if let Some(p) = self.point(operands, 0) {
                    self.path.line_to(p);
                }
            }
            "c" => {
                if let Some(p) = self.point(operands, 4) {
                    self.path.curve_to(p);
                }
            }
            "v" | "y" => {
                if let Some(p) = self.point(operands, 2) {
                    self.path.curve_to(p);
                }
            }
            "h" => self.path.close(),
            "re" => {
                let nums: Vec<f32> = operands.iter().filter_map(get_number).collect();
                if let [x, y, w, h] = nums[..] {
                    let corners = [
                        self.ctm.apply(x, y),
                        self.ctm.apply(x + w, y),
                        self.ctm.apply(x + w, y + h),
                        self.ctm.apply(x, y + h),
                    ];
                    self.path.rect(corners);
                }
            }

            // Path painting
            "s" | "b" | "b*" => {
                self.path.close();
                let segments = self.path.take();
                self.segments.extend(segments);
            }
            "S" | "f" | "F" | "f*" | "B" | "B*" => {
                let segments = self.path.take();
                self.segments.extend(segments);
            }
            "n" => {
                self.path.take();
            }
            _ => {}
        }
    }

    /// Decode a string operand with the current font's encoding.
    fn decode(&self, bytes: &[u8]) -> String {
        if let Some(font) = self.fonts.get(&self.text.font) {
            if let Ok(encoding) = font.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Decode a TJ array; large negative kerning counts as a word space.
    fn decode_array(&self, items: &[Object]) -> String {
        // 1/1000 text space units; ~0.2 em reads as a space in most fonts.
        let space_threshold = 200.0;
        let mut combined = String::new();

        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    if adjustment > space_threshold
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}')
                        && !combined.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        combined
    }

    fn show(&mut self, text: String) {
        let glyphs = text.chars().count() as f32;

        if !text.trim().is_empty() {
            let render = self.text.matrix.then(&self.ctm);
            let size = self.text.font_size * render.vertical_scale();
            self.spans
                .push(TextSpan::new(text, render.e, render.f, size));
        }

        self.text
            .advance(glyphs * self.text.font_size * AVG_GLYPH_WIDTH);
    }
}

/// A line of spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
}

impl TextLine {
    /// Create a line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        Self { spans, y }
    }

    /// Get the combined text of all spans with appropriate spacing.
    ///
    /// Inserts spaces between spans based on their X coordinate gaps.
    /// For CJK characters, no space is inserted between adjacent characters.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i == 0 {
                result.push_str(&span.text);
                continue;
            }

            let prev_span = &self.spans[i - 1];
            let gap = span.x - prev_span.right();

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * AVG_GLYPH_WIDTH
            };

            // A gap of more than 20% of a glyph separates words.
            let should_insert_space = gap > avg_char_width * 0.2 && {
                let prev_is_cjk = prev_span
                    .text
                    .chars()
                    .last()
                    .is_some_and(is_spaceless_script_char);
                let curr_is_cjk = span
                    .text
                    .chars()
                    .next()
                    .is_some_and(is_spaceless_script_char);
                !(prev_is_cjk && curr_is_cjk)
            };

            let prev_ends_with_space =
                prev_span.text.ends_with(' ') || prev_span.text.ends_with('\u{00A0}');
            let curr_starts_with_space =
                span.text.starts_with(' ') || span.text.starts_with('\u{00A0}');

            if should_insert_space && !prev_ends_with_space && !curr_starts_with_space {
                result.push(' ');
            }

            result.push_str(&span.text);
        }

        result
    }
}

/// Group spans into lines, top of the page first.
pub fn group_into_lines(spans: &[TextSpan]) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Sort spans by Y (descending, since PDF Y is bottom-up) then X
    let mut spans = spans.to_vec();
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn int(i: i64) -> Object {
        Object::Integer(i)
    }

    fn walk(ops: &[Operation]) -> PageContent {
        let doc = LopdfDocument::new();
        let mut walker = ContentWalker::new(&doc, BTreeMap::new());
        for op in ops {
            walker.apply(op);
        }
        walker.finish()
    }

    #[test]
    fn test_matrix_then() {
        let scale = Matrix {
            a: 2.0,
            d: 2.0,
            ..Matrix::IDENTITY
        };
        let m = Matrix::translation(10.0, 5.0).then(&scale);
        assert_eq!(m.apply(0.0, 0.0), (20.0, 10.0));
        assert_eq!(m.vertical_scale(), 2.0);
    }

    #[test]
    fn test_walker_text_position() {
        let content = walk(&[
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), int(10)]),
            op("Td", vec![int(72), int(700)]),
            op("Tj", vec![Object::string_literal("Hello")]),
            op("ET", vec![]),
        ]);

        assert_eq!(content.spans.len(), 1);
        let span = &content.spans[0];
        assert_eq!(span.text, "Hello");
        assert_eq!((span.x, span.y), (72.0, 700.0));
        assert_eq!(span.font_size, 10.0);
    }

    #[test]
    fn test_walker_applies_ctm() {
        let content = walk(&[
            op("q", vec![]),
            op("cm", vec![int(1), int(0), int(0), int(1), int(50), int(100)]),
            op("BT", vec![]),
            op("Td", vec![int(10), int(20)]),
            op("Tj", vec![Object::string_literal("X")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Td", vec![int(10), int(20)]),
            op("Tj", vec![Object::string_literal("Y")]),
            op("ET", vec![]),
        ]);

        assert_eq!((content.spans[0].x, content.spans[0].y), (60.0, 120.0));
        assert_eq!((content.spans[1].x, content.spans[1].y), (10.0, 20.0));
    }

    #[test]
    fn test_walker_rect_edges() {
        let content = walk(&[
            op("re", vec![int(100), int(100), int(200), int(50)]),
            op("S", vec![]),
        ]);

        assert_eq!(content.segments.len(), 4);
        let horizontal = content
            .segments
            .iter()
            .filter(|s| s.is_horizontal(0.5))
            .count();
        assert_eq!(horizontal, 2);
    }

    #[test]
    fn test_walker_thin_rect_is_rule() {
        let content = walk(&[
            op("re", vec![int(100), int(300), int(200), Object::Real(0.5)]),
            op("f", vec![]),
        ]);

        assert_eq!(content.segments.len(), 1);
        assert!(content.segments[0].is_horizontal(1.0));
        assert_eq!(content.segments[0].width(), 200.0);
    }

    #[test]
    fn test_walker_lines_and_discard() {
        let content = walk(&[
            op("m", vec![int(0), int(0)]),
            op("l", vec![int(0), int(100)]),
            op("S", vec![]),
            op("m", vec![int(0), int(0)]),
            op("l", vec![int(100), int(0)]),
            op("n", vec![]),
        ]);

        assert_eq!(content.segments, vec![Segment::vertical(0.0, 0.0, 100.0)]);
    }

    #[test]
    fn test_tj_array_spacing() {
        let content = walk(&[
            op("BT", vec![]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hello"),
                    int(-250),
                    Object::string_literal("World"),
                    int(-50),
                    Object::string_literal("!"),
                ])],
            ),
            op("ET", vec![]),
        ]);

        assert_eq!(content.spans[0].text, "Hello World!");
    }

    #[test]
    fn test_group_into_lines() {
        let spans = vec![
            TextSpan::new("World", 50.0, 700.0, 10.0),
            TextSpan::new("Hello", 10.0, 700.0, 10.0),
            TextSpan::new("Second", 10.0, 680.0, 10.0),
        ];

        let lines = group_into_lines(&spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello World");
        assert_eq!(lines[1].text(), "Second");
    }

    #[test]
    fn test_adjacent_glyphs_not_spaced() {
        // "Hel" ends at 10 + 3 * 5 = 25, "lo" starts right there.
        let line = TextLine::from_spans(vec![
            TextSpan::new("Hel", 10.0, 700.0, 10.0),
            TextSpan::new("lo", 25.0, 700.0, 10.0),
        ]);
        assert_eq!(line.text(), "Hello");
    }

    #[test]
    fn test_page_content_text() {
        let content = PageContent {
            spans: vec![
                TextSpan::new("Beta", 10.0, 600.0, 12.0),
                TextSpan::new("Alpha", 10.0, 700.0, 12.0),
            ],
            segments: vec![],
        };
        assert_eq!(content.text(), "Alpha\nBeta");
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(
            decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]),
            "Hi"
        );
    }

    #[test]
    fn test_out_of_range_page() {
        let layout = DocumentLayout {
            pages: vec![PageLayout {
                page: Page::new(1),
                content: Ok(PageContent::default()),
            }],
        };
        assert!(layout.page(Page::new(1)).is_ok());
        assert!(matches!(
            layout.page(Page::new(2)),
            Err(CapabilityError::Page { page: 2, .. })
        ));
    }
}
