//! Table detection from page layout.
//!
//! Two strategies, both inspired by Camelot:
//!
//! - **Lattice** builds cells from ruling lines drawn on the page and drops
//!   each text span into the cell that contains it.
//! - **Stream** infers columns from how text left edges line up across rows,
//!   for tables drawn without any lines.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::TableGrid;

use super::layout::{group_into_lines, PageContent, Segment, TextLine, TextSpan};

/// A detected table region with its content.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Right X boundary
    pub right_x: f32,
    /// Detected column boundaries (X coordinates)
    pub columns: Vec<f32>,
    /// Rows of text spans grouped by Y position
    pub rows: Vec<TableRowData>,
}

/// A row of text spans in a table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Y position of this row
    pub y: f32,
    /// Spans in this row, sorted by X
    pub spans: Vec<TextSpan>,
}

/// Stream detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects whitespace-aligned tables in a list of text spans.
#[derive(Debug, Clone, Default)]
pub struct StreamDetector {
    config: StreamConfig,
}

impl StreamDetector {
    /// Create a new stream detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new stream detector with custom configuration.
    pub fn with_config(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Tables on one page, top first.
    pub fn detect_page(&self, content: &PageContent) -> Vec<TableGrid> {
        self.detect(&content.spans)
            .iter()
            .map(|table| self.to_grid(table))
            .collect()
    }

    /// Detect table regions in the given spans.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        log::trace!("stream: starting with {} spans", spans.len());

        if spans.len() < self.config.min_rows * self.config.min_columns {
            return vec![];
        }

        // Step 1: Group spans into rows by Y position
        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return vec![];
        }

        // Step 2: Detect column boundaries from text edges
        let columns = self.detect_columns(&rows);
        log::trace!(
            "stream: {} rows, columns at {:?}",
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return vec![];
        }

        // Step 3: Contiguous rows with consistent column alignment
        let regions = self.find_table_regions(&rows, &columns);

        // Step 4: Convert regions to detected tables
        let mut detected = Vec::new();
        for (start_row, end_row) in regions {
            let table_rows: Vec<TableRowData> = rows[start_row..=end_row].to_vec();
            if table_rows.is_empty() {
                continue;
            }

            // Re-detect columns for this specific region
            let table_columns = self.detect_columns(&table_rows);
            if table_columns.len() < self.config.min_columns {
                continue;
            }
            if table_columns.len() > self.config.max_columns {
                log::trace!(
                    "stream: skipping region, too many columns ({} > {})",
                    table_columns.len(),
                    self.config.max_columns
                );
                continue;
            }
            if self.is_list_pattern(&table_rows, &table_columns) {
                log::trace!("stream: skipping region, detected as list pattern");
                continue;
            }

            let right_x = table_rows
                .iter()
                .flat_map(|r| r.spans.iter())
                .map(TextSpan::right)
                .fold(f32::NEG_INFINITY, f32::max);

            detected.push(DetectedTable {
                right_x,
                columns: table_columns,
                rows: table_rows,
            });
        }

        detected
    }

    /// Group spans into rows by Y position.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        if spans.is_empty() {
            return vec![];
        }

        // Sort by Y (descending for PDF coords) then X
        let mut sorted_spans = spans.to_vec();
        sorted_spans.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut rows: Vec<TableRowData> = Vec::new();
        let mut current_row_spans: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted_spans {
            let y_tolerance = span.font_size * self.config.y_tolerance_factor;

            match current_y {
                Some(y) if (span.y - y).abs() <= y_tolerance => {
                    current_row_spans.push(span);
                }
                _ => {
                    if !current_row_spans.is_empty() {
                        rows.push(row_from_spans(std::mem::take(&mut current_row_spans)));
                    }
                    current_y = Some(span.y);
                    current_row_spans.push(span);
                }
            }
        }

        if !current_row_spans.is_empty() {
            rows.push(row_from_spans(current_row_spans));
        }

        rows
    }

    /// Detect column boundaries from text left edges.
    ///
    /// Rows with two or more spans are the likely table rows; edges are
    /// counted once per row and kept when they recur often enough. With too
    /// few such rows every span's edge counts instead.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        if rows.is_empty() {
            return vec![];
        }

        let multi_span_rows: Vec<&TableRowData> =
            rows.iter().filter(|r| r.spans.len() >= 2).collect();

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        let row_total = if multi_span_rows.len() < self.config.min_rows {
            for row in rows {
                for span in &row.spans {
                    *edge_counts.entry(edge_bucket(span.x)).or_insert(0) += 1;
                }
            }
            rows.len()
        } else {
            for row in &multi_span_rows {
                let row_buckets: HashSet<i32> =
                    row.spans.iter().map(|span| edge_bucket(span.x)).collect();
                for bucket in row_buckets {
                    *edge_counts.entry(bucket).or_insert(0) += 1;
                }
            }
            multi_span_rows.len()
        };

        let min_occurrences =
            ((row_total as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut column_edges: Vec<f32> = edge_counts
            .iter()
            .filter(|(_, count)| **count >= min_occurrences)
            .map(|(bucket, _)| *bucket as f32 * EDGE_BUCKET)
            .collect();
        column_edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // Merge close edges
        let mut merged_edges: Vec<f32> = Vec::new();
        for edge in column_edges {
            match merged_edges.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged_edges.push(edge),
            }
        }

        merged_edges
    }

    /// Find contiguous row regions that form tables.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        if rows.is_empty() || columns.len() < self.config.min_columns {
            return vec![];
        }

        let mut regions: Vec<(usize, usize)> = Vec::new();
        let mut current_start: Option<usize> = None;
        let mut consecutive_table_rows = 0;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                if current_start.is_none() {
                    current_start = Some(i);
                }
                consecutive_table_rows += 1;
            } else {
                if let Some(start) = current_start {
                    if consecutive_table_rows >= self.config.min_rows {
                        regions.push((start, i - 1));
                    }
                }
                current_start = None;
                consecutive_table_rows = 0;
            }
        }

        if let Some(start) = current_start {
            if consecutive_table_rows >= self.config.min_rows {
                regions.push((start, rows.len() - 1));
            }
        }

        regions
    }

    /// Convert a detected region into a grid, one cell per column.
    pub fn to_grid(&self, detected: &DetectedTable) -> TableGrid {
        let columns = &detected.columns;
        let mut grid = TableGrid::new();

        for row in &detected.rows {
            let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for span in &row.spans {
                let col = find_column_for_span(span.x, columns, detected.right_x);
                if let Some(cell) = cells.get_mut(col) {
                    cell.push(span.text.trim());
                }
            }
            grid.push_row(cells.into_iter().map(|parts| parts.join(" ")).collect());
        }

        grid
    }

    /// Check if detected table rows actually represent a numbered or bulleted list.
    ///
    /// When a PDF has a numbered list like "1. Item", the number and text often
    /// become separate spans at different X positions, which looks like a
    /// multi-column table.
    fn is_list_pattern(&self, rows: &[TableRowData], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullet_count = 0;
        let mut number_count = 0;

        for row in rows {
            // Rows keep their spans sorted by X, so the first is leftmost.
            if let Some(span) = row.spans.first() {
                let text = span.text.trim();
                if is_bullet_marker(text) {
                    bullet_count += 1;
                } else if is_number_marker(text) {
                    number_count += 1;
                }
            }
        }

        let bullet_ratio = bullet_count as f32 / rows.len() as f32;
        let total_ratio = (bullet_count + number_count) as f32 / rows.len() as f32;

        // Bullet markers are almost never real table data
        if bullet_ratio >= 0.5 {
            return true;
        }

        // Numbered first columns are common in real tables; only reject the
        // two-column "marker + text" shape.
        columns.len() == 2 && total_ratio >= 0.5
    }
}

/// X positions within this many points share a column edge bucket.
const EDGE_BUCKET: f32 = 5.0;

fn edge_bucket(x: f32) -> i32 {
    (x / EDGE_BUCKET).round() as i32
}

fn row_from_spans(mut spans: Vec<TextSpan>) -> TableRowData {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len().max(1) as f32;
    TableRowData { y, spans }
}

/// Fraction of a row's spans that start on a detected column edge.
fn alignment_score(row: &TableRowData, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }

    let tolerance = 5.0;
    let aligned_spans = row
        .spans
        .iter()
        .filter(|span| columns.iter().any(|col| (span.x - col).abs() <= tolerance))
        .count();

    aligned_spans as f32 / row.spans.len() as f32
}

/// Find which column a span belongs to based on its X position.
fn find_column_for_span(span_x: f32, columns: &[f32], right_x: f32) -> usize {
    if columns.is_empty() {
        return 0;
    }

    // Spans may start up to 10pt before their column edge.
    for (i, &col_start) in columns.iter().enumerate() {
        let col_end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if span_x >= col_start - 10.0 && span_x < col_end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (span_x - **a)
                .abs()
                .partial_cmp(&(span_x - **b).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Check if text is a bullet marker.
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※" | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
fn is_number_marker(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Remove internal whitespace for pattern matching (handles "1 .")
    let cleaned: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let prefix = &cleaned[..pos];
        let suffix = &cleaned[pos..];
        if !prefix.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    // Letter marker: "a.", "B)"
    let chars: Vec<char> = cleaned.chars().collect();
    chars.len() == 2 && chars[0].is_alphabetic() && (chars[1] == '.' || chars[1] == ')')
}

/// Lattice detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeConfig {
    /// Lines closer than this (points) meet or share a coordinate
    pub line_tolerance: f32,
    /// Segments shorter than this are ignored
    pub min_line_length: f32,
    /// Minimum number of cells a grid must form
    pub min_cells: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
            min_line_length: 10.0,
            min_cells: 2,
        }
    }
}

/// Detects tables outlined by ruling lines.
#[derive(Debug, Clone, Default)]
pub struct LatticeDetector {
    config: LatticeConfig,
}

/// A ruled grid: row boundaries top to bottom, column boundaries left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct RuledGrid {
    pub rows: Vec<f32>,
    pub columns: Vec<f32>,
}

impl RuledGrid {
    /// Number of cells the boundaries enclose.
    pub fn cell_count(&self) -> usize {
        self.rows.len().saturating_sub(1) * self.columns.len().saturating_sub(1)
    }

    fn top(&self) -> f32 {
        self.rows.first().copied().unwrap_or(0.0)
    }

    fn left(&self) -> f32 {
        self.columns.first().copied().unwrap_or(0.0)
    }

    /// Cell containing a point, as (row, column).
    fn cell_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let row = self.rows.windows(2).position(|w| y <= w[0] && y > w[1])?;
        let col = self.columns.windows(2).position(|w| x >= w[0] && x < w[1])?;
        Some((row, col))
    }
}

impl LatticeDetector {
    /// Create a new lattice detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new lattice detector with custom configuration.
    pub fn with_config(config: LatticeConfig) -> Self {
        Self { config }
    }

    /// Tables on one page, top first. Grids without any text are dropped.
    pub fn detect_page(&self, content: &PageContent) -> Vec<TableGrid> {
        self.find_grids(&content.segments)
            .iter()
            .map(|grid| self.fill(grid, &content.spans))
            .filter(|table| !table.is_blank())
            .collect()
    }

    /// Find ruled grids among the page's segments, top first, then left first.
    pub fn find_grids(&self, segments: &[Segment]) -> Vec<RuledGrid> {
        let tol = self.config.line_tolerance;
        let horizontal: Vec<&Segment> = segments
            .iter()
            .filter(|s| s.is_horizontal(tol) && s.width() >= self.config.min_line_length)
            .collect();
        let vertical: Vec<&Segment> = segments
            .iter()
            .filter(|s| s.is_vertical(tol) && s.height() >= self.config.min_line_length)
            .collect();

        if horizontal.len() < 2 || vertical.len() < 2 {
            return vec![];
        }

        // Lines that cross or touch belong to the same table.
        let mut sets = DisjointSets::new(horizontal.len() + vertical.len());
        for (i, h) in horizontal.iter().enumerate() {
            for (j, v) in vertical.iter().enumerate() {
                if intersects(h, v, tol) {
                    sets.union(i, horizontal.len() + j);
                }
            }
        }

        let mut components: BTreeMap<usize, (Vec<f32>, Vec<f32>)> = BTreeMap::new();
        for (i, h) in horizontal.iter().enumerate() {
            components
                .entry(sets.find(i))
                .or_default()
                .0
                .push((h.y0 + h.y1) / 2.0);
        }
        for (j, v) in vertical.iter().enumerate() {
            components
                .entry(sets.find(horizontal.len() + j))
                .or_default()
                .1
                .push((v.x0 + v.x1) / 2.0);
        }

        let mut grids: Vec<RuledGrid> = components
            .into_values()
            .filter_map(|(ys, xs)| {
                let mut rows = cluster(ys, tol);
                rows.reverse();
                let grid = RuledGrid {
                    rows,
                    columns: cluster(xs, tol),
                };
                (grid.rows.len() >= 2
                    && grid.columns.len() >= 2
                    && grid.cell_count() >= self.config.min_cells)
                    .then_some(grid)
            })
            .collect();

        // Top first; tables sharing a top edge read left to right.
        grids.sort_by(|a, b| {
            b.top()
                .partial_cmp(&a.top())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.left()
                        .partial_cmp(&b.left())
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
        grids
    }

    /// Place spans into the grid's cells.
    fn fill(&self, grid: &RuledGrid, spans: &[TextSpan]) -> TableGrid {
        let cols = grid.columns.len() - 1;
        let mut cells: Vec<Vec<Vec<TextSpan>>> =
            vec![vec![Vec::new(); cols]; grid.rows.len() - 1];

        for span in spans {
            // A point just inside the span's left edge, lifted off the
            // baseline into the glyph body.
            let x = span.x + span.font_size * 0.1;
            let y = span.y + span.font_size * 0.25;
            if let Some((row, col)) = grid.cell_at(x, y) {
                cells[row][col].push(span.clone());
            }
        }

        TableGrid::from_rows(cells.into_iter().map(|row| {
            row.into_iter()
                .map(|spans| {
                    group_into_lines(&spans)
                        .iter()
                        .map(TextLine::text)
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .collect::<Vec<_>>()
        }))
    }
}

fn intersects(h: &Segment, v: &Segment, tol: f32) -> bool {
    let x = (v.x0 + v.x1) / 2.0;
    let y = (h.y0 + h.y1) / 2.0;
    x >= h.x0 - tol && x <= h.x1 + tol && y >= v.y0 - tol && y <= v.y1 + tol
}

/// Merge values closer than `tol` into their mean, ascending.
fn cluster(mut values: Vec<f32>, tol: f32) -> Vec<f32> {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters: Vec<(f32, usize)> = Vec::new();
    for value in values {
        match clusters.last_mut() {
            Some((sum, n)) if value - *sum / *n as f32 <= tol => {
                *sum += value;
                *n += 1;
            }
            _ => clusters.push((value, 1)),
        }
    }

    clusters
        .into_iter()
        .map(|(sum, n)| sum / n as f32)
        .collect()
}

/// Union-find over line indices.
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text, x, y, 12.0)
    }

    fn row(y: f32, spans: Vec<TextSpan>) -> TableRowData {
        TableRowData { y, spans }
    }

    /// Outline and inner rules of a `rows` x `cols` grid of 100x20 cells
    /// with its top-left corner at (50, 700).
    fn ruled(rows: usize, cols: usize) -> Vec<Segment> {
        let (left, top) = (50.0, 700.0);
        let right = left + cols as f32 * 100.0;
        let bottom = top - rows as f32 * 20.0;
        let mut segments = Vec::new();
        for r in 0..=rows {
            segments.push(Segment::horizontal(left, right, top - r as f32 * 20.0));
        }
        for c in 0..=cols {
            segments.push(Segment::vertical(left + c as f32 * 100.0, bottom, top));
        }
        segments
    }

    #[test]
    fn test_group_into_rows() {
        let detector = StreamDetector::new();
        let spans = vec![
            make_span("B1", 60.0, 100.0),
            make_span("A1", 10.0, 100.0),
            make_span("A2", 10.0, 85.0),
            make_span("B2", 60.0, 85.0),
        ];

        let rows = detector.group_into_rows(&spans);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].spans[0].text, "A1");
        assert_eq!(rows[1].spans.len(), 2);
    }

    #[test]
    fn test_detect_columns() {
        let detector = StreamDetector::new();
        let rows = vec![
            row(100.0, vec![make_span("A1", 10.0, 100.0), make_span("B1", 60.0, 100.0)]),
            row(85.0, vec![make_span("A2", 10.0, 85.0), make_span("B2", 60.0, 85.0)]),
            row(70.0, vec![make_span("A3", 10.0, 70.0), make_span("B3", 60.0, 70.0)]),
        ];

        assert_eq!(detector.detect_columns(&rows).len(), 2);
    }

    #[test]
    fn test_stream_simple_table() {
        let detector = StreamDetector::new();
        let content = PageContent {
            spans: vec![
                make_span("Name", 10.0, 100.0),
                make_span("Age", 60.0, 100.0),
                make_span("Alice", 10.0, 85.0),
                make_span("30", 60.0, 85.0),
                make_span("Bob", 10.0, 70.0),
                make_span("25", 60.0, 70.0),
            ],
            segments: vec![],
        };

        let tables = detector.detect_page(&content);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0],
            TableGrid::from_rows(vec![
                vec!["Name", "Age"],
                vec!["Alice", "30"],
                vec!["Bob", "25"],
            ])
        );
    }

    #[test]
    fn test_stream_single_column_is_not_table() {
        let detector = StreamDetector::new();
        let spans = vec![
            make_span("Line 1", 10.0, 100.0),
            make_span("Line 2", 10.0, 85.0),
            make_span("Line 3", 10.0, 70.0),
        ];

        assert!(detector.detect(&spans).is_empty());
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let detector = StreamDetector::new();
        let spans = vec![
            make_span("1.", 50.0, 400.0),
            make_span("장비관리설정", 80.0, 400.0),
            make_span("2.", 50.0, 370.0),
            make_span("Object관리", 80.0, 370.0),
            make_span("3.", 50.0, 340.0),
            make_span("정책관리 및 라우팅", 80.0, 340.0),
            make_span("4.", 50.0, 310.0),
            make_span("VPN", 80.0, 310.0),
        ];

        assert!(detector.detect(&spans).is_empty());
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let detector = StreamDetector::new();
        let spans = vec![
            make_span("-", 50.0, 400.0),
            make_span("Management", 80.0, 400.0),
            make_span("-", 50.0, 370.0),
            make_span("Interface/Service Option", 80.0, 370.0),
            make_span("-", 50.0, 340.0),
            make_span("Firmware", 80.0, 340.0),
        ];

        assert!(detector.detect(&spans).is_empty());
    }

    #[test]
    fn test_list_markers() {
        assert!(is_number_marker("1."));
        assert!(is_number_marker("12."));
        assert!(is_number_marker("1)"));
        assert!(is_number_marker("1 ."));
        assert!(is_number_marker("3"));
        assert!(is_number_marker("a."));
        assert!(is_number_marker("B)"));
        assert!(is_bullet_marker("-"));
        assert!(is_bullet_marker("•"));

        assert!(!is_number_marker("Name"));
        assert!(!is_number_marker("Hello World"));
        assert!(!is_bullet_marker("Alice"));
        assert!(!is_number_marker(""));
    }

    #[test]
    fn test_cluster() {
        assert_eq!(cluster(vec![10.0, 50.0, 10.5, 49.5], 2.0), vec![10.25, 49.75]);
        assert!(cluster(vec![], 2.0).is_empty());
    }

    #[test]
    fn test_lattice_finds_grid() {
        let detector = LatticeDetector::new();
        let grids = detector.find_grids(&ruled(2, 3));
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].rows, vec![700.0, 680.0, 660.0]);
        assert_eq!(grids[0].columns, vec![50.0, 150.0, 250.0, 350.0]);
        assert_eq!(grids[0].cell_count(), 6);
    }

    #[test]
    fn test_lattice_fills_cells() {
        let detector = LatticeDetector::new();
        let content = PageContent {
            spans: vec![
                make_span("Item", 55.0, 685.0),
                make_span("Qty", 155.0, 685.0),
                make_span("Apple", 55.0, 665.0),
                make_span("3", 155.0, 665.0),
                make_span("outside", 55.0, 500.0),
            ],
            segments: ruled(2, 2),
        };

        let tables = detector.detect_page(&content);
        assert_eq!(
            tables,
            vec![TableGrid::from_rows(vec![vec!["Item", "Qty"], vec!["Apple", "3"]])]
        );
    }

    #[test]
    fn test_lattice_keeps_empty_cells() {
        let detector = LatticeDetector::new();
        let content = PageContent {
            spans: vec![make_span("only", 155.0, 665.0)],
            segments: ruled(2, 2),
        };

        let tables = detector.detect_page(&content);
        assert_eq!(
            tables[0],
            TableGrid::from_rows(vec![vec!["", ""], vec!["", "only"]])
        );
    }

    #[test]
    fn test_lattice_ignores_loose_rules() {
        let detector = LatticeDetector::new();
        // Two underlines and a box too small to hold two cells.
        let segments = vec![
            Segment::horizontal(50.0, 300.0, 700.0),
            Segment::horizontal(50.0, 300.0, 600.0),
            Segment::horizontal(50.0, 150.0, 400.0),
            Segment::horizontal(50.0, 150.0, 380.0),
            Segment::vertical(50.0, 380.0, 400.0),
            Segment::vertical(150.0, 380.0, 400.0),
        ];
        assert!(detector.find_grids(&segments).is_empty());
    }

    #[test]
    fn test_lattice_orders_tables_top_first() {
        let detector = LatticeDetector::new();
        let mut segments: Vec<Segment> = ruled(1, 2)
            .into_iter()
            .map(|s| Segment::new((s.x0, s.y0 - 300.0), (s.x1, s.y1 - 300.0)))
            .collect();
        segments.extend(ruled(1, 2));

        let grids = detector.find_grids(&segments);
        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0].top(), 700.0);
        assert_eq!(grids[1].top(), 400.0);
    }

    #[test]
    fn test_lattice_orders_side_by_side_tables_left_first() {
        let detector = LatticeDetector::new();
        // Two 2x2 grids sharing a top edge, the right one listed first.
        let mut segments: Vec<Segment> = ruled(2, 2)
            .into_iter()
            .map(|s| Segment::new((s.x0 + 250.0, s.y0), (s.x1 + 250.0, s.y1)))
            .collect();
        segments.extend(ruled(2, 2));

        let first = detector.find_grids(&segments);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].columns[0], 50.0);
        assert_eq!(first[1].columns[0], 300.0);

        for _ in 0..50 {
            assert_eq!(detector.find_grids(&segments), first);
        }
    }

    #[test]
    fn test_side_by_side_tables_fill_in_reading_order() {
        let detector = LatticeDetector::new();
        let mut segments: Vec<Segment> = ruled(1, 2)
            .into_iter()
            .map(|s| Segment::new((s.x0 + 250.0, s.y0), (s.x1 + 250.0, s.y1)))
            .collect();
        segments.extend(ruled(1, 2));
        let content = PageContent {
            spans: vec![
                make_span("right", 305.0, 685.0),
                make_span("left", 55.0, 685.0),
            ],
            segments,
        };

        let tables = detector.detect_page(&content);
        assert_eq!(
            tables,
            vec![
                TableGrid::from_rows(vec![vec!["left", ""]]),
                TableGrid::from_rows(vec![vec!["right", ""]]),
            ]
        );
    }

    #[test]
    fn test_blank_grid_dropped() {
        let detector = LatticeDetector::new();
        let content = PageContent {
            spans: vec![],
            segments: ruled(2, 2),
        };
        assert!(detector.detect_page(&content).is_empty());
    }
}
