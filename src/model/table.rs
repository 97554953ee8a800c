//! Table types.

use serde::{Deserialize, Serialize};

/// A detected table: ordered rows of ordered string cells.
///
/// Every detection strategy produces this one shape. Rows are not padded to
/// a common width; whatever the detector returned is kept as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableGrid {
    rows: Vec<Vec<String>>,
}

impl TableGrid {
    /// Create a new empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grid from rows of cells.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Add a row to the grid.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Rows in detection order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .all(|cell| cell.trim().is_empty())
    }

    /// Get plain text representation: tab-separated cells, one row per line.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table-detection strategy a [`TableDetector`](crate::parser::TableDetector) can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStrategy {
    /// Cells bounded by visible ruling lines
    Lattice,
    /// Columns inferred from whitespace alignment
    Stream,
}

impl DetectionStrategy {
    /// Strategy name as used in logs and warnings.
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionStrategy::Lattice => "lattice",
            DetectionStrategy::Stream => "stream",
        }
    }
}

impl std::fmt::Display for DetectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy supplied the final tables of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStrategy {
    /// Lattice found at least one table
    Lattice,
    /// Lattice found none and stream found at least one
    Stream,
    /// Neither strategy produced a table
    #[default]
    None,
}

impl From<DetectionStrategy> for TableStrategy {
    fn from(strategy: DetectionStrategy) -> Self {
        match strategy {
            DetectionStrategy::Lattice => TableStrategy::Lattice,
            DetectionStrategy::Stream => TableStrategy::Stream,
        }
    }
}
