//! Table types.

use super::Paragraph;
use serde::{Deserialize, Serialize};

/// A table structure.
///
/// Tables are always rectangular: [`Table::from_rows`] pads short rows with
/// empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Number of header rows (0 = no header)
    pub header_rows: u8,

    /// Per-column alignment from a separator row, `None` when the source had
    /// no separator row. Inner `None` leaves the column at renderer default.
    pub column_alignments: Option<Vec<Option<Alignment>>>,

    /// Table caption
    pub caption: Option<String>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            header_rows: 0,
            column_alignments: None,
            caption: None,
        }
    }

    /// Create a table with header.
    pub fn with_header(header_rows: u8) -> Self {
        Self {
            header_rows,
            ..Self::new()
        }
    }

    /// Build a rectangular table from rows of cell markup.
    ///
    /// The first `header_rows` rows are flagged as header rows.
    pub fn from_rows(rows: Vec<Vec<String>>, header_rows: u8) -> Self {
        let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut table = Self::with_header(header_rows);
        for (i, cells) in rows.into_iter().enumerate() {
            let mut cells: Vec<TableCell> = cells.iter().map(|c| TableCell::markup(c)).collect();
            cells.resize_with(ncols, TableCell::empty);
            let row = if i < header_rows as usize {
                TableRow::header(cells)
            } else {
                TableRow::new(cells)
            };
            table.add_row(row);
        }
        table
    }

    /// Set column alignments and return self.
    pub fn with_alignments(mut self, alignments: Option<Vec<Option<Alignment>>>) -> Self {
        self.column_alignments = alignments;
        self
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Alignment of column `col`, if one was specified.
    pub fn alignment(&self, col: usize) -> Option<Alignment> {
        self.column_alignments
            .as_ref()
            .and_then(|aligns| aligns.get(col).copied().flatten())
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get header rows.
    pub fn header(&self) -> &[TableRow] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[..n]
    }

    /// Get body rows (non-header).
    pub fn body(&self) -> &[TableRow] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[n..]
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,

    /// Whether this is a header row
    pub is_header: bool,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: false,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: true,
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    pub content: Paragraph,
}

impl TableCell {
    /// Create a new cell with plain text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Paragraph::with_text(text),
        }
    }

    /// Create a cell from rich-text markup.
    pub fn markup(markup: &str) -> Self {
        Self {
            content: Paragraph::from_markup(markup),
        }
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self {
            content: Paragraph::new(),
        }
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.content.plain_text()
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left aligned (`:---`)
    Left,
    /// Centered (`:---:`)
    Center,
    /// Right aligned (`---:`)
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_from_rows_pads_ragged_rows() {
        let table = Table::from_rows(
            vec![
                vec!["Name".into(), "Age".into(), "City".into()],
                vec!["Alice".into()],
            ],
            1,
        );

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[1].cells.len(), 3);
        assert!(table.rows[1].cells[2].is_empty());
        assert_eq!(table.header().len(), 1);
        assert!(table.rows[0].is_header);
        assert_eq!(table.body().len(), 1);
    }

    #[test]
    fn test_header_slices_are_clamped() {
        let table = Table::from_rows(vec![vec![String::new()]], 3);
        assert_eq!(table.header().len(), 1);
        assert!(table.body().is_empty());
    }

    #[test]
    fn test_alignment_lookup() {
        let table = Table::from_rows(vec![vec!["a".into(), "b".into()]], 1)
            .with_alignments(Some(vec![None, Some(Alignment::Right)]));
        assert_eq!(table.alignment(0), None);
        assert_eq!(table.alignment(1), Some(Alignment::Right));
        assert_eq!(table.alignment(7), None);
    }

    #[test]
    fn test_cell_markup() {
        let cell = TableCell::markup("<b>x</b> &amp; y");
        assert_eq!(cell.plain_text(), "x & y");
        assert!(!cell.is_empty());
    }
}
