//! Pipe table parsing for `:::table` blocks.

use regex::Regex;
use std::sync::LazyLock;

use crate::inline::sanitize_para;
use crate::model::Alignment;

static SEPARATOR_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:?-{3,}:?$").unwrap());

/// Rows and alignments of a parsed pipe table.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeTable {
    /// Sanitized cell markup, row by row (never empty)
    pub rows: Vec<Vec<String>>,

    /// Column alignments from the separator row, sized to the widest row
    pub alignments: Option<Vec<Option<Alignment>>>,
}

/// Alignment encoded by one separator cell.
fn separator_alignment(cell: &str) -> Option<Alignment> {
    let cell = cell.trim();
    if !SEPARATOR_CELL_RE.is_match(cell) {
        return None;
    }
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) => Some(Alignment::Center),
        (false, true) => Some(Alignment::Right),
        (true, false) => Some(Alignment::Left),
        (false, false) => None,
    }
}

fn is_separator_row(cells: &[String]) -> bool {
    cells.iter().all(|c| SEPARATOR_CELL_RE.is_match(c.trim()))
}

/// Parse the body of a `:::table` block.
///
/// Only lines starting with `|` count as rows. When the second row is made
/// of `---` cells it becomes the alignment spec and is dropped from the
/// data. A body without rows yields a single empty cell.
pub fn parse_pipe_table<S: AsRef<str>>(lines: &[S]) -> PipeTable {
    let mut raw_rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| line.starts_with('|'))
        .map(|line| {
            line.trim_matches('|')
                .split('|')
                .map(|cell| cell.trim().to_string())
                .collect()
        })
        .collect();

    if raw_rows.is_empty() {
        return PipeTable {
            rows: vec![vec![String::new()]],
            alignments: None,
        };
    }

    let mut alignments = None;
    if raw_rows.len() >= 2 && is_separator_row(&raw_rows[1]) {
        let separator = raw_rows.remove(1);
        alignments = Some(
            separator
                .iter()
                .map(|c| separator_alignment(c))
                .collect::<Vec<_>>(),
        );
    }

    let rows: Vec<Vec<String>> = raw_rows
        .iter()
        .map(|row| row.iter().map(|cell| sanitize_para(cell)).collect())
        .collect();

    let alignments = alignments.map(|mut aligns: Vec<Option<Alignment>>| {
        let ncols = rows.iter().map(Vec::len).max().unwrap_or(aligns.len());
        aligns.resize(ncols, None);
        aligns
    });

    PipeTable { rows, alignments }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_row() {
        let table = parse_pipe_table(&[
            "| A | B | C |",
            "|---|:---:|---:|",
            "| 1 | 2 | 3 |",
        ]);
        assert_eq!(
            table.rows,
            vec![vec!["A", "B", "C"], vec!["1", "2", "3"]]
        );
        assert_eq!(
            table.alignments,
            Some(vec![None, Some(Alignment::Center), Some(Alignment::Right)])
        );
    }

    #[test]
    fn test_left_alignment_and_padding() {
        let table = parse_pipe_table(&["| A | B | C |", "|:---|---|", "| x |"]);
        assert_eq!(
            table.alignments,
            Some(vec![Some(Alignment::Left), None, None])
        );
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_alignment_truncated_to_columns() {
        let table = parse_pipe_table(&["| A |", "|---|---|:-:|"]);
        // `:-:` has fewer than three dashes, so the row is data.
        assert_eq!(table.alignments, None);
        assert_eq!(table.rows.len(), 2);

        let table = parse_pipe_table(&["| A |", "|---|---|:---:|"]);
        assert_eq!(table.alignments, Some(vec![None]));
        assert_eq!(table.rows, vec![vec!["A"]]);
    }

    #[test]
    fn test_no_separator_row() {
        let table = parse_pipe_table(&["| a | b |", "| c | d |"]);
        assert_eq!(table.alignments, None);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_non_pipe_lines_ignored() {
        let table = parse_pipe_table(&["caption text", "", "  | x | **y** |  "]);
        assert_eq!(table.rows, vec![vec!["x", "<b>y</b>"]]);
    }

    #[test]
    fn test_empty_table() {
        let table = parse_pipe_table::<&str>(&[]);
        assert_eq!(table.rows, vec![vec![String::new()]]);
        assert_eq!(table.alignments, None);

        let table = parse_pipe_table(&["no pipes here"]);
        assert_eq!(table.rows, vec![vec![String::new()]]);
    }
}
