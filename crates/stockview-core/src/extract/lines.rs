//! Line cleaning and column splitting for PDF-extracted text.

use crate::normalize::patterns::{COLUMN_GAP, FOOTER};

/// Split raw extracted text into cleaned, non-empty lines.
///
/// Non-breaking spaces become spaces, tabs become four spaces (so they still
/// count as a column gap), bullet glyphs are dropped and lines are trimmed.
/// Each call walks the text afresh.
pub fn sanitize_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().map(clean_line).filter(|line| !line.is_empty())
}

fn clean_line(line: &str) -> String {
    line.replace('\u{00a0}', " ")
        .replace('\t', "    ")
        .replace(['•', '▪', '·'], "")
        .trim()
        .to_string()
}

/// Whether a line is page-number or print-date boilerplate.
pub fn is_footer_line(line: &str) -> bool {
    FOOTER.is_match(line)
}

/// Strategy for cutting one line of text into column fields.
///
/// The default is a whitespace heuristic; a layout-aware splitter can be
/// swapped in without touching classification or row assembly.
pub trait ColumnSplitter: Send + Sync {
    /// Split a line into trimmed, non-empty fields.
    fn split_columns(&self, line: &str) -> Vec<String>;
}

/// Splits on `|` when present, otherwise on runs of two or more whitespace
/// characters. Single spaces stay inside multi-word fields such as names.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapColumnSplitter;

impl ColumnSplitter for GapColumnSplitter {
    fn split_columns(&self, line: &str) -> Vec<String> {
        let fields: Vec<&str> = if line.contains('|') {
            line.split('|').collect()
        } else {
            COLUMN_GAP.split(line).collect()
        };

        fields
            .into_iter()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(String::from)
            .collect()
    }
}

impl<F> ColumnSplitter for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn split_columns(&self, line: &str) -> Vec<String> {
        self(line)
    }
}

/// Split a line with the default [`GapColumnSplitter`].
pub fn split_columns(line: &str) -> Vec<String> {
    GapColumnSplitter.split_columns(line)
}
