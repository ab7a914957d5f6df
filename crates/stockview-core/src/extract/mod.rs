//! Document classification and table extraction for ledger PDFs.

pub mod classifier;
pub mod ids;
pub mod lines;
mod parser;
pub mod sales;
pub mod stock;

pub use classifier::{classify, detect_document_type, Classification, DEFAULT_SCAN_CHARS};
pub use ids::{ClockIdGenerator, FixedStampIdGenerator, IdGenerator};
pub use lines::{is_footer_line, sanitize_lines, split_columns, ColumnSplitter, GapColumnSplitter};
pub use parser::{classify_and_extract, DocumentParser, ExtractionResult, LedgerParser};
pub use sales::SalesTableExtractor;
pub use stock::StockTableExtractor;

use regex::Regex;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Rows recovered from one table, with bookkeeping for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRows<T> {
    pub rows: Vec<T>,
    /// Index of the header line, if one was found.
    pub header_line: Option<usize>,
    /// Data lines that did not become rows.
    pub skipped_lines: usize,
}

/// Trait for per-domain row extractors.
pub trait TableExtractor {
    /// The record type this extractor produces.
    type Row;

    /// Walk cleaned lines and assemble every row that passes the filters.
    fn extract_rows(&self, lines: &[String]) -> TableRows<Self::Row>;
}

/// Split lines at the first header match. Without a header every line is data.
pub(crate) fn split_at_header<'l>(
    lines: &'l [String],
    header: &Regex,
) -> (Option<usize>, &'l [String]) {
    match lines.iter().position(|line| header.is_match(line)) {
        Some(index) => (Some(index), &lines[index + 1..]),
        None => (None, lines),
    }
}
