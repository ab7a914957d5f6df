//! Ledger parser tying classification to the per-domain extractors.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::records::{ConversionResult, DocumentType};

use super::classifier::classify;
use super::ids::{ClockIdGenerator, IdGenerator};
use super::lines::{sanitize_lines, ColumnSplitter, GapColumnSplitter};
use super::sales::SalesTableExtractor;
use super::stock::StockTableExtractor;
use super::{Result, TableExtractor};

/// Result of ledger extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted rows, tagged with the document type.
    pub conversion: ConversionResult,
    /// Whether a table header was located.
    pub header_found: bool,
    /// Cleaned lines examined.
    pub line_count: usize,
    /// Data lines that did not become rows.
    pub skipped_lines: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for ledger parsing.
pub trait LedgerParser {
    /// Classify and extract a ledger from extracted PDF text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Heuristic ledger parser with pluggable column splitting and id generation.
pub struct DocumentParser {
    config: ExtractionConfig,
    splitter: Box<dyn ColumnSplitter>,
    ids: Box<dyn IdGenerator>,
    fallback_date: Option<NaiveDate>,
}

impl DocumentParser {
    /// Create a parser with default thresholds, whitespace column splitting
    /// and clock-stamped fallback ids.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            splitter: Box::new(GapColumnSplitter),
            ids: Box::new(ClockIdGenerator),
            fallback_date: None,
        }
    }

    /// Set extraction thresholds.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the column splitting strategy.
    pub fn with_splitter(mut self, splitter: impl ColumnSplitter + 'static) -> Self {
        self.splitter = Box::new(splitter);
        self
    }

    /// Replace the fallback invoice id generator.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Date stored on rows whose date cell cannot be read. Defaults to today.
    pub fn with_fallback_date(mut self, date: NaiveDate) -> Self {
        self.fallback_date = Some(date);
        self
    }

    /// Classify text using the configured scan window.
    pub fn detect(&self, text: &str) -> Option<DocumentType> {
        classify(text, self.config.classifier_scan_chars).document_type
    }

    /// Extract rows of a known document type.
    pub fn extract_as(&self, text: &str, document_type: DocumentType) -> ExtractionResult {
        let start = Instant::now();
        let lines: Vec<String> = sanitize_lines(text).collect();

        let (conversion, header_line, skipped_lines) = match document_type {
            DocumentType::Sales => {
                let fallback_date = self.fallback_date.unwrap_or_else(|| Utc::now().date_naive());
                let extracted =
                    SalesTableExtractor::new(self.splitter.as_ref(), self.ids.as_ref(), fallback_date)
                        .with_min_line_len(self.config.min_sales_line_len)
                        .with_min_columns(self.config.min_sales_columns)
                        .extract_rows(&lines);
                (
                    ConversionResult::Sales(extracted.rows),
                    extracted.header_line,
                    extracted.skipped_lines,
                )
            }
            DocumentType::Stock => {
                let extracted = StockTableExtractor::new(self.splitter.as_ref())
                    .with_min_line_len(self.config.min_stock_line_len)
                    .with_min_columns(self.config.min_stock_columns)
                    .extract_rows(&lines);
                (
                    ConversionResult::Stock(extracted.rows),
                    extracted.header_line,
                    extracted.skipped_lines,
                )
            }
        };

        debug!(
            "Extracted {} {} rows from {} lines (header: {:?}, skipped: {})",
            conversion.len(),
            document_type,
            lines.len(),
            header_line,
            skipped_lines
        );

        ExtractionResult {
            conversion,
            header_found: header_line.is_some(),
            line_count: lines.len(),
            skipped_lines,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Classify and extract in one step.
    ///
    /// `None` means the text could not be classified. A recognised document
    /// with no surviving rows yields an empty result of its type.
    pub fn classify_and_extract(&self, text: &str) -> Option<ConversionResult> {
        let document_type = self.detect(text)?;
        Some(self.extract_as(text, document_type).conversion)
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerParser for DocumentParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        info!("Parsing ledger from {} characters of text", text.len());

        let document_type = self.detect(text).ok_or(ExtractionError::UnrecognizedDocument)?;
        let result = self.extract_as(text, document_type);

        if result.conversion.is_empty() {
            return Err(ExtractionError::NoRows { document_type });
        }

        info!(
            "Extracted {} {} rows in {}ms",
            result.conversion.len(),
            document_type,
            result.processing_time_ms
        );
        Ok(result)
    }
}

/// Classify and extract with the default parser.
pub fn classify_and_extract(text: &str) -> Option<ConversionResult> {
    DocumentParser::new().classify_and_extract(text)
}
