//! Row assembly for stock balance reports.

use tracing::debug;

use crate::models::records::StockRecord;
use crate::normalize::parse_integer;
use crate::normalize::patterns::{STOCK_HEADER, STOCK_TOTALS};

use super::lines::{is_footer_line, ColumnSplitter};
use super::{split_at_header, TableExtractor, TableRows};

pub const UNASSIGNED_CATEGORY: &str = "UNASSIGNED";
pub const NO_VALUE: &str = "-";

/// Walks stock report lines and assembles [`StockRecord`]s.
pub struct StockTableExtractor<'a> {
    splitter: &'a dyn ColumnSplitter,
    min_line_len: usize,
    min_columns: usize,
}

impl<'a> StockTableExtractor<'a> {
    pub fn new(splitter: &'a dyn ColumnSplitter) -> Self {
        Self {
            splitter,
            min_line_len: 4,
            min_columns: 4,
        }
    }

    pub fn with_min_line_len(mut self, len: usize) -> Self {
        self.min_line_len = len;
        self
    }

    pub fn with_min_columns(mut self, columns: usize) -> Self {
        self.min_columns = columns;
        self
    }

    fn is_candidate(&self, line: &str) -> bool {
        line.chars().count() >= self.min_line_len
            && !STOCK_TOTALS.is_match(line)
            && !is_footer_line(line)
    }

    /// Stock reports list category, unit, warehouse and qty last, so they
    /// come off the end of the row; the first remaining cell is the code.
    fn assemble(mut columns: Vec<String>) -> Option<StockRecord> {
        let qty = columns.pop().unwrap_or_default();
        let gudang = columns.pop().unwrap_or_default();
        let satuan = columns.pop().unwrap_or_default();
        let kategori = columns.pop().unwrap_or_default();

        let mut rest = columns.into_iter();
        let kode_produk = rest.next()?.trim().to_string();
        if kode_produk.is_empty() {
            return None;
        }

        let nama_produk = rest.collect::<Vec<_>>().join(" ").trim().to_string();

        Some(StockRecord {
            nama_produk: if nama_produk.is_empty() {
                kode_produk.clone()
            } else {
                nama_produk
            },
            kode_produk,
            kategori: or_default(kategori, UNASSIGNED_CATEGORY),
            satuan: or_default(satuan, NO_VALUE),
            gudang: or_default(gudang, NO_VALUE),
            qty: parse_integer(&qty),
        })
    }
}

impl TableExtractor for StockTableExtractor<'_> {
    type Row = StockRecord;

    fn extract_rows(&self, lines: &[String]) -> TableRows<StockRecord> {
        let (header_line, data) = split_at_header(lines, &STOCK_HEADER);
        let mut rows = Vec::new();
        let mut skipped_lines = 0;

        for line in data {
            if !self.is_candidate(line) {
                skipped_lines += 1;
                continue;
            }

            let columns = self.splitter.split_columns(line);
            if columns.len() < self.min_columns {
                skipped_lines += 1;
                continue;
            }

            match Self::assemble(columns) {
                Some(row) => rows.push(row),
                None => {
                    debug!("Skipping stock row without product code: {}", line);
                    skipped_lines += 1;
                }
            }
        }

        TableRows {
            rows,
            header_line,
            skipped_lines,
        }
    }
}

fn or_default(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
