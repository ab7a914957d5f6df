//! Row assembly for sales ledgers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::records::SalesRecord;
use crate::normalize::patterns::{DATE_FRAGMENT, SALES_HEADER, SALES_TOTALS};
use crate::normalize::{amount_or_zero, normalize_to_iso_date_or, parse_integer};

use super::ids::IdGenerator;
use super::lines::{is_footer_line, ColumnSplitter};
use super::{split_at_header, TableExtractor, TableRows};

/// Prefix of synthesized invoice numbers.
pub const FALLBACK_FAKTUR_PREFIX: &str = "pdf-sale";

const UNKNOWN_CUSTOMER: &str = "Unknown";

/// Date, customer, invoice number and product code.
const FRONT_COLUMNS: usize = 4;

/// Walks sales ledger lines and assembles [`SalesRecord`]s.
pub struct SalesTableExtractor<'a> {
    splitter: &'a dyn ColumnSplitter,
    ids: &'a dyn IdGenerator,
    min_line_len: usize,
    min_columns: usize,
    fallback_date: NaiveDate,
}

impl<'a> SalesTableExtractor<'a> {
    pub fn new(
        splitter: &'a dyn ColumnSplitter,
        ids: &'a dyn IdGenerator,
        fallback_date: NaiveDate,
    ) -> Self {
        Self {
            splitter,
            ids,
            min_line_len: 5,
            min_columns: 7,
            fallback_date,
        }
    }

    /// Lines shorter than this are skipped.
    pub fn with_min_line_len(mut self, len: usize) -> Self {
        self.min_line_len = len;
        self
    }

    /// Rows with fewer columns are treated as wrapped text.
    pub fn with_min_columns(mut self, columns: usize) -> Self {
        self.min_columns = columns;
        self
    }

    fn is_candidate(&self, line: &str) -> bool {
        line.chars().count() >= self.min_line_len
            && !SALES_TOTALS.is_match(line)
            && !is_footer_line(line)
            && DATE_FRAGMENT.is_match(line)
    }

    /// Assemble one row from its columns.
    ///
    /// The numeric tail is positional. With eight or more columns the last
    /// four read as qty, unit price, subtotal, total; a seven-column row has
    /// no subtotal, so its last three read as qty, unit price, total and the
    /// subtotal is computed. Unreadable tail cells count as zero.
    fn assemble(&self, mut columns: Vec<String>, index: usize) -> Option<SalesRecord> {
        let tail_len = if columns.len() >= FRONT_COLUMNS + 4 {
            4
        } else if columns.len() == FRONT_COLUMNS + 3 {
            3
        } else {
            return None;
        };

        let tail = columns.split_off(columns.len() - tail_len);
        let (qty, harga_satuan, jumlah, total) = match tail.as_slice() {
            [qty, harga, jumlah, total] => (
                parse_integer(qty),
                amount_or_zero(harga),
                amount_or_zero(jumlah),
                amount_or_zero(total),
            ),
            [qty, harga, total] => {
                let qty = parse_integer(qty);
                let harga = amount_or_zero(harga);
                (qty, harga, Decimal::from(qty).saturating_mul(harga), amount_or_zero(total))
            }
            _ => return None,
        };

        let mut front = columns.into_iter();
        let tanggal = front.next()?;
        let customer = front.next().unwrap_or_default();
        let faktur = front.next().unwrap_or_default();
        let kode_produk = front.next()?.trim().to_string();
        if kode_produk.is_empty() {
            return None;
        }

        let nama_barang = front.collect::<Vec<_>>().join(" ").trim().to_string();

        Some(SalesRecord {
            tanggal: normalize_to_iso_date_or(&tanggal, self.fallback_date),
            customer: non_empty_or(customer, UNKNOWN_CUSTOMER),
            faktur: if faktur.trim().is_empty() {
                self.ids.fallback_id(FALLBACK_FAKTUR_PREFIX, index)
            } else {
                faktur.trim().to_string()
            },
            nama_barang: if nama_barang.is_empty() {
                kode_produk.clone()
            } else {
                nama_barang
            },
            kode_produk,
            qty,
            harga_satuan,
            jumlah,
            total,
        })
    }
}

impl TableExtractor for SalesTableExtractor<'_> {
    type Row = SalesRecord;

    fn extract_rows(&self, lines: &[String]) -> TableRows<SalesRecord> {
        let (header_line, data) = split_at_header(lines, &SALES_HEADER);
        let mut rows = Vec::new();
        let mut skipped_lines = 0;

        for line in data {
            if !self.is_candidate(line) {
                skipped_lines += 1;
                continue;
            }

            let columns = self.splitter.split_columns(line);
            if columns.len() < self.min_columns {
                debug!("Skipping short sales row ({} columns): {}", columns.len(), line);
                skipped_lines += 1;
                continue;
            }

            match self.assemble(columns, rows.len()) {
                Some(row) => rows.push(row),
                None => {
                    debug!("Skipping unassembled sales row: {}", line);
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

fn non_empty_or(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ids::FixedStampIdGenerator;
    use crate::extract::lines::{sanitize_lines, GapColumnSplitter};
    use std::str::FromStr;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    fn extract(text: &str) -> TableRows<SalesRecord> {
        let ids = FixedStampIdGenerator::new(42);
        let lines: Vec<String> = sanitize_lines(text).collect();
        SalesTableExtractor::new(&GapColumnSplitter, &ids, today()).extract_rows(&lines)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_seven_column_row() {
        let text = "Tanggal  Customer  Faktur  Kode Produk  Qty  Harga  Total\n\
                    01/10/2025  MW SHOPEE  JL-050222  BN02-12H  1  44900  44900";
        let result = extract(text);

        assert_eq!(result.header_line, Some(0));
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.tanggal, "2025-10-01");
        assert_eq!(row.customer, "MW SHOPEE");
        assert_eq!(row.faktur, "JL-050222");
        assert_eq!(row.kode_produk, "BN02-12H");
        assert_eq!(row.nama_barang, "BN02-12H");
        assert_eq!(row.qty, 1);
        assert_eq!(row.harga_satuan, dec("44900"));
        assert_eq!(row.jumlah, dec("44900"));
        assert_eq!(row.total, dec("44900"));
    }

    #[test]
    fn test_full_row_with_multi_part_name() {
        let text = "Tanggal  Customer  Faktur  Kode Produk  Nama Barang  Qty  Harga  Jumlah  Total\n\
                    02/10/2025  TOKO ABC  JL-1  1006-12F  FANTA  STRAWBERRY 12  2  5.000  10.000  9.500";
        let result = extract(text);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.nama_barang, "FANTA STRAWBERRY 12");
        assert_eq!(row.qty, 2);
        assert_eq!(row.harga_satuan, dec("5000"));
        assert_eq!(row.jumlah, dec("10000"));
        assert_eq!(row.total, dec("9500"));
    }

    #[test]
    fn test_skips_totals_footers_and_dateless_lines() {
        let text = "Tanggal  Customer  Faktur  Kode Produk  Qty  Harga  Total\n\
                    01/10/2025  MW SHOPEE  JL-1  A1  1  100  100\n\
                    continued name text without date\n\
                    Total  01/10/2025  x  x  x  1  100  100\n\
                    Halaman 1 dari 2  01/10/2025  a  b  c  d  e\n\
                    abc";
        let result = extract(text);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.skipped_lines, 4);
    }

    #[test]
    fn test_rejects_short_rows() {
        let text = "01/10/2025  MW SHOPEE  A1  1  100";
        let result = extract(text);
        assert!(result.rows.is_empty());
        assert_eq!(result.skipped_lines, 1);
    }

    #[test]
    fn test_headerless_document_starts_at_first_line() {
        let text = "01/10/2025  MW SHOPEE  JL-1  A1  1  100  100\n\
                    02/10/2025  MW SHOPEE  JL-2  A2  3  100  300";
        let result = extract(text);
        assert_eq!(result.header_line, None);
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_missing_faktur_is_synthesized() {
        let ids = FixedStampIdGenerator::new(42);
        let keep_empty = |line: &str| line.split('|').map(|f| f.trim().to_string()).collect::<Vec<_>>();
        let lines: Vec<String> = sanitize_lines(
            "01/10/2025|TOKO||A1|NAMA|1|100|100|100\n\
             01/10/2025|TOKO|JL-9|A2|NAMA|1|100|100|100\n\
             01/10/2025|TOKO||A3|NAMA|1|100|100|100",
        )
        .collect();

        let result = SalesTableExtractor::new(&keep_empty, &ids, today()).extract_rows(&lines);
        let fakturs: Vec<&str> = result.rows.iter().map(|r| r.faktur.as_str()).collect();
        assert_eq!(fakturs, vec!["pdf-sale-42-0", "JL-9", "pdf-sale-42-2"]);
    }

    #[test]
    fn test_default_splitter_drops_empty_cells() {
        // the empty faktur cell disappears and the remaining cells shift left
        let text = "01/10/2025 | TOKO | | A1 | NAMA | 1 | 100 | 100";
        let result = extract(text);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].faktur, "A1");
        assert_eq!(result.rows[0].kode_produk, "NAMA");
    }

    #[test]
    fn test_blank_customer_defaults() {
        let ids = FixedStampIdGenerator::new(1);
        let extractor = SalesTableExtractor::new(&GapColumnSplitter, &ids, today());
        let row = extractor
            .assemble(
                vec![
                    "01/10/2025".into(),
                    " ".into(),
                    "JL-1".into(),
                    "A1".into(),
                    "1".into(),
                    "100".into(),
                    "100".into(),
                ],
                0,
            )
            .unwrap();
        assert_eq!(row.customer, "Unknown");
    }

    #[test]
    fn test_unreadable_date_uses_fallback() {
        let ids = FixedStampIdGenerator::new(1);
        let extractor = SalesTableExtractor::new(&GapColumnSplitter, &ids, today());
        let row = extractor
            .assemble(
                vec![
                    "32/13/2025".into(),
                    "TOKO".into(),
                    "JL-1".into(),
                    "A1".into(),
                    "1".into(),
                    "100".into(),
                    "100".into(),
                ],
                0,
            )
            .unwrap();
        assert_eq!(row.tanggal, "2030-01-01");
    }

    #[test]
    fn test_rupiah_prefixed_amounts() {
        let text = "01/10/2025  TOKO  JL-1  A1  BOTOL  2  Rp 1.500  Rp 3.000  Rp 3.000";
        let result = extract(text);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].harga_satuan, dec("1500"));
        assert_eq!(result.rows[0].total, dec("3000"));
    }

    #[test]
    fn test_tail_is_read_by_position() {
        let text = "01/10/2025  TOKO  JL-1  A1  TEH BOTOL  2 PCS  1.500  3.000  3.000";
        let result = extract(text);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.nama_barang, "TEH BOTOL");
        assert_eq!(row.qty, 2);
        assert_eq!(row.harga_satuan, dec("1500"));
        assert_eq!(row.jumlah, dec("3000"));
        assert_eq!(row.total, dec("3000"));
    }

    #[test]
    fn test_placeholder_tail_cell_counts_as_zero() {
        let text = "01/10/2025  TOKO  JL-1  A1  TEH  2  1500  -  3000";
        let result = extract(text);

        assert_eq!(result.skipped_lines, 0);
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.nama_barang, "TEH");
        assert_eq!(row.qty, 2);
        assert_eq!(row.harga_satuan, dec("1500"));
        assert_eq!(row.jumlah, Decimal::ZERO);
        assert_eq!(row.total, dec("3000"));
    }

    #[test]
    fn test_seven_columns_compute_subtotal() {
        let text = "01/10/2025  TOKO  JL-1  A1  3 BOX  2.000  6.000";
        let result = extract(text);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.nama_barang, "A1");
        assert_eq!(row.qty, 3);
        assert_eq!(row.jumlah, dec("6000"));
        assert_eq!(row.total, dec("6000"));
    }
}
