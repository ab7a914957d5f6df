//! Common regex patterns for ledger text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Table headers, with arbitrary gaps between column titles
    pub static ref SALES_HEADER: Regex = Regex::new(
        r"(?i)tanggal.+customer.+faktur.+kode.+(?:produk|barang).+qty.+(?:harga|jumlah|total)"
    ).unwrap();

    pub static ref STOCK_HEADER: Regex = Regex::new(
        r"(?i)kode.+nama.+kategori.+satuan.+gudang.+qty"
    ).unwrap();

    // Any date-looking fragment; every real sales line carries one
    pub static ref DATE_FRAGMENT: Regex = Regex::new(
        r"(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})|(\d{4}[/\-]\d{2}[/\-]\d{2})"
    ).unwrap();

    // Page numbers and print stamps
    pub static ref FOOTER: Regex = Regex::new(
        r"(?i)(halaman|page\s+\d+|tanggal cetak|printed on)"
    ).unwrap();

    // Totals rows
    pub static ref SALES_TOTALS: Regex = Regex::new(
        r"(?i)^\s*(total|subtotal|grand total)"
    ).unwrap();

    pub static ref STOCK_TOTALS: Regex = Regex::new(
        r"(?i)^\s*(total|grand total)"
    ).unwrap();

    // Column gap in PDF-extracted text
    pub static ref COLUMN_GAP: Regex = Regex::new(r"\s{2,}").unwrap();

    // Day-month-year with a two-digit year: 01/10/25, 1.10.25, 01-10-25
    pub static ref DATE_DMY_SHORT: Regex = Regex::new(
        r"^(\d{1,2})[./\-](\d{1,2})[./\-](\d{2})$"
    ).unwrap();

    // Indonesian long format: "1 Oktober 2025"
    pub static ref DATE_INDONESIAN_LONG: Regex = Regex::new(
        r"(?i)^(\d{1,2})\s+(januari|februari|maret|april|mei|juni|juli|agustus|september|oktober|november|desember)\s+(\d{4})$"
    ).unwrap();
}
