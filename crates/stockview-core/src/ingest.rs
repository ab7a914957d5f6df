//! Mapping of decoded spreadsheet rows onto typed records.
//!
//! Rows arrive as string-keyed maps (CSV headers, XLSX columns, JSON
//! objects). Column names vary between exports, so every field is looked up
//! through a list of aliases.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use crate::extract::ids::IdGenerator;
use crate::extract::stock::{NO_VALUE, UNASSIGNED_CATEGORY};
use crate::models::records::{SalesRecord, StockRecord};
use crate::normalize::{decimal_to_quantity, normalize_to_iso_date_or, to_iso, value_to_number};

/// A decoded row keyed by column name.
pub type RawRow = Map<String, Value>;

/// Prefix of invoice numbers synthesized for imported sales rows.
pub const FALLBACK_SALE_PREFIX: &str = "sale";

const CODE: &[&str] = &["kode_produk", "sku", "product_code", "kode"];
const STOCK_NAME: &[&str] = &["nama_produk", "nama_barang", "product_name", "nama"];
const CATEGORY: &[&str] = &["kategori", "category"];
const UNIT: &[&str] = &["satuan", "unit"];
const WAREHOUSE: &[&str] = &["gudang", "warehouse"];
const STOCK_QTY: &[&str] = &["qty", "jumlah", "quantity", "stock", "saldo"];

const DATE: &[&str] = &["tanggal", "date", "order_date"];
const CUSTOMER: &[&str] = &["customer", "buyer"];
const INVOICE: &[&str] = &["faktur", "invoice", "order_id"];
const SALES_NAME: &[&str] = &["nama_barang", "nama_produk", "product_name", "nama"];
const SALES_QTY: &[&str] = &["qty", "quantity", "jumlah"];
const UNIT_PRICE: &[&str] = &["harga_satuan", "unit_price", "price"];
const SUBTOTAL: &[&str] = &["jumlah", "subtotal", "line_total"];
const TOTAL: &[&str] = &["total", "total_amount", "grand_total"];

/// Map decoded rows onto stock records, dropping rows without a product code.
pub fn normalize_stock_rows(rows: &[RawRow]) -> Vec<StockRecord> {
    let records: Vec<StockRecord> = rows.iter().filter_map(normalize_stock_row).collect();
    debug!("Normalized {} of {} stock rows", records.len(), rows.len());
    records
}

/// Map one decoded row onto a stock record.
pub fn normalize_stock_row(row: &RawRow) -> Option<StockRecord> {
    let kode_produk = find_text(row, CODE)?;

    Some(StockRecord {
        nama_produk: find_text(row, STOCK_NAME).unwrap_or_else(|| kode_produk.clone()),
        kategori: find_text(row, CATEGORY).unwrap_or_else(|| UNASSIGNED_CATEGORY.to_string()),
        satuan: find_text(row, UNIT).unwrap_or_else(|| NO_VALUE.to_string()),
        gudang: find_text(row, WAREHOUSE).unwrap_or_else(|| NO_VALUE.to_string()),
        qty: find_quantity(row, STOCK_QTY),
        kode_produk,
    })
}

/// Map decoded rows onto sales records, dropping rows without a product code.
///
/// Missing invoice numbers are synthesized from `ids` using the row's
/// position in `rows`; unreadable dates become `fallback_date`.
pub fn normalize_sales_rows(
    rows: &[RawRow],
    ids: &dyn IdGenerator,
    fallback_date: NaiveDate,
) -> Vec<SalesRecord> {
    let records: Vec<SalesRecord> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| normalize_sales_row(row, index, ids, fallback_date))
        .collect();
    debug!("Normalized {} of {} sales rows", records.len(), rows.len());
    records
}

/// Map one decoded row onto a sales record.
pub fn normalize_sales_row(
    row: &RawRow,
    index: usize,
    ids: &dyn IdGenerator,
    fallback_date: NaiveDate,
) -> Option<SalesRecord> {
    let kode_produk = find_text(row, CODE)?;

    let tanggal = match find_text(row, DATE) {
        Some(raw) => normalize_to_iso_date_or(&raw, fallback_date),
        None => to_iso(fallback_date),
    };

    Some(SalesRecord {
        tanggal,
        customer: find_text(row, CUSTOMER).unwrap_or_else(|| "Unknown".to_string()),
        faktur: find_text(row, INVOICE)
            .unwrap_or_else(|| ids.fallback_id(FALLBACK_SALE_PREFIX, index)),
        nama_barang: find_text(row, SALES_NAME).unwrap_or_else(|| kode_produk.clone()),
        qty: find_quantity(row, SALES_QTY),
        harga_satuan: find_amount(row, UNIT_PRICE),
        jumlah: find_amount(row, SUBTOTAL),
        total: find_amount(row, TOTAL),
        kode_produk,
    })
}

/// First alias present in the row. Null and blank cells count as absent.
fn find_value<'r>(row: &'r RawRow, aliases: &[&str]) -> Option<&'r Value> {
    aliases.iter().find_map(|alias| {
        let squashed = alias.replace('_', "");
        row.iter()
            .find(|(key, value)| {
                let key = normalize_key(key);
                (key == *alias || key == squashed) && !is_blank(value)
            })
            .map(|(_, value)| value)
    })
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace([' ', '-'], "_")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn find_text(row: &RawRow, aliases: &[&str]) -> Option<String> {
    match find_value(row, aliases)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn find_quantity(row: &RawRow, aliases: &[&str]) -> i64 {
    find_value(row, aliases)
        .and_then(value_to_number)
        .map(decimal_to_quantity)
        .unwrap_or(0)
}

fn find_amount(row: &RawRow, aliases: &[&str]) -> Decimal {
    find_value(row, aliases)
        .and_then(value_to_number)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ids::FixedStampIdGenerator;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("row fixtures must be objects"),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[test]
    fn test_stock_aliases() {
        let rows = vec![
            row(json!({"SKU": "A1", "Product Name": "Teh Botol", "category": "MINUMAN",
                       "unit": "PCS", "warehouse": "GD01", "saldo": "1.250"})),
            row(json!({"kodeproduk": "B2", "qty": 4})),
            row(json!({"nama": "no code"})),
        ];

        let records = normalize_stock_rows(&rows);
        assert_eq!(
            records,
            vec![
                StockRecord {
                    kode_produk: "A1".into(),
                    nama_produk: "Teh Botol".into(),
                    kategori: "MINUMAN".into(),
                    satuan: "PCS".into(),
                    gudang: "GD01".into(),
                    qty: 1250,
                },
                StockRecord {
                    kode_produk: "B2".into(),
                    nama_produk: "B2".into(),
                    kategori: "UNASSIGNED".into(),
                    satuan: "-".into(),
                    gudang: "-".into(),
                    qty: 4,
                },
            ]
        );
    }

    #[test]
    fn test_unreadable_stock_qty_is_zero() {
        let record = normalize_stock_row(&row(json!({"kode": "A1", "qty": "n/a"}))).unwrap();
        assert_eq!(record.qty, 0);
    }

    #[test]
    fn test_numeric_codes_become_text() {
        let record = normalize_stock_row(&row(json!({"kode": 100612, "qty": 1}))).unwrap();
        assert_eq!(record.kode_produk, "100612");
    }

    #[test]
    fn test_sales_aliases() {
        let ids = FixedStampIdGenerator::new(5);
        let rows = vec![row(json!({
            "order_date": 45931,
            "buyer": "MW SHOPEE",
            "product_code": "BN02-12H",
            "quantity": "2",
            "price": "44.900",
            "subtotal": 89800,
            "grand_total": "89.800"
        }))];

        let records = normalize_sales_rows(&rows, &ids, today());
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.tanggal, "2025-10-01");
        assert_eq!(record.customer, "MW SHOPEE");
        assert_eq!(record.faktur, "sale-5-0");
        assert_eq!(record.nama_barang, "BN02-12H");
        assert_eq!(record.qty, 2);
        assert_eq!(record.harga_satuan, Decimal::from(44900));
        assert_eq!(record.jumlah, Decimal::from(89800));
        assert_eq!(record.total, Decimal::from(89800));
    }

    #[test]
    fn test_sales_defaults() {
        let ids = FixedStampIdGenerator::new(5);
        let rows = vec![
            row(json!({"kode": "X"})),
            row(json!({"kode": "Y", "tanggal": "kemarin", "faktur": "", "customer": null})),
        ];

        let records = normalize_sales_rows(&rows, &ids, today());
        assert_eq!(records[0].tanggal, "2030-01-01");
        assert_eq!(records[0].customer, "Unknown");
        assert_eq!(records[0].total, Decimal::ZERO);
        assert_eq!(records[1].tanggal, "2030-01-01");
        assert_eq!(records[1].faktur, "sale-5-1");
        assert_eq!(records[1].customer, "Unknown");
    }

    #[test]
    fn test_first_alias_wins() {
        let record = normalize_stock_row(&row(json!({"kode": "K", "kode_produk": "KP"}))).unwrap();
        assert_eq!(record.kode_produk, "KP");
    }
}
