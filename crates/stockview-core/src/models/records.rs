//! Stock and sales ledger records in their wire-level JSON shape.

use std::fmt;

use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A stock ledger line: one product held in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StockRecord {
    /// Product code; the join key against sales.
    pub kode_produk: String,

    /// Product name.
    pub nama_produk: String,

    /// Category.
    pub kategori: String,

    /// Unit of measure.
    pub satuan: String,

    /// Warehouse code.
    pub gudang: String,

    /// Quantity on hand. May be negative in source data; aggregation clamps it.
    #[serde(deserialize_with = "deserialize_quantity")]
    pub qty: i64,
}

/// A sales ledger line: one product on one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalesRecord {
    /// Transaction date as an ISO 8601 date string.
    pub tanggal: String,

    /// Customer name.
    pub customer: String,

    /// Invoice / reference id.
    pub faktur: String,

    /// Product code; the join key against stock.
    pub kode_produk: String,

    /// Product name as printed on the sale.
    pub nama_barang: String,

    /// Quantity sold.
    #[serde(deserialize_with = "deserialize_quantity")]
    pub qty: i64,

    /// Unit price.
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "deserialize_amount"
    )]
    pub harga_satuan: Decimal,

    /// Line subtotal.
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "deserialize_amount"
    )]
    pub jumlah: Decimal,

    /// Line total.
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "deserialize_amount"
    )]
    pub total: Decimal,
}

impl SalesRecord {
    /// Best-effort monetary value of this sale.
    ///
    /// Prefers `total`, then `jumlah`, then `qty * harga_satuan`. Extraction
    /// coerces unreadable amounts to zero, so a zero amount counts as unresolved
    /// and the next source is tried. A free item recorded with a zero total and
    /// zero subtotal is therefore valued at its list price.
    pub fn sale_value(&self) -> Decimal {
        if !self.total.is_zero() {
            return self.total;
        }
        if !self.jumlah.is_zero() {
            return self.jumlah;
        }
        Decimal::from(self.qty).saturating_mul(self.harga_satuan)
    }
}

/// Kind of ledger a document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Sales ledger (laporan penjualan).
    Sales,
    /// Stock ledger (daftar saldo stock).
    Stock,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => f.write_str("sales"),
            Self::Stock => f.write_str("stock"),
        }
    }
}

/// Named dataset held by the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Stock,
    Sales,
}

impl Dataset {
    /// Storage key of this dataset.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Sales => "sales",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<DocumentType> for Dataset {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::Sales => Self::Sales,
            DocumentType::Stock => Self::Stock,
        }
    }
}

/// A record type stored as one named dataset.
pub trait DatasetRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Dataset this record type belongs to.
    const DATASET: Dataset;
}

impl DatasetRecord for StockRecord {
    const DATASET: Dataset = Dataset::Stock;
}

impl DatasetRecord for SalesRecord {
    const DATASET: Dataset = Dataset::Sales;
}

/// Typed rows recovered from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "rows", rename_all = "lowercase")]
pub enum ConversionResult {
    Sales(Vec<SalesRecord>),
    Stock(Vec<StockRecord>),
}

impl ConversionResult {
    /// Document type the rows were extracted as.
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::Sales(_) => DocumentType::Sales,
            Self::Stock(_) => DocumentType::Stock,
        }
    }

    /// Number of extracted rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Sales(rows) => rows.len(),
            Self::Stock(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accepts any JSON number and truncates it toward zero.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct QuantityVisitor;

    impl Visitor<'_> for QuantityVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom("quantity out of range"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.is_finite() {
                Ok(v.trunc() as i64)
            } else {
                Err(E::custom("quantity must be finite"))
            }
        }
    }

    deserializer.deserialize_any(QuantityVisitor)
}

/// Accepts any finite JSON number as a decimal amount.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            Decimal::try_from(v).map_err(|e| E::custom(e.to_string()))
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale(total: i64, jumlah: i64, qty: i64, price: i64) -> SalesRecord {
        SalesRecord {
            tanggal: "2025-10-01".to_string(),
            customer: "MW SHOPEE".to_string(),
            faktur: "JL-050222".to_string(),
            kode_produk: "BN02-12H".to_string(),
            nama_barang: "BN02-12H".to_string(),
            qty,
            harga_satuan: Decimal::from(price),
            jumlah: Decimal::from(jumlah),
            total: Decimal::from(total),
        }
    }

    #[test]
    fn test_sale_value_fallback_chain() {
        assert_eq!(sale(44900, 1, 1, 1).sale_value(), Decimal::from(44900));
        assert_eq!(sale(0, 30000, 2, 1).sale_value(), Decimal::from(30000));
        assert_eq!(sale(0, 0, 3, 1500).sale_value(), Decimal::from(4500));
        assert_eq!(sale(0, 0, 0, 0).sale_value(), Decimal::ZERO);
    }

    #[test]
    fn test_free_item_valued_at_list_price() {
        // a zero total reads as unresolved, not as a genuine zero
        assert_eq!(sale(0, 0, 2, 1500).sale_value(), Decimal::from(3000));
        assert_eq!(sale(0, 0, i64::MAX, i64::MAX).sale_value(), Decimal::MAX);
    }

    #[test]
    fn test_sales_record_serializes_numbers() {
        let value = serde_json::to_value(sale(44900, 44900, 1, 44900)).unwrap();
        assert_eq!(value["total"], json!(44900.0));
        assert_eq!(value["qty"], json!(1));
    }

    #[test]
    fn test_quantity_accepts_integral_float() {
        let record: StockRecord = serde_json::from_value(json!({
            "kode_produk": "1006-12F",
            "nama_produk": "1006 12 INC FANTA",
            "kategori": "SOFT12",
            "satuan": "PCS",
            "gudang": "51B",
            "qty": 3.0
        }))
        .unwrap();
        assert_eq!(record.qty, 3);
    }

    #[test]
    fn test_conversion_result_shape() {
        let result = ConversionResult::Stock(Vec::new());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "type": "stock", "rows": [] })
        );
        assert!(result.is_empty());
        assert_eq!(result.document_type(), DocumentType::Stock);
    }
}
