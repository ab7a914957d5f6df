//! Derived dashboard view over the stock and sales datasets.
//!
//! Nothing here is persisted; every value is recomputed per request.

use rust_decimal::Decimal;
use serde::Serialize;

use super::records::{SalesRecord, StockRecord};

/// A stock record joined with its sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedProduct {
    /// Folded stock record (placeholder when the code has no stock entry).
    #[serde(flatten)]
    pub stock: StockRecord,

    /// Units sold, each sale clamped to be non-negative.
    pub total_sales: i64,

    /// Stock quantity minus units sold. Negative means oversold.
    pub remaining: i64,

    /// Linked sales in the order they were recorded.
    pub transactions: Vec<SalesRecord>,
}

/// Headline totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of clamped stock quantities across all linked products.
    pub stock_qty: i64,

    /// Units sold within the reference month (sum of clamped sale quantities).
    pub monthly_sales_qty: i64,

    /// Value of sales within the reference month. Each sale value is clamped
    /// to zero before summing, the same rule the daily trend applies.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub monthly_sales_value: Decimal,
}

/// A named bucket in a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: i64,
}

/// Sales value for one day, summed from clamped sale values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub value: Decimal,
}

/// Everything the dashboard needs in one object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub totals: Totals,

    /// Top sellers by units sold, descending.
    pub best_sellers: Vec<LinkedProduct>,

    /// Products with `qty < threshold` or `remaining < threshold`, ascending by remaining.
    pub low_stock: Vec<LinkedProduct>,

    /// Quantity per category, descending.
    pub stock_by_category: Vec<NamedValue>,

    /// Daily sales value, ascending by date.
    pub sales_trend: Vec<TrendPoint>,

    /// Quantity per warehouse, descending.
    pub warehouse_distribution: Vec<NamedValue>,

    /// All linked products.
    pub products: Vec<LinkedProduct>,
}
