//! Joins stock and sales into the dashboard summary.
//!
//! Everything here is a pure function of the two input snapshots. Inputs are
//! borrowed and never modified; the summary owns clones of what it reports.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::extract::stock::{NO_VALUE, UNASSIGNED_CATEGORY};
use crate::models::config::ReconciliationConfig;
use crate::models::records::{SalesRecord, StockRecord};
use crate::models::summary::{DashboardSummary, LinkedProduct, NamedValue, Totals, TrendPoint};
use crate::normalize::{parse_flexible_day, to_iso};

const UNKNOWN_CATEGORY: &str = "UNKNOWN";
const UNKNOWN_WAREHOUSE: &str = "N/A";

/// Summary builder with configurable ranking limits.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconciliationConfig,
    fallback_month: Option<NaiveDate>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ranking limits and the low-stock threshold.
    pub fn with_config(mut self, config: ReconciliationConfig) -> Self {
        self.config = config;
        self
    }

    /// Reference day used when no sale carries a readable date. Defaults to today.
    pub fn with_fallback_month(mut self, day: NaiveDate) -> Self {
        self.fallback_month = Some(day);
        self
    }

    /// Build the dashboard summary. Empty inputs give an all-zero summary.
    pub fn reconcile(&self, stock: &[StockRecord], sales: &[SalesRecord]) -> DashboardSummary {
        let products = link_products(stock, sales);

        let reference = reference_day(sales)
            .or(self.fallback_month)
            .unwrap_or_else(|| Utc::now().date_naive());
        let monthly: Vec<&SalesRecord> = sales
            .iter()
            .filter(|sale| {
                parse_flexible_day(&sale.tanggal).is_some_and(|day| same_month(day, reference))
            })
            .collect();

        let totals = Totals {
            stock_qty: sum_clamped(products.iter().map(|p| p.stock.qty)),
            monthly_sales_qty: sum_clamped(monthly.iter().map(|sale| sale.qty)),
            monthly_sales_value: monthly
                .iter()
                .fold(Decimal::ZERO, |acc, sale| acc.saturating_add(clamped_value(sale))),
        };

        debug!(
            "Reconciled {} products, reference month {}-{:02}, {} sales in month",
            products.len(),
            reference.year(),
            reference.month(),
            monthly.len()
        );

        DashboardSummary {
            totals,
            best_sellers: self.best_sellers(&products),
            low_stock: self.low_stock(&products),
            stock_by_category: distribution(&products, |p| &p.stock.kategori, UNKNOWN_CATEGORY),
            sales_trend: sales_trend(sales),
            warehouse_distribution: distribution(&products, |p| &p.stock.gudang, UNKNOWN_WAREHOUSE),
            products,
        }
    }

    fn best_sellers(&self, products: &[LinkedProduct]) -> Vec<LinkedProduct> {
        let mut ranked: Vec<&LinkedProduct> = products.iter().collect();
        ranked.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
        ranked
            .into_iter()
            .take(self.config.best_seller_limit)
            .cloned()
            .collect()
    }

    fn low_stock(&self, products: &[LinkedProduct]) -> Vec<LinkedProduct> {
        let threshold = self.config.low_stock_threshold;
        let mut low: Vec<&LinkedProduct> = products
            .iter()
            .filter(|p| p.stock.qty < threshold || p.remaining < threshold)
            .collect();
        low.sort_by_key(|p| p.remaining);
        low.into_iter()
            .take(self.config.low_stock_limit)
            .cloned()
            .collect()
    }
}

/// Build the dashboard summary with default limits.
pub fn reconcile(stock: &[StockRecord], sales: &[SalesRecord]) -> DashboardSummary {
    Reconciler::new().reconcile(stock, sales)
}

/// Fold stock rows by product code.
///
/// Quantities are clamped and summed; the last row seen for a code supplies
/// its name, category, unit and warehouse. Output follows first appearance.
pub fn fold_stock(stock: &[StockRecord]) -> Vec<StockRecord> {
    let mut folded: Vec<StockRecord> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in stock {
        let qty = record.qty.max(0);
        match index.get(record.kode_produk.as_str()) {
            Some(&i) => {
                let merged = &mut folded[i];
                let total = merged.qty.saturating_add(qty);
                *merged = record.clone();
                merged.qty = total;
            }
            None => {
                index.insert(&record.kode_produk, folded.len());
                folded.push(StockRecord {
                    qty,
                    ..record.clone()
                });
            }
        }
    }

    folded
}

/// Group sales by product code, keeping recorded order within each group.
/// Codes are listed in order of first appearance.
pub fn group_sales(sales: &[SalesRecord]) -> Vec<(&str, Vec<&SalesRecord>)> {
    let mut groups: Vec<(&str, Vec<&SalesRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sale in sales {
        let code = sale.kode_produk.as_str();
        match index.get(code) {
            Some(&i) => groups[i].1.push(sale),
            None => {
                index.insert(code, groups.len());
                groups.push((code, vec![sale]));
            }
        }
    }

    groups
}

/// One linked product per code seen in either dataset.
///
/// Stocked codes come first in stock order, then codes that only appear in
/// sales in sales order. Codes without stock get a zero-quantity placeholder.
pub fn link_products(stock: &[StockRecord], sales: &[SalesRecord]) -> Vec<LinkedProduct> {
    let folded = fold_stock(stock);
    let mut groups: HashMap<&str, Vec<&SalesRecord>> = HashMap::new();
    let mut sales_only: Vec<&SalesRecord> = Vec::new();

    let stocked: HashSet<&str> = folded.iter().map(|s| s.kode_produk.as_str()).collect();
    for (code, group) in group_sales(sales) {
        if !stocked.contains(code) {
            sales_only.push(group[0]);
        }
        groups.insert(code, group);
    }

    let placeholders = sales_only.into_iter().map(placeholder_stock);
    let linked: Vec<StockRecord> = folded.iter().cloned().chain(placeholders).collect();

    linked
        .into_iter()
        .map(|record| {
            let transactions: Vec<SalesRecord> = groups
                .get(record.kode_produk.as_str())
                .map(|group| group.iter().map(|sale| (*sale).clone()).collect())
                .unwrap_or_default();
            let total_sales = sum_clamped(transactions.iter().map(|sale| sale.qty));

            LinkedProduct {
                remaining: record.qty.saturating_sub(total_sales),
                total_sales,
                transactions,
                stock: record,
            }
        })
        .collect()
}

fn placeholder_stock(first_sale: &SalesRecord) -> StockRecord {
    StockRecord {
        kode_produk: first_sale.kode_produk.clone(),
        nama_produk: if first_sale.nama_barang.is_empty() {
            first_sale.kode_produk.clone()
        } else {
            first_sale.nama_barang.clone()
        },
        kategori: UNASSIGNED_CATEGORY.to_string(),
        satuan: NO_VALUE.to_string(),
        gudang: NO_VALUE.to_string(),
        qty: 0,
    }
}

/// Latest readable sale date; its calendar month is the reference month.
pub fn reference_day(sales: &[SalesRecord]) -> Option<NaiveDate> {
    sales
        .iter()
        .filter_map(|sale| parse_flexible_day(&sale.tanggal))
        .max()
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn distribution<F>(products: &[LinkedProduct], key: F, empty_label: &str) -> Vec<NamedValue>
where
    F: Fn(&LinkedProduct) -> &String,
{
    let mut buckets: Vec<NamedValue> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for product in products {
        let raw = key(product).trim();
        let name = if raw.is_empty() { empty_label } else { raw };
        let qty = product.stock.qty.max(0);
        match index.get(name) {
            Some(&i) => buckets[i].value = buckets[i].value.saturating_add(qty),
            None => {
                index.insert(name.to_string(), buckets.len());
                buckets.push(NamedValue {
                    name: name.to_string(),
                    value: qty,
                });
            }
        }
    }

    buckets.sort_by(|a, b| b.value.cmp(&a.value));
    buckets
}

/// Daily sale value, ascending by day. Sales without a readable date are left out.
///
/// Values are clamped like the monthly total, so a refund line never drags a
/// day below zero.
pub fn sales_trend(sales: &[SalesRecord]) -> Vec<TrendPoint> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for sale in sales {
        match parse_flexible_day(&sale.tanggal) {
            Some(day) => {
                let value = days.entry(day).or_insert(Decimal::ZERO);
                *value = value.saturating_add(clamped_value(sale));
            }
            None => debug!("Leaving undated sale {} out of trend", sale.faktur),
        }
    }

    days.into_iter()
        .map(|(day, value)| TrendPoint {
            date: to_iso(day),
            value,
        })
        .collect()
}

/// Sum of non-negative quantities, saturating at `i64::MAX`.
fn sum_clamped(quantities: impl Iterator<Item = i64>) -> i64 {
    quantities.fold(0i64, |acc, qty| acc.saturating_add(qty.max(0)))
}

fn clamped_value(sale: &SalesRecord) -> Decimal {
    sale.sale_value().max(Decimal::ZERO)
}
