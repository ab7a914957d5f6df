//! Summary command - reconcile the stored datasets into the dashboard view.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::info;

use stockview_core::models::summary::{DashboardSummary, LinkedProduct, NamedValue};
use stockview_core::normalize::format_rupiah;
use stockview_core::reconcile::Reconciler;

use super::{load_config, open_store};

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: SummaryFormat,

    /// Day whose month is reported when no sale has a readable date (YYYY-MM-DD)
    #[arg(long)]
    month_of: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SummaryFormat {
    /// JSON output
    Json,
    /// Plain text report
    Text,
}

pub async fn run(args: SummaryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config);

    let (stock, sales) = store.snapshot().await;
    info!("Reconciling {} stock and {} sales records", stock.len(), sales.len());

    let mut reconciler = Reconciler::new().with_config(config.reconciliation.clone());
    if let Some(day) = args.month_of {
        reconciler = reconciler.with_fallback_month(day);
    }
    let summary = reconciler.reconcile(&stock, &sales);

    let output = match args.format {
        SummaryFormat::Json => serde_json::to_string_pretty(&summary)?,
        SummaryFormat::Text => format_text(&summary),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(summary: &DashboardSummary) -> String {
    let mut output = String::new();

    output.push_str("Totals:\n");
    output.push_str(&format!("  Stock on hand:       {}\n", summary.totals.stock_qty));
    output.push_str(&format!("  Units sold (month):  {}\n", summary.totals.monthly_sales_qty));
    output.push_str(&format!(
        "  Sales value (month): Rp {}\n",
        format_rupiah(summary.totals.monthly_sales_value)
    ));
    output.push_str(&format!("  Products:            {}\n", summary.products.len()));

    push_products(&mut output, "Best sellers", &summary.best_sellers);
    push_products(&mut output, "Low stock", &summary.low_stock);
    push_buckets(&mut output, "Stock by category", &summary.stock_by_category);
    push_buckets(&mut output, "Stock by warehouse", &summary.warehouse_distribution);

    if !summary.sales_trend.is_empty() {
        output.push_str("\nSales trend:\n");
        for point in &summary.sales_trend {
            output.push_str(&format!("  {}  {}\n", point.date, point.value.normalize()));
        }
    }

    output
}

fn push_products(output: &mut String, title: &str, products: &[LinkedProduct]) {
    if products.is_empty() {
        return;
    }
    output.push_str(&format!("\n{}:\n", title));
    for product in products {
        let flag = if product.remaining < 0 { " (oversold)" } else { "" };
        output.push_str(&format!(
            "  {:<12} {:<30} sold {:>5}  remaining {:>6}{}\n",
            product.stock.kode_produk, product.stock.nama_produk, product.total_sales, product.remaining, flag
        ));
    }
}

fn push_buckets(output: &mut String, title: &str, buckets: &[NamedValue]) {
    if buckets.is_empty() {
        return;
    }
    output.push_str(&format!("\n{}:\n", title));
    for bucket in buckets {
        output.push_str(&format!("  {:<20} {}\n", bucket.name, bucket.value));
    }
}
