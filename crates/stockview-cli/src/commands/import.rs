//! Import command - replace a dataset from a JSON payload or a CSV export.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Args;
use console::style;
use serde_json::Value;
use tracing::{debug, info};

use stockview_core::extract::ClockIdGenerator;
use stockview_core::ingest::{normalize_sales_rows, normalize_stock_rows, RawRow};
use stockview_core::models::records::{ConversionResult, DocumentType};
use stockview_core::validate::{validate_sales, validate_stock};

use super::convert::{print_write_report, sync_conversion, DocumentKind};
use super::{extension_of, load_config, open_store};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Dataset to replace
    #[arg(value_enum)]
    dataset: DocumentKind,

    /// JSON array of records, or a CSV export with a header row
    #[arg(required = true)]
    input: PathBuf,

    /// Validate and count rows without writing
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: ImportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let document_type = DocumentType::from(args.dataset);
    info!("Importing {} from {}", document_type, args.input.display());

    let rows = match extension_of(&args.input).as_str() {
        "json" => read_json_rows(&args.input, document_type)?,
        "csv" => read_csv_rows(&args.input, document_type)?,
        other => anyhow::bail!("Unsupported file format: {}", other),
    };

    if args.dry_run {
        println!(
            "{} {} valid {} rows (dry run, nothing written)",
            style("ℹ").blue(),
            rows.len(),
            document_type
        );
        return Ok(());
    }

    let store = open_store(&config);
    let report = sync_conversion(&store, &rows).await;
    print_write_report(document_type, rows.len(), report);

    println!(
        "{} Imported {} {} rows",
        style("✓").green(),
        rows.len(),
        document_type
    );

    Ok(())
}

/// Strictly validate a JSON array of wire-shaped records.
fn read_json_rows(path: &Path, document_type: DocumentType) -> anyhow::Result<ConversionResult> {
    let content = fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&content)?;

    let rows = match document_type {
        DocumentType::Stock => ConversionResult::Stock(validate_stock(&payload)?),
        DocumentType::Sales => ConversionResult::Sales(validate_sales(&payload)?),
    };
    Ok(rows)
}

/// Decode a CSV export and map its columns through the alias tables.
fn read_csv_rows(path: &Path, document_type: DocumentType) -> anyhow::Result<ConversionResult> {
    let raw = decode_csv(fs::File::open(path)?)?;
    debug!("Decoded {} CSV rows from {}", raw.len(), path.display());

    let rows = match document_type {
        DocumentType::Stock => ConversionResult::Stock(normalize_stock_rows(&raw)),
        DocumentType::Sales => ConversionResult::Sales(normalize_sales_rows(
            &raw,
            &ClockIdGenerator,
            Utc::now().date_naive(),
        )),
    };
    Ok(rows)
}

/// Read CSV records as header-keyed rows of string values.
fn decode_csv<R: std::io::Read>(reader: R) -> anyhow::Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_csv_keys_by_header() {
        let data = "Kode Produk,Nama Produk,Qty\n 1006-12F ,FANTA,24\nBN02-12H,BENG BENG,\n";
        let rows = decode_csv(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Kode Produk"], Value::String("1006-12F".to_string()));
        assert_eq!(rows[1]["Qty"], Value::String(String::new()));
    }

    #[test]
    fn test_csv_rows_map_through_aliases() {
        let data = "sku,product_name,warehouse,stock\nA1,Apel,GD01,5\n,No Code,GD01,3\n";
        let raw = decode_csv(data.as_bytes()).unwrap();
        let rows = normalize_stock_rows(&raw);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kode_produk, "A1");
        assert_eq!(rows[0].gudang, "GD01");
        assert_eq!(rows[0].qty, 5);
    }
}
