//! Batch command - convert many ledger files in one run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use stockview_core::extract::DocumentParser;
use stockview_core::models::records::{ConversionResult, DocumentType, SalesRecord, StockRecord};

use super::convert::{file_name, format_conversion, print_write_report, read_document_text, OutputFormat};
use super::{extension_of, load_config, open_store};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Replace each stored dataset with the merged rows of its type
    #[arg(long)]
    sync: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of converting a single file.
struct FileOutcome {
    path: PathBuf,
    conversion: Option<ConversionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| matches!(extension_of(p).as_str(), "pdf" | "txt"))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to convert",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = DocumentParser::new().with_config(config.extraction.clone());
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = convert_file(&path, &parser);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(conversion) => outcomes.push(FileOutcome {
                path,
                conversion: Some(conversion),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to convert {}: {}", path.display(), error_msg);
                    outcomes.push(FileOutcome {
                        path,
                        conversion: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to convert {}: {}", path.display(), error_msg);
                    anyhow::bail!("Conversion failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    let successful: Vec<_> = outcomes.iter().filter(|o| o.conversion.is_some()).collect();
    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for outcome in &successful {
            if let Some(conversion) = &outcome.conversion {
                let stem = outcome
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("ledger");
                let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));
                let content = format_conversion(conversion, &file_name(&outcome.path), args.format)?;
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    if args.sync {
        let (stock, sales) = merge_rows(&outcomes);
        let store = open_store(&config);
        if !stock.is_empty() {
            let count = stock.len();
            let report = store.replace(stock).await;
            print_write_report(DocumentType::Stock, count, report);
        }
        if !sales.is_empty() {
            let count = sales.len();
            let report = store.replace(sales).await;
            print_write_report(DocumentType::Sales, count, report);
        }
    }

    println!(
        "{} Converted {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    for outcome in &successful {
        if let Some(conversion) = &outcome.conversion {
            println!(
                "  - {}: {} {} rows",
                file_name(&outcome.path),
                conversion.len(),
                conversion.document_type()
            );
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn convert_file(path: &Path, parser: &DocumentParser) -> anyhow::Result<ConversionResult> {
    let text = read_document_text(path)?;
    parser
        .classify_and_extract(&text)
        .ok_or_else(|| anyhow::anyhow!("not recognised as a sales or stock report"))
}

/// Concatenate rows per document type, in file order.
fn merge_rows(outcomes: &[FileOutcome]) -> (Vec<StockRecord>, Vec<SalesRecord>) {
    let mut stock = Vec::new();
    let mut sales = Vec::new();
    for conversion in outcomes.iter().filter_map(|o| o.conversion.as_ref()) {
        match conversion {
            ConversionResult::Stock(rows) => stock.extend(rows.iter().cloned()),
            ConversionResult::Sales(rows) => sales.extend(rows.iter().cloned()),
        }
    }
    (stock, sales)
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "status", "type", "rows", "processing_time_ms", "error"])?;

    for outcome in outcomes {
        let filename = file_name(&outcome.path);
        let time_ms = outcome.processing_time_ms.to_string();

        if let Some(conversion) = &outcome.conversion {
            wtr.write_record([
                filename.as_str(),
                "success",
                &conversion.document_type().to_string(),
                &conversion.len().to_string(),
                &time_ms,
                "",
            ])?;
        } else {
            wtr.write_record([
                filename.as_str(),
                "error",
                "",
                "",
                &time_ms,
                outcome.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
