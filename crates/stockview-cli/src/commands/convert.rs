//! Convert command - classify one ledger document and extract its rows.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, info};

use stockview_core::extract::DocumentParser;
use stockview_core::models::records::{ConversionResult, DocumentType};
use stockview_core::pdf::{PdfExtractor, PdfProcessor, PdfType};
use stockview_core::store::{DatasetStore, WriteReport};

use super::{extension_of, load_config, open_store};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip classification and extract as this document type
    #[arg(long = "as", value_enum)]
    force_type: Option<DocumentKind>,

    /// Replace the matching stored dataset with the extracted rows
    #[arg(long)]
    sync: bool,

    /// Show extraction statistics
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum DocumentKind {
    Stock,
    Sales,
}

impl From<DocumentKind> for DocumentType {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Stock => DocumentType::Stock,
            DocumentKind::Sales => DocumentType::Sales,
        }
    }
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Converting file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading document...");
    pb.set_position(10);
    let text = read_document_text(&args.input)?;

    pb.set_message("Extracting rows...");
    pb.set_position(50);
    let parser = DocumentParser::new().with_config(config.extraction.clone());
    let extraction = match args.force_type {
        Some(kind) => parser.extract_as(&text, kind.into()),
        None => {
            let Some(document_type) = parser.detect(&text) else {
                pb.abandon();
                anyhow::bail!(
                    "Could not recognise {} as a sales or stock report",
                    args.input.display()
                );
            };
            parser.extract_as(&text, document_type)
        }
    };
    let conversion = extraction.conversion;

    pb.set_position(100);
    pb.finish_and_clear();

    if args.sync {
        let store = open_store(&config);
        let report = sync_conversion(&store, &conversion).await;
        print_write_report(conversion.document_type(), conversion.len(), report);
    }

    let output = format_conversion(&conversion, &file_name(&args.input), args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.stats {
        eprintln!();
        eprintln!(
            "{} {} lines examined, {} skipped, header {}",
            style("ℹ").blue(),
            extraction.line_count,
            extraction.skipped_lines,
            if extraction.header_found { "found" } else { "not found" }
        );
        eprintln!(
            "{} Extraction time: {}ms",
            style("ℹ").blue(),
            extraction.processing_time_ms
        );
    }

    debug!("Total conversion time: {:?}", start.elapsed());

    Ok(())
}

/// Read the text of a PDF or plain-text ledger export.
pub fn read_document_text(path: &Path) -> anyhow::Result<String> {
    let extension = extension_of(path);
    let text = match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::new();
            extractor.load(&data)?;
            let content = extractor.extract_all()?;
            debug!("PDF has {} pages", content.page_count);

            if content.pdf_type == PdfType::Empty {
                anyhow::bail!("PDF has no extractable text layer: {}", path.display());
            }
            content.text
        }
        "txt" | "text" | "" => fs::read_to_string(path)?,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text could be extracted from {}", path.display());
    }
    Ok(text)
}

/// Replace the dataset matching the conversion's document type.
pub async fn sync_conversion(store: &DatasetStore, conversion: &ConversionResult) -> WriteReport {
    match conversion {
        ConversionResult::Sales(rows) => store.replace(rows.clone()).await,
        ConversionResult::Stock(rows) => store.replace(rows.clone()).await,
    }
}

pub fn print_write_report(document_type: DocumentType, count: usize, report: WriteReport) {
    if report.is_durable() {
        eprintln!(
            "{} Replaced {} dataset with {} rows (kv: {}, disk: {})",
            style("✓").green(),
            document_type,
            count,
            report.kv,
            report.disk
        );
    } else {
        eprintln!(
            "{} {} rows for {} were not persisted by any storage tier",
            style("⚠").yellow(),
            count,
            document_type
        );
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

pub fn format_conversion(
    conversion: &ConversionResult,
    file_name: &str,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(conversion)?;
            value["count"] = json!(conversion.len());
            value["fileName"] = json!(file_name);
            Ok(serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Csv => format_csv(conversion),
        OutputFormat::Text => Ok(format_text(conversion, file_name)),
    }
}

fn format_csv(conversion: &ConversionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match conversion {
        ConversionResult::Sales(rows) => {
            for row in rows {
                wtr.serialize(row)?;
            }
        }
        ConversionResult::Stock(rows) => {
            for row in rows {
                wtr.serialize(row)?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(conversion: &ConversionResult, file_name: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", file_name));
    output.push_str(&format!("Type: {}\n", conversion.document_type()));
    output.push_str(&format!("Rows: {}\n", conversion.len()));

    match conversion {
        ConversionResult::Sales(rows) if !rows.is_empty() => {
            output.push('\n');
            for row in rows {
                output.push_str(&format!(
                    "  {}  {:<12} {:<10} {:>5} x {}  = {}\n",
                    row.tanggal,
                    row.faktur,
                    row.kode_produk,
                    row.qty,
                    row.harga_satuan.normalize(),
                    row.total.normalize()
                ));
            }
        }
        ConversionResult::Stock(rows) if !rows.is_empty() => {
            output.push('\n');
            for row in rows {
                output.push_str(&format!(
                    "  {:<10} {:<30} {:>6} {:<5} {}\n",
                    row.kode_produk, row.nama_produk, row.qty, row.satuan, row.gudang
                ));
            }
        }
        _ => {}
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockview_core::models::records::StockRecord;

    fn stock() -> ConversionResult {
        ConversionResult::Stock(vec![StockRecord {
            kode_produk: "1006-12F".to_string(),
            nama_produk: "FANTA STRAWBERRY".to_string(),
            kategori: "SOFT12".to_string(),
            satuan: "PCS".to_string(),
            gudang: "51B".to_string(),
            qty: 24,
        }])
    }

    #[test]
    fn test_json_envelope() {
        let output = format_conversion(&stock(), "saldo.pdf", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["type"], "stock");
        assert_eq!(value["count"], 1);
        assert_eq!(value["fileName"], "saldo.pdf");
        assert_eq!(value["rows"][0]["kode_produk"], "1006-12F");
    }

    #[test]
    fn test_csv_has_header() {
        let output = format_conversion(&stock(), "saldo.pdf", OutputFormat::Csv).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("kode_produk,nama_produk,kategori,satuan,gudang,qty")
        );
        assert_eq!(lines.next(), Some("1006-12F,FANTA STRAWBERRY,SOFT12,PCS,51B,24"));
    }

    #[test]
    fn test_empty_text_output() {
        let output = format_conversion(
            &ConversionResult::Sales(Vec::new()),
            "jual.txt",
            OutputFormat::Text,
        )
        .unwrap();
        assert!(output.contains("Type: sales"));
        assert!(output.contains("Rows: 0"));
    }
}
