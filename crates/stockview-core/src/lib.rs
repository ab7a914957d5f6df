//! Core library for stock and sales ledgers.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract)
//! - Ledger classification and heuristic table extraction from PDF text
//! - Number and date normalisation for Indonesian ledger exports
//! - Reconciliation of stock and sales into a dashboard summary
//! - Dataset storage across key/value, disk and memory tiers
//! - Prompt construction for a data-grounded assistant

pub mod assistant;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod reconcile;
#[cfg(feature = "native")]
pub mod store;
pub mod validate;

pub use error::{Result, StockviewError};
pub use extract::{classify_and_extract, detect_document_type, DocumentParser, ExtractionResult, LedgerParser};
pub use models::config::StockviewConfig;
pub use models::records::{ConversionResult, Dataset, DocumentType, SalesRecord, StockRecord};
pub use models::summary::{DashboardSummary, LinkedProduct, NamedValue, Totals, TrendPoint};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
pub use reconcile::{reconcile, Reconciler};
#[cfg(feature = "native")]
pub use store::{DatasetStore, MemoryCache, WriteReport};
pub use validate::{validate_sales, validate_stock};
