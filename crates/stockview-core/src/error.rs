//! Error types for the stockview-core library.

use thiserror::Error;

use crate::models::records::{Dataset, DocumentType};

/// Main error type for the stockview library.
#[derive(Error, Debug)]
pub enum StockviewError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Table extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Payload validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage tier error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Assistant collaborator error.
    #[error("assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// JSON (de)serialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to document classification and table extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Neither the sales nor the stock keyword set produced a confident signal.
    #[error("unrecognized document: no sales or stock signal found")]
    UnrecognizedDocument,

    /// The document type was recognised but no row survived the row filters.
    #[error("no {document_type} rows could be extracted")]
    NoRows { document_type: DocumentType },
}

/// Errors raised while validating a full-dataset write payload.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The payload was not a JSON array.
    #[error("{dataset} payload must be an array of records")]
    NotAnArray { dataset: Dataset },

    /// A record did not match the wire shape.
    #[error("{dataset} record {index}: {message}")]
    Record {
        dataset: Dataset,
        index: usize,
        message: String,
    },
}

/// Errors from a single storage tier.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key/value REST tier failure.
    #[error("key/value store: {0}")]
    Kv(String),

    /// Disk tier failure.
    #[error("disk store: {0}")]
    Disk(#[from] std::io::Error),

    /// Stored bytes did not decode into the dataset shape.
    #[error("failed to decode stored {dataset}: {message}")]
    Decode { dataset: Dataset, message: String },
}

/// Errors from the text-generation collaborator.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No API key configured.
    #[error("missing GEMINI_API_KEY")]
    MissingApiKey,

    /// The question was empty after trimming.
    #[error("prompt is required")]
    EmptyQuestion,

    /// The service answered with a non-success status.
    #[error("generation request failed (status {status}): {body}")]
    Status { status: u16, body: String },

    /// Transport error.
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for the stockview library.
pub type Result<T> = std::result::Result<T, StockviewError>;
