//! Keyword-density classification of extracted ledger text.

use tracing::debug;

use crate::models::records::DocumentType;

/// Characters scanned by [`detect_document_type`].
pub const DEFAULT_SCAN_CHARS: usize = 15_000;

const SALES_KEYWORDS: &[&str] = &["penjualan", "tanggal", "customer", "faktur", "kode produk"];
const STOCK_KEYWORDS: &[&str] = &["daftar saldo stock", "gudang", "qty", "kategori"];

const STOCK_ANCHOR: &str = "daftar saldo stock";
const SALES_ANCHOR: &str = "penjualan";

/// Keyword scores behind a classification decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub document_type: Option<DocumentType>,
    pub sales_hits: usize,
    pub stock_hits: usize,
}

/// Classify text as a sales or stock ledger, or `None` when unclassifiable.
pub fn detect_document_type(text: &str) -> Option<DocumentType> {
    classify(text, DEFAULT_SCAN_CHARS).document_type
}

/// Score the first `scan_chars` characters of `text` against both keyword sets.
///
/// Each keyword counts once regardless of how often it appears. Ties are
/// broken by the report title anchors; a tie without an anchor is
/// unclassifiable.
pub fn classify(text: &str, scan_chars: usize) -> Classification {
    let snippet: String = text.chars().take(scan_chars).collect::<String>().to_lowercase();

    let sales_hits = count_hits(&snippet, SALES_KEYWORDS);
    let stock_hits = count_hits(&snippet, STOCK_KEYWORDS);

    let document_type = match (sales_hits, stock_hits) {
        (0, 0) => None,
        (sales, stock) if sales == stock => {
            if snippet.contains(STOCK_ANCHOR) {
                Some(DocumentType::Stock)
            } else if snippet.contains(SALES_ANCHOR) {
                Some(DocumentType::Sales)
            } else {
                None
            }
        }
        (sales, stock) if sales > stock => Some(DocumentType::Sales),
        _ => Some(DocumentType::Stock),
    };

    debug!(
        "Classified text: sales_hits={}, stock_hits={}, type={:?}",
        sales_hits, stock_hits, document_type
    );

    Classification {
        document_type,
        sales_hits,
        stock_hits,
    }
}

fn count_hits(snippet: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|keyword| snippet.contains(*keyword)).count()
}
