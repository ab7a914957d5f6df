use std::fmt::Write;

use crate::models::config::AssistantConfig;
use crate::models::records::{SalesRecord, StockRecord};

use super::ChatTurn;

const PERSONA: &str = "You are a helpful assistant for a stock and sales dashboard. \
Use the provided stock and sales data to answer user questions. Be concise and cite \
quantities or figures when available. If data is insufficient, explain what is missing.";

const CLOSING: &str = "Respond with actionable guidance grounded in the data above.";

/// How much context goes into a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    /// Leading rows taken from each dataset.
    pub context_rows: usize,
    /// Trailing conversation turns kept.
    pub history_turns: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            context_rows: 50,
            history_turns: 8,
        }
    }
}

impl From<&AssistantConfig> for PromptLimits {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            context_rows: config.context_rows,
            history_turns: config.history_turns,
        }
    }
}

/// Build the grounded prompt sent to the text-generation service.
pub fn build_prompt(
    question: &str,
    history: &[ChatTurn],
    stock: &[StockRecord],
    sales: &[SalesRecord],
    limits: PromptLimits,
) -> String {
    let stock_context = stock
        .iter()
        .take(limits.context_rows)
        .map(|r| {
            format!(
                "{} ({}) | qty {} | gudang {} | kategori {}",
                r.kode_produk, r.nama_produk, r.qty, r.gudang, r.kategori
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let sales_context = sales
        .iter()
        .take(limits.context_rows)
        .map(|s| {
            format!(
                "{} | {} bought {} of {} ({}) totaling {}",
                s.tanggal, s.customer, s.qty, s.kode_produk, s.nama_barang, s.total.normalize()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let skip = history.len().saturating_sub(limits.history_turns);
    let conversation = history[skip..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::new();
    let _ = writeln!(prompt, "{PERSONA}\n");
    let _ = writeln!(prompt, "Recent conversation:\n{}\n", or_placeholder(&conversation, "No prior conversation."));
    let _ = writeln!(
        prompt,
        "Stock dataset snapshot:\n{}\n",
        or_placeholder(&stock_context, "No stock records available.")
    );
    let _ = writeln!(
        prompt,
        "Sales dataset snapshot:\n{}\n",
        or_placeholder(&sales_context, "No sales records available.")
    );
    let _ = writeln!(prompt, "User question: {}\n", question.trim());
    prompt.push_str(CLOSING);
    prompt
}

fn or_placeholder<'a>(section: &'a str, placeholder: &'a str) -> &'a str {
    if section.is_empty() { placeholder } else { section }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::ChatRole;
    use rust_decimal::Decimal;

    fn stock(code: &str) -> StockRecord {
        StockRecord {
            kode_produk: code.to_string(),
            nama_produk: "FANTA".to_string(),
            kategori: "SOFT12".to_string(),
            satuan: "PCS".to_string(),
            gudang: "51B".to_string(),
            qty: 24,
        }
    }

    fn sale(code: &str) -> SalesRecord {
        SalesRecord {
            tanggal: "2025-10-01".to_string(),
            customer: "MW SHOPEE".to_string(),
            faktur: "JL-1".to_string(),
            kode_produk: code.to_string(),
            nama_barang: "BENG BENG".to_string(),
            qty: 2,
            harga_satuan: Decimal::from(44900),
            jumlah: Decimal::from(89800),
            total: Decimal::new(8980000, 2),
        }
    }

    fn turn(role: ChatRole, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_context_lines() {
        let prompt = build_prompt(
            "  Apa yang paling laku?  ",
            &[],
            &[stock("1006-12F")],
            &[sale("BN02-12H")],
            PromptLimits::default(),
        );

        assert!(prompt.contains("1006-12F (FANTA) | qty 24 | gudang 51B | kategori SOFT12"));
        assert!(prompt.contains("2025-10-01 | MW SHOPEE bought 2 of BN02-12H (BENG BENG) totaling 89800"));
        assert!(prompt.contains("No prior conversation."));
        assert!(prompt.contains("User question: Apa yang paling laku?\n"));
        assert!(prompt.ends_with(CLOSING));
    }

    #[test]
    fn test_placeholders_for_empty_datasets() {
        let prompt = build_prompt("q", &[], &[], &[], PromptLimits::default());
        assert!(prompt.contains("No stock records available."));
        assert!(prompt.contains("No sales records available."));
    }

    #[test]
    fn test_limits() {
        let stock_rows: Vec<StockRecord> = (0..5).map(|i| stock(&format!("S{i}"))).collect();
        let history = vec![
            turn(ChatRole::User, "first"),
            turn(ChatRole::Assistant, "second"),
            turn(ChatRole::User, "third"),
        ];
        let limits = PromptLimits {
            context_rows: 2,
            history_turns: 2,
        };

        let prompt = build_prompt("q", &history, &stock_rows, &[], limits);
        assert!(prompt.contains("S1 (FANTA)"));
        assert!(!prompt.contains("S2 (FANTA)"));
        assert!(!prompt.contains("first"));
        assert!(prompt.contains("ASSISTANT: second\nUSER: third"));
    }
}
