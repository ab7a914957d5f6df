//! Conversational assistant grounded in the stock and sales datasets.

#[cfg(feature = "native")]
mod gemini;
mod prompt;

#[cfg(feature = "native")]
pub use gemini::{GeminiClient, FALLBACK_REPLY};
pub use prompt::{build_prompt, PromptLimits};

use serde::{Deserialize, Serialize};

#[cfg(feature = "native")]
use crate::error::AssistantError;
#[cfg(feature = "native")]
use crate::models::records::{SalesRecord, StockRecord};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Upper-case label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
        }
    }
}

/// One earlier message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Answers questions about the current datasets.
#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct Assistant {
    client: GeminiClient,
    limits: PromptLimits,
}

#[cfg(feature = "native")]
impl Assistant {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            limits: PromptLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: PromptLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Answer `question` using the given dataset snapshots.
    pub async fn ask(
        &self,
        question: &str,
        history: &[ChatTurn],
        stock: &[StockRecord],
        sales: &[SalesRecord],
    ) -> Result<String, AssistantError> {
        if question.trim().is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let prompt = build_prompt(question, history, stock, sales, self.limits);
        self.client.generate(&prompt).await
    }
}
