use async_trait::async_trait;
use std::time::Duration;

use crate::error::{BearBitesError, Result};
use crate::llm::prompts::{spicy_classification_prompt, SPICY_MAX_TOKENS, SPICY_SYSTEM_PROMPT};
use crate::llm::{ChatPrompt, LlmProvider};

/// Decides whether a dish is spicy from its name and flattened ingredients.
#[async_trait]
pub trait SpicyClassifier: Send + Sync {
    async fn classify(&self, food_name: &str, ingredients: &str) -> Result<bool>;
}

pub struct LlmSpicyClassifier {
    llm: LlmProvider,
    call_timeout: Duration,
}

impl LlmSpicyClassifier {
    pub fn new(llm: LlmProvider, call_timeout: Duration) -> Self {
        Self { llm, call_timeout }
    }
}

#[async_trait]
impl SpicyClassifier for LlmSpicyClassifier {
    async fn classify(&self, food_name: &str, ingredients: &str) -> Result<bool> {
        let user = spicy_classification_prompt(food_name, ingredients);
        let prompt = ChatPrompt {
            system: SPICY_SYSTEM_PROMPT,
            user: &user,
            max_tokens: SPICY_MAX_TOKENS,
        };

        let reply = tokio::time::timeout(self.call_timeout, self.llm.complete(&prompt))
            .await
            .map_err(|_| BearBitesError::Timeout(self.call_timeout.as_secs()))??;

        parse_spicy_response(&reply).ok_or_else(|| {
            BearBitesError::Llm(format!(
                "Unrecognised classification reply: {}",
                reply.chars().take(80).collect::<String>()
            ))
        })
    }
}

/// Find a `"spicy": <bool>` pair anywhere in a model reply, ignoring case
/// and surrounding prose or code fences. `None` when no such pair exists.
pub fn parse_spicy_response(reply: &str) -> Option<bool> {
    const KEY: &str = "\"spicy\"";
    let lower = reply.to_lowercase();

    let mut from = 0;
    while let Some(found) = lower[from..].find(KEY) {
        let after_key = from + found + KEY.len();
        let rest = lower[after_key..].trim_start();
        if let Some(value) = rest.strip_prefix(':').map(str::trim_start) {
            if value.starts_with("true") {
                return Some(true);
            }
            if value.starts_with("false") {
                return Some(false);
            }
        }
        from = after_key;
    }
    None
}
