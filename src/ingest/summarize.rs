// src/ingest/summarize.rs
//
// Summarizer: asks the configured text generator for a short neutral
// summary and enforces the word budget locally. Every failure mode
// collapses to "no summary"; the batch never fails because of one item.

use crate::ai_adapter::DynTextGenerator;

/// Maximum words in a stored summary.
pub const SUMMARY_WORD_BUDGET: usize = 80;

const SYSTEM_PROMPT: &str = "You are a news summarizer. Write a neutral, factual summary of the \
     article in 2-4 sentences and at most 80 words. Output only the summary.";

#[derive(Clone)]
pub struct Summarizer {
    client: DynTextGenerator,
    word_budget: usize,
}

impl Summarizer {
    pub fn new(client: DynTextGenerator) -> Self {
        Self {
            client,
            word_budget: SUMMARY_WORD_BUDGET,
        }
    }

    /// Generate a bounded summary for one article. `None` when the client
    /// is disabled, the call fails, or the service returns nothing usable.
    pub async fn summarize(&self, title: &str, description: &str) -> Option<String> {
        let user = format!("Title: {title}\n\nDescription: {description}");
        let text = self.client.generate(SYSTEM_PROMPT, &user).await?;
        let text = text.trim();
        if text.is_empty() {
            metrics::counter!("summaries_missing_total").increment(1);
            return None;
        }
        metrics::counter!("summaries_generated_total").increment(1);
        Some(enforce_word_budget(text, self.word_budget))
    }
}

/// Truncate to `budget` words and append an ellipsis marker; text already
/// within budget passes through untouched.
pub fn enforce_word_budget(text: &str, budget: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= budget {
        return text.to_string();
    }
    let mut out = words[..budget].join(" ");
    out.push_str("...");
    out
}
