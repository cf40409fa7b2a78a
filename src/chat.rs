// src/chat.rs
//
// Question-answering over the current article collection. The heavy lifting
// (the actual completion) is an external service; this module only filters
// candidates, builds the prompt, and shapes the response.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::ai_adapter::DynTextGenerator;
use crate::ingest::reference_now;
use crate::ingest::types::Article;

/// Sentinel answer when no article matches the question.
pub const NOT_FOUND_ANSWER: &str = "Not found";
/// Answer when the external service is unavailable or errors out.
pub const SERVICE_UNAVAILABLE_ANSWER: &str =
    "Sorry, I couldn't process your question right now. Please try again.";

/// Upper bound on articles forwarded to the completion service.
pub const MAX_CANDIDATES: usize = 5;

const SYSTEM_PROMPT: &str = "You are a News Assistant. Answer only from the provided summaries. \
     If the information is not in the summaries, reply exactly 'Not found'.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub timestamp: String,
}

/// Case-insensitive keyword filter: keep articles where any question word is
/// a substring of title + description + summary. At most [`MAX_CANDIDATES`].
pub fn search_articles_by_keyword<'a>(articles: &'a [Article], question: &str) -> Vec<&'a Article> {
    let keywords: Vec<String> = question
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect();

    articles
        .iter()
        .filter(|article| {
            let haystack = format!(
                "{} {} {}",
                article.title,
                article.description.as_deref().unwrap_or(""),
                article.summary.as_deref().unwrap_or("")
            )
            .to_lowercase();
            keywords.iter().any(|kw| haystack.contains(kw.as_str()))
        })
        .take(MAX_CANDIDATES)
        .collect()
}

/// Answer a question grounded in `articles`. Zero matching candidates short-
/// circuit to [`NOT_FOUND_ANSWER`] without calling the external service.
pub async fn answer_question(
    client: &DynTextGenerator,
    question: &str,
    articles: &[Article],
) -> ChatMessage {
    let candidates = search_articles_by_keyword(articles, question);

    let answer = if candidates.is_empty() {
        NOT_FOUND_ANSWER.to_string()
    } else {
        let summaries = candidates
            .iter()
            .enumerate()
            .map(|(i, a)| {
                format!(
                    "{}. {}\nSummary: {}\nSource: {}\n",
                    i + 1,
                    a.title,
                    a.summary
                        .as_deref()
                        .or(a.description.as_deref())
                        .unwrap_or("No summary available"),
                    a.source
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let user = format!("Question: {question}\n\nAvailable summaries:\n{summaries}");
        match client.generate(SYSTEM_PROMPT, &user).await {
            Some(text) => text,
            None => {
                tracing::warn!(provider = client.provider_name(), "chat completion unavailable");
                SERVICE_UNAVAILABLE_ANSWER.to_string()
            }
        }
    };

    ChatMessage {
        id: format!("msg-{}", uuid::Uuid::new_v4()),
        question: question.to_string(),
        answer,
        timestamp: reference_now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}
