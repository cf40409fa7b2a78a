//! AI adapter: provider abstraction over the external generative text
//! services. A missing credential builds a disabled client — degraded
//! output, never a startup failure.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A generative text backend. `generate` returns `None` for every failure
/// mode (missing credential, transport error, non-success status, empty
/// completion); callers treat `None` as "proceed without the text".
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Option<String>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynTextGenerator = Arc<dyn TextGenerator>;

/// Client for article summaries: Gemini when `GEMINI_API_KEY` is set,
/// a deterministic mock under `AI_TEST_MODE=mock`, otherwise disabled.
pub fn summary_client() -> DynTextGenerator {
    if mock_mode() {
        return Arc::new(MockGenerator {
            fixed: "A neutral two-sentence summary. Nothing else happened.".to_string(),
        });
    }
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => Arc::new(GeminiProvider::new(key, None)),
        _ => Arc::new(DisabledGenerator),
    }
}

/// Client for the Q&A chat: OpenAI when `OPENAI_API_KEY` is set,
/// mock/disabled along the same rules as [`summary_client`].
pub fn chat_client() -> DynTextGenerator {
    if mock_mode() {
        return Arc::new(MockGenerator {
            fixed: "Mock answer grounded in the provided summaries.".to_string(),
        });
    }
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Arc::new(OpenAiProvider::new(key, None)),
        _ => Arc::new(DisabledGenerator),
    }
}

fn mock_mode() -> bool {
    std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("ai-news-digest/0.1 (+rss reader)")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("reqwest client")
}

// ------------------------------------------------------------
// Gemini (generateContent) — used for article summaries
// ------------------------------------------------------------

pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        Self {
            http: http_client(),
            api_key,
            model: model_override.unwrap_or("gemini-2.5-flash").to_string(),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, system: &str, user: &str) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: RespContent,
        }
        #[derive(Deserialize)]
        struct RespContent {
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            text: String,
        }

        // Gemini has no separate system role on this endpoint; prepend it.
        let prompt = format!("{system}\n\n{user}");
        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .ok()?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "gemini call failed");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// OpenAI (chat completions) — used for the Q&A chat
// ------------------------------------------------------------

pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        Self {
            http: http_client(),
            api_key,
            model: model_override.unwrap_or("gpt-4o").to_string(),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiProvider {
    async fn generate(&self, system: &str, user: &str) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.1,
            max_tokens: 500,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .ok()?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "openai call failed");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            None
        } else {
            Some(content)
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Disabled / mock clients
// ------------------------------------------------------------

/// Returns `None` always; used when no credential is configured.
pub struct DisabledGenerator;

#[async_trait::async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _system: &str, _user: &str) -> Option<String> {
        None
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-output client for tests and local runs.
#[derive(Clone)]
pub struct MockGenerator {
    pub fixed: String,
}

#[async_trait::async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _system: &str, _user: &str) -> Option<String> {
        Some(self.fixed.clone())
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_yields_none() {
        let c = DisabledGenerator;
        assert_eq!(c.generate("sys", "user").await, None);
        assert_eq!(c.provider_name(), "disabled");
    }

    #[tokio::test]
    async fn mock_client_yields_its_fixed_text() {
        let c = MockGenerator {
            fixed: "hello".into(),
        };
        assert_eq!(c.generate("sys", "user").await.as_deref(), Some("hello"));
    }
}
