use std::env;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::rationale::{contains_spoiler, sanitize_text, MAX_HINT_RATIONALE_LENGTH};

/// Chat-completions client for the optional enhancement passes: hint
/// keyword translation and a one-sentence hint rationale. Every public
/// operation fails open; the core never depends on a response.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl LlmClient {
    pub fn from_env(config: &LlmConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = env::var("LLM_API_KEY").ok()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
        })
    }

    /// Expand a hint into extra search keywords. Returns an empty list on
    /// any provider error.
    pub async fn translate_hint_keywords(&self, hint_text: &str) -> Vec<String> {
        if hint_text.trim().is_empty() {
            return Vec::new();
        }

        let system = "Extract search keywords from a movie/series request. \
            Include actor and director names, genres, themes, and settings. \
            Return ONLY comma-separated keywords, nothing else.";

        match self.chat(system, hint_text.trim(), 100, 0.2).await {
            Ok(response) => response
                .split(',')
                .map(|kw| kw.trim().to_lowercase())
                .filter(|kw| !kw.is_empty())
                .collect(),
            Err(err) => {
                debug!(error = %err, "hint keyword translation skipped");
                Vec::new()
            }
        }
    }

    /// One short sentence on why the item matches the hint. Returns `None`
    /// on any provider error or if the output fails the spoiler check.
    pub async fn hint_rationale(
        &self,
        hint_text: &str,
        item_title: &str,
        overview: Option<&str>,
    ) -> Option<String> {
        let overview = overview?;
        if hint_text.trim().is_empty() {
            return None;
        }

        let system = "You are a movie/series recommendation assistant. \
            In ONE short sentence (max 120 chars), explain why the title \
            matches the user's request. Be specific and concrete. No spoilers.";
        let truncated: String = overview.chars().take(600).collect();
        let user = format!(
            "User request: {}\nTitle: {}\nDescription: {}",
            hint_text, item_title, truncated
        );

        match self.chat(system, &user, 80, 0.3).await {
            Ok(response) => {
                let text = response.trim();
                if text.is_empty() || contains_spoiler(text) {
                    return None;
                }
                Some(sanitize_text(text, MAX_HINT_RATIONALE_LENGTH))
            }
            Err(err) => {
                warn!(error = %err, "hint rationale generation failed");
                None
            }
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, String> {
        let url = format!(
            "{}/chat/completions",
            self.api_base.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: self.model.clone(),
            temperature,
            max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("llm request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = body.trim();
            if detail.is_empty() {
                return Err(format!("llm api error: {}", status));
            }
            return Err(format!("llm api error: {} {}", status, detail));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| format!("llm response parse failed: {}", err))?;

        Ok(body
            .choices
            .first()
            .ok_or_else(|| "llm response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string())
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}
