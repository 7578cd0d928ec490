use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::FALLBACK_REPLY;
use crate::config::AssistantConfig;

const SYSTEM_PROMPT: &str = "You are a helpful nutrition assistant that provides information \
about meals, calories, and nutritional content.";

/// Turns a free-text meal description into a free-text analysis.
#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    async fn analyze(&self, description: &str) -> anyhow::Result<String>;
}

fn user_prompt(description: &str) -> String {
    format!(
        "Please analyze this meal and provide information about:\n\
         - Estimated calories\n\
         - Portion sizes\n\
         - Nutritional information\n\
         - Suggestions for healthier alternatives if applicable\n\
         \n\
         Meal description: {description}\n\
         \n\
         Please respond in a friendly, helpful tone. Keep your response concise and focused on the nutritional aspects."
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Chat-completions client for OpenAI or any compatible endpoint.
pub struct OpenAiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiAnalyzer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MealAnalyzer for OpenAiAnalyzer {
    async fn analyze(&self, description: &str) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(description),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("chat completion failed: HTTP {status}: {text}");
        }

        let parsed: ChatResponse = response.json().await.context("chat completion body")?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());
        debug!(model = %self.model, chars = reply.len(), "meal analyzed");
        Ok(reply)
    }
}

/// Stand-in when no API key is configured; every call fails.
pub struct DisabledAnalyzer;

#[async_trait]
impl MealAnalyzer for DisabledAnalyzer {
    async fn analyze(&self, _description: &str) -> anyhow::Result<String> {
        anyhow::bail!("meal assistant is not configured (OPENAI_API_KEY missing)")
    }
}

/// Replies with the same text every time. Used for offline runs and tests.
pub struct StaticAnalyzer(String);

impl StaticAnalyzer {
    pub fn new(reply: impl Into<String>) -> Self {
        Self(reply.into())
    }
}

#[async_trait]
impl MealAnalyzer for StaticAnalyzer {
    async fn analyze(&self, _description: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

pub fn from_config(cfg: &AssistantConfig) -> Arc<dyn MealAnalyzer> {
    match &cfg.api_key {
        Some(key) => Arc::new(OpenAiAnalyzer::new(key, &cfg.model, &cfg.base_url)),
        None => {
            warn!("OPENAI_API_KEY not set; meal assistant will only apologize");
            Arc::new(DisabledAnalyzer)
        }
    }
}
