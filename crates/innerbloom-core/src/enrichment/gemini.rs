//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{non_empty, prompts, ChatSession, Enricher, SessionSummary};
use crate::error::EnrichmentError;
use crate::model::{CheckIn, ConversationTurn, JournalEntry};
use crate::storage::EnrichmentConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![Part { text: text.into() }],
        }
    }

    fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".into()),
            parts: vec![Part { text: text.into() }],
        }
    }

    fn instruction(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        Some(text)
    }
}

/// HTTP client for the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiClient {
    /// Build a client for `config.model` at `config.base_url`.
    ///
    /// # Errors
    /// `Unavailable` if the endpoint URL is malformed or the HTTP client
    /// cannot be built.
    pub fn new(config: &EnrichmentConfig, api_key: impl Into<String>) -> Result<Self, EnrichmentError> {
        let raw = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        let endpoint = Url::parse(&raw)
            .map_err(|e| EnrichmentError::Unavailable(format!("invalid endpoint {raw}: {e}")))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Build a client with the key from `config.api_key_env`.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let key = config.api_key().ok_or_else(|| {
            EnrichmentError::Unavailable(format!("{} is not set", config.api_key_env))
        })?;
        Self::new(config, key)
    }

    async fn generate(
        &self,
        contents: &[Content],
        system_instruction: Option<&str>,
    ) -> Result<String, EnrichmentError> {
        let body = GenerateRequest {
            contents,
            system_instruction: system_instruction.map(Content::instruction),
        };
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(EnrichmentError::Unavailable(format!(
                "Gemini request failed: HTTP {}",
                resp.status()
            )));
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed
            .text()
            .ok_or_else(|| EnrichmentError::Unavailable("response had no candidates".into()))?;
        non_empty(text)
    }

    async fn generate_text(
        &self,
        prompt: String,
        system_instruction: Option<&str>,
    ) -> Result<String, EnrichmentError> {
        let result = self.generate(&[Content::user(prompt)], system_instruction).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "generation failed");
        }
        result
    }

    /// Start a multi-turn guided session.
    pub fn chat(&self) -> GeminiChat {
        GeminiChat {
            client: self.clone(),
            history: Vec::new(),
        }
    }
}

#[async_trait]
impl Enricher for GeminiClient {
    async fn journal_reflection(&self, text: &str) -> Result<String, EnrichmentError> {
        self.generate_text(
            prompts::journal_reflection(text),
            Some(prompts::COMPANION_INSTRUCTION),
        )
        .await
    }

    async fn daily_insight(
        &self,
        check_ins: &[CheckIn],
        entries: &[JournalEntry],
    ) -> Result<String, EnrichmentError> {
        self.generate_text(prompts::daily_insight(check_ins, entries), None)
            .await
    }

    async fn journal_prompt(&self, latest: &CheckIn) -> Result<String, EnrichmentError> {
        self.generate_text(prompts::journal_prompt(latest), None).await
    }

    async fn session_summary(
        &self,
        conversation: &[ConversationTurn],
    ) -> Result<SessionSummary, EnrichmentError> {
        let text = self
            .generate_text(prompts::session_summary(conversation), None)
            .await?;
        Ok(prompts::parse_session_summary(&text))
    }

    async fn monthly_report(
        &self,
        check_ins: &[CheckIn],
        themes: &[String],
    ) -> Result<String, EnrichmentError> {
        self.generate_text(prompts::monthly_report(check_ins, themes), None)
            .await
    }
}

/// Multi-turn conversation that resends its history on every turn.
pub struct GeminiChat {
    client: GeminiClient,
    history: Vec<Content>,
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn start(&mut self) -> Result<String, EnrichmentError> {
        self.history.clear();
        self.send(prompts::SESSION_OPENER).await
    }

    async fn send(&mut self, text: &str) -> Result<String, EnrichmentError> {
        self.history.push(Content::user(text));
        match self
            .client
            .generate(&self.history, Some(prompts::THERAPIST_INSTRUCTION))
            .await
        {
            Ok(reply) => {
                self.history.push(Content::model(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                // Drop the unanswered turn so the user can resend it.
                self.history.pop();
                Err(e)
            }
        }
    }
}
