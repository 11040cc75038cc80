//! Enrichment stubs shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::enrichment::{ChatSession, Enricher, SessionSummary};
use crate::error::EnrichmentError;
use crate::model::{CheckIn, ConversationTurn, JournalEntry};

fn unavailable() -> EnrichmentError {
    EnrichmentError::Unavailable("stub offline".into())
}

/// Always answers with fixed text and logs every reflection request.
pub struct StaticEnricher {
    reflection: String,
    delay: Option<Duration>,
    fail_containing: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl StaticEnricher {
    pub fn new(reflection: &str) -> Self {
        Self {
            reflection: reflection.to_string(),
            delay: None,
            fail_containing: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to overlap concurrent callers.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail reflections for entries whose content contains `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_containing = Some(needle.to_string());
        self
    }

    /// Contents passed to `journal_reflection`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Enricher for StaticEnricher {
    async fn journal_reflection(&self, text: &str) -> Result<String, EnrichmentError> {
        self.calls.lock().unwrap().push(text.to_string());
        self.pause().await;
        match &self.fail_containing {
            Some(needle) if text.contains(needle.as_str()) => Err(unavailable()),
            _ => Ok(self.reflection.clone()),
        }
    }

    async fn daily_insight(
        &self,
        _check_ins: &[CheckIn],
        _entries: &[JournalEntry],
    ) -> Result<String, EnrichmentError> {
        self.pause().await;
        Ok("Static insight".to_string())
    }

    async fn journal_prompt(&self, _latest: &CheckIn) -> Result<String, EnrichmentError> {
        Ok("Static prompt".to_string())
    }

    async fn session_summary(
        &self,
        _conversation: &[ConversationTurn],
    ) -> Result<SessionSummary, EnrichmentError> {
        Ok(SessionSummary {
            title: "Static Title".to_string(),
            summary: "Static summary".to_string(),
        })
    }

    async fn monthly_report(
        &self,
        _check_ins: &[CheckIn],
        _themes: &[String],
    ) -> Result<String, EnrichmentError> {
        Ok("Static report".to_string())
    }
}

/// Every call fails.
pub struct FailingEnricher;

#[async_trait]
impl Enricher for FailingEnricher {
    async fn journal_reflection(&self, _text: &str) -> Result<String, EnrichmentError> {
        Err(unavailable())
    }

    async fn daily_insight(
        &self,
        _check_ins: &[CheckIn],
        _entries: &[JournalEntry],
    ) -> Result<String, EnrichmentError> {
        Err(unavailable())
    }

    async fn journal_prompt(&self, _latest: &CheckIn) -> Result<String, EnrichmentError> {
        Err(unavailable())
    }

    async fn session_summary(
        &self,
        _conversation: &[ConversationTurn],
    ) -> Result<SessionSummary, EnrichmentError> {
        Err(unavailable())
    }

    async fn monthly_report(
        &self,
        _check_ins: &[CheckIn],
        _themes: &[String],
    ) -> Result<String, EnrichmentError> {
        Err(unavailable())
    }
}

/// Replays canned model replies; fails once they run out.
pub struct ScriptedChat {
    replies: VecDeque<String>,
}

impl ScriptedChat {
    pub fn new<const N: usize>(replies: [&str; N]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ChatSession for ScriptedChat {
    async fn start(&mut self) -> Result<String, EnrichmentError> {
        self.replies.pop_front().ok_or_else(unavailable)
    }

    async fn send(&mut self, _text: &str) -> Result<String, EnrichmentError> {
        self.replies.pop_front().ok_or_else(unavailable)
    }
}
