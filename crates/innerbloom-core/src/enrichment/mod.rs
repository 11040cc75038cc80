//! Remote generative-language boundary.
//!
//! Every call is text in, text out, and fails only with
//! [`EnrichmentError::Unavailable`]. Callers decide what a failure means:
//! the sync queue leaves the entry pending, display paths substitute one of
//! the [`fallback`] strings. Fallback text is never written into a journal
//! reflection.

mod gemini;
pub mod prompts;
mod session;

pub use gemini::{GeminiChat, GeminiClient};
pub use session::{summarize_session, ChatSession, GuidedSession, SESSION_MINUTES};

use async_trait::async_trait;

use crate::error::EnrichmentError;
use crate::model::{CheckIn, ConversationTurn, JournalEntry};

/// Display text used when the remote service cannot be reached.
pub mod fallback {
    pub const INSIGHT: &str =
        "Keep nurturing your awareness. Your journey of self-discovery is a beautiful process.";
    pub const JOURNAL_PROMPT: &str = "What's on your mind today?";
    pub const SESSION_TITLE: &str = "Session Reflection";
    pub const SESSION_SUMMARY: &str = "Could not generate a summary for this session.";
    /// Used when a response arrives but has no `Summary:` line.
    pub const SESSION_SUMMARY_MISSING: &str = "A summary of our conversation.";
    pub const MONTHLY_REPORT: &str =
        "There was an issue generating your monthly report. Please check back later.";
    /// Shown next to an entry whose reflection is still pending.
    pub const REFLECTION_PENDING: &str =
        "I'm having trouble connecting right now, but your thoughts have been safely saved.";
}

/// Title and summary generated for a finished guided session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub title: String,
    pub summary: String,
}

impl SessionSummary {
    pub fn fallback() -> Self {
        Self {
            title: fallback::SESSION_TITLE.to_string(),
            summary: fallback::SESSION_SUMMARY.to_string(),
        }
    }
}

/// Request/response calls to the generative-language service.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Short validating reflection on a journal entry.
    async fn journal_reflection(&self, text: &str) -> Result<String, EnrichmentError>;

    /// One gentle observation over recent check-ins and journal excerpts.
    async fn daily_insight(
        &self,
        check_ins: &[CheckIn],
        entries: &[JournalEntry],
    ) -> Result<String, EnrichmentError>;

    /// Journal prompt tuned to the latest check-in.
    async fn journal_prompt(&self, latest: &CheckIn) -> Result<String, EnrichmentError>;

    /// Title and summary of a guided conversation.
    async fn session_summary(
        &self,
        conversation: &[ConversationTurn],
    ) -> Result<SessionSummary, EnrichmentError>;

    /// Monthly paragraph over check-ins and recurring journal themes.
    async fn monthly_report(
        &self,
        check_ins: &[CheckIn],
        themes: &[String],
    ) -> Result<String, EnrichmentError>;
}

/// Reject blank generations so they are retried instead of stored.
pub(crate) fn non_empty(text: String) -> Result<String, EnrichmentError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(EnrichmentError::Unavailable("empty response".into()))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_rejects_blank() {
        assert_eq!(non_empty("  hi \n".into()).unwrap(), "hi");
        assert!(non_empty("   ".into()).is_err());
    }

    #[test]
    fn fallback_summary_uses_constants() {
        let summary = SessionSummary::fallback();
        assert_eq!(summary.title, "Session Reflection");
        assert_eq!(summary.summary, fallback::SESSION_SUMMARY);
    }
}
