//! Guided conversational sessions.
//!
//! A session's context lives only as long as the [`ChatSession`]. The
//! wall-clock bound ([`SESSION_MINUTES`]) is enforced by the caller;
//! [`GuidedSession`] only reports remaining time and records the turns.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{Enricher, SessionSummary};
use crate::error::EnrichmentError;
use crate::model::{ConversationTurn, Session};

/// Length of a guided session, in minutes.
pub const SESSION_MINUTES: i64 = 40;

fn session_length() -> Duration {
    Duration::minutes(SESSION_MINUTES)
}

/// A stateful multi-turn exchange with the model.
#[async_trait]
pub trait ChatSession: Send {
    /// Open the conversation and return the model's first message.
    async fn start(&mut self) -> Result<String, EnrichmentError>;

    /// Send one user message and return the model's reply.
    async fn send(&mut self, text: &str) -> Result<String, EnrichmentError>;
}

/// Records a session's turns around a [`ChatSession`].
pub struct GuidedSession<C> {
    chat: C,
    started_at: DateTime<Utc>,
    conversation: Vec<ConversationTurn>,
}

impl<C: ChatSession> GuidedSession<C> {
    /// Start the session; the opener exchange is recorded as the model's
    /// first turn only.
    pub async fn begin(mut chat: C, now: DateTime<Utc>) -> Result<Self, EnrichmentError> {
        let greeting = chat.start().await?;
        Ok(Self {
            chat,
            started_at: now,
            conversation: vec![ConversationTurn::model(greeting)],
        })
    }

    /// Send a user message. Failed turns are not recorded.
    pub async fn send(&mut self, text: &str) -> Result<String, EnrichmentError> {
        let reply = self.chat.send(text).await?;
        self.conversation.push(ConversationTurn::user(text));
        self.conversation.push(ConversationTurn::model(reply.clone()));
        Ok(reply)
    }

    pub fn conversation(&self) -> &[ConversationTurn] {
        &self.conversation
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time left before the caller should end the session.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.started_at + session_length() - now).max(Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_zero()
    }

    /// Close the session and summarise it.
    ///
    /// Summary failures fall back to placeholder text; the conversation is
    /// kept either way.
    pub async fn finish(self, enricher: &dyn Enricher, now: DateTime<Utc>) -> Session {
        let end = now.min(self.started_at + session_length());
        summarize_session(self.conversation, self.started_at, end, enricher).await
    }
}

/// Build a [`Session`] from a finished conversation, summarising it with
/// `enricher` or the fallback text.
pub async fn summarize_session(
    conversation: Vec<ConversationTurn>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    enricher: &dyn Enricher,
) -> Session {
    let summary = match enricher.session_summary(&conversation).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(error = %e, "session summary unavailable, using fallback");
            SessionSummary::fallback()
        }
    };
    Session {
        id: uuid::Uuid::new_v4().to_string(),
        start_date: start,
        end_date: end,
        title: summary.title,
        summary: summary.summary,
        conversation,
    }
}
