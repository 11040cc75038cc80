//! Prompt text sent to the generative-language service.

use crate::model::{CheckIn, ConversationTurn, JournalEntry, Role};

use super::{fallback, SessionSummary};

pub const COMPANION_INSTRUCTION: &str = "You are a compassionate, gentle companion. Your role is to listen and offer warmth and validation. Never give advice. Your tone is soft and understanding.";

pub const THERAPIST_INSTRUCTION: &str = "You are an integrative psychotherapist. Your approach is warm, empathetic, and insightful. Use open-ended questions to guide the user in exploring their thoughts and feelings. Maintain context throughout the 40-minute session. Start the conversation by gently asking, 'What's on your mind today?'.";

/// First user message of a guided session.
pub const SESSION_OPENER: &str = "Hello.";

const EXCERPT_CHARS: usize = 100;

pub fn journal_reflection(text: &str) -> String {
    format!(
        "My journal entry is: \"{text}\". Please provide a short, validating, and encouraging reflection on this. Act as a compassionate mirror, not a problem solver. Keep it under 50 words."
    )
}

pub fn daily_insight(check_ins: &[CheckIn], entries: &[JournalEntry]) -> String {
    let ratings: Vec<serde_json::Value> = check_ins
        .iter()
        .map(|c| serde_json::json!({ "m": c.mood, "e": c.energy, "s": c.sleep }))
        .collect();
    let themes: Vec<String> = entries
        .iter()
        .map(|e| e.content.chars().take(EXCERPT_CHARS).collect())
        .collect();

    format!(
        "Analyze the following recent user data (check-ins and journal excerpts) and generate one gentle, positive, and encouraging insight. Look for a simple correlation or a recurring theme. Frame it as an observation, not a directive. Max 2 sentences.\n\n\
         Data:\n\
         - Recent Check-ins (mood, energy, sleep rated 1-5): {}\n\
         - Recent Journal Themes: {}\n\n\
         Example Insight: \"It's wonderful to see that on days you mention 'nature' in your journal, your energy levels also seem a bit higher. Your connection to the outdoors appears to be nurturing you.\"",
        serde_json::Value::Array(ratings),
        themes.join("... ")
    )
}

pub fn journal_prompt(latest: &CheckIn) -> String {
    format!(
        "Based on a user's latest daily check-in (mood: {}/5, energy: {}/5), generate a single, gentle, and introspective journal prompt. The prompt should be open-ended and encouraging.\n\n\
         Example for low mood/energy: \"What is one small act of kindness you could offer yourself right now?\"\n\
         Example for high mood/energy: \"What is contributing to this positive energy, and how can you savor it today?\"",
        latest.mood, latest.energy
    )
}

pub fn session_summary(conversation: &[ConversationTurn]) -> String {
    let history: Vec<String> = conversation
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::User => "user",
                Role::Model => "model",
            };
            format!("{role}: {}", turn.text)
        })
        .collect();
    format!(
        "Based on the following therapy session conversation, please generate a concise, thematic title (3-5 words) and a brief summary (2-3 sentences) of the key themes and feelings explored.\n\nConversation:\n{}\n\nRespond in the format: Title: [Your Title]\nSummary: [Your Summary]",
        history.join("\n")
    )
}

pub fn monthly_report(check_ins: &[CheckIn], themes: &[String]) -> String {
    format!(
        "Based on the following wellness data for the month, generate a gentle, encouraging summary.\n\n\
         Check-in data summary: There were {} check-ins.\n\
         Key journal themes: {}.\n\n\
         Please create a short paragraph (3-4 sentences) highlighting positive trends and acknowledging recurring themes without being clinical or prescriptive.",
        check_ins.len(),
        themes.join(", ")
    )
}

/// Parse `Title: ...` / `Summary: ...` lines, defaulting missing parts.
pub fn parse_session_summary(text: &str) -> SessionSummary {
    let field = |label: &str| {
        text.lines()
            .filter_map(|line| line.trim().strip_prefix(label))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    };
    SessionSummary {
        title: field("Title:").unwrap_or_else(|| fallback::SESSION_TITLE.to_string()),
        summary: field("Summary:").unwrap_or_else(|| fallback::SESSION_SUMMARY_MISSING.to_string()),
    }
}
