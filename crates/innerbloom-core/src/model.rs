//! The user document and its records.
//!
//! `UserDocument` is the single persisted aggregate. It is serialized as
//! camelCase JSON so an existing `inner-bloom-data` document round-trips
//! without field renames.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Storage key of the user document.
pub const USER_DOCUMENT_KEY: &str = "inner-bloom-data";

/// A once-per-day mood/energy/sleep/gratitude record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub date: NaiveDate,
    pub mood: u8,
    pub energy: u8,
    pub sleep: u8,
    pub gratitude: [String; 3],
}

/// Check-in values as submitted, before the date is stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInInput {
    pub mood: u8,
    pub energy: u8,
    pub sleep: u8,
    pub gratitude: [String; 3],
}

impl CheckInInput {
    /// Reject ratings outside `1..=5`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("mood", self.mood),
            ("energy", self.energy),
            ("sleep", self.sleep),
        ] {
            if !(1..=5).contains(&value) {
                return Err(ValidationError::RatingOutOfRange { field, value });
            }
        }
        Ok(())
    }

    pub fn into_check_in(self, date: NaiveDate) -> CheckIn {
        CheckIn {
            date,
            mood: self.mood,
            energy: self.energy,
            sleep: self.sleep,
            gratitude: self.gratitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Creation-ordered unique id (millisecond timestamp, bumped on collision).
    pub id: String,
    pub date: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    #[serde(default)]
    pub synced: bool,
    #[serde(default)]
    pub needs_reflection: bool,
}

impl JournalEntry {
    /// A new entry; when created online it is marked for reflection.
    pub fn new(id: String, date: DateTime<Utc>, content: String, online: bool) -> Self {
        Self {
            id,
            date,
            content,
            reflection: None,
            synced: online,
            needs_reflection: online,
        }
    }

    /// Whether the sync queue should pick this entry up.
    pub fn is_pending(&self) -> bool {
        self.needs_reflection || !self.synced
    }

    /// Copy of this entry carrying a fetched reflection.
    pub fn with_reflection(&self, reflection: String) -> Self {
        Self {
            reflection: Some(reflection),
            synced: true,
            needs_reflection: false,
            ..self.clone()
        }
    }
}

/// Next creation-ordered journal id given the current (newest-first) journal.
pub fn next_entry_id(journal: &[JournalEntry], now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let newest = journal
        .iter()
        .filter_map(|e| e.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    millis.max(newest + 1).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

/// A finished guided conversational session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub title: String,
    pub summary: String,
    pub conversation: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJourney {
    pub journey_id: String,
    pub current_step: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardComponent {
    Stats,
    Tree,
    Journey,
    Insight,
}

impl DashboardComponent {
    pub fn default_layout() -> Vec<DashboardComponent> {
        vec![
            DashboardComponent::Stats,
            DashboardComponent::Tree,
            DashboardComponent::Journey,
            DashboardComponent::Insight,
        ]
    }
}

impl std::str::FromStr for DashboardComponent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stats" => Ok(DashboardComponent::Stats),
            "tree" => Ok(DashboardComponent::Tree),
            "journey" => Ok(DashboardComponent::Journey),
            "insight" => Ok(DashboardComponent::Insight),
            other => Err(format!("unknown dashboard component: {other}")),
        }
    }
}

/// Root aggregate persisted under [`USER_DOCUMENT_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default)]
    pub last_check_in: Option<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub points: u32,
    /// Newest first.
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
    /// Newest first.
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Newest first.
    #[serde(default)]
    pub check_ins: Vec<CheckIn>,
    #[serde(default)]
    pub active_journey: Option<ActiveJourney>,
    #[serde(default)]
    pub completed_journeys: IndexSet<String>,
    #[serde(default)]
    pub unlocked_achievements: IndexSet<String>,
    /// Newest first.
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub last_insight_date: Option<NaiveDate>,
    #[serde(default = "DashboardComponent::default_layout")]
    pub dashboard_layout: Vec<DashboardComponent>,
}

impl Default for UserDocument {
    fn default() -> Self {
        Self {
            last_check_in: None,
            streak: 0,
            points: 0,
            journal: Vec::new(),
            sessions: Vec::new(),
            check_ins: Vec::new(),
            active_journey: None,
            completed_journeys: IndexSet::new(),
            unlocked_achievements: IndexSet::new(),
            insights: Vec::new(),
            last_insight_date: None,
            dashboard_layout: DashboardComponent::default_layout(),
        }
    }
}

impl UserDocument {
    pub fn has_check_in_on(&self, date: NaiveDate) -> bool {
        self.last_check_in == Some(date) || self.check_ins.iter().any(|c| c.date == date)
    }

    pub fn journal_entry(&self, id: &str) -> Option<&JournalEntry> {
        self.journal.iter().find(|e| e.id == id)
    }

    /// Replace the entry with the same id. Returns false if no entry matched.
    pub fn replace_journal_entry(&mut self, entry: JournalEntry) -> bool {
        match self.journal.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    pub fn pending_entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.journal.iter().filter(|e| e.is_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn gratitude() -> [String; 3] {
        ["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[test]
    fn default_document_has_standard_layout() {
        let doc = UserDocument::default();
        assert_eq!(doc.streak, 0);
        assert_eq!(doc.points, 0);
        assert!(doc.last_check_in.is_none());
        assert_eq!(doc.dashboard_layout.len(), 4);
        assert_eq!(doc.dashboard_layout[0], DashboardComponent::Stats);
    }

    #[test]
    fn document_serializes_camel_case() {
        let mut doc = UserDocument::default();
        doc.last_check_in = NaiveDate::from_ymd_opt(2024, 3, 1);
        doc.unlocked_achievements.insert("first_entry".to_string());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["lastCheckIn"], "2024-03-01");
        assert_eq!(json["unlockedAchievements"][0], "first_entry");
        assert_eq!(json["dashboardLayout"][1], "tree");
        assert!(json.get("checkIns").is_some());
    }

    #[test]
    fn document_round_trips() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let mut doc = UserDocument::default();
        doc.streak = 3;
        doc.points = 80;
        doc.last_check_in = Some(now.date_naive());
        doc.check_ins.push(CheckIn {
            date: now.date_naive(),
            mood: 4,
            energy: 3,
            sleep: 5,
            gratitude: gratitude(),
        });
        let mut entry = JournalEntry::new("1".into(), now, "hello".into(), true);
        entry = entry.with_reflection("kind words".into());
        doc.journal.push(entry);
        doc.journal.push(JournalEntry::new("0".into(), now, "offline".into(), false));
        doc.active_journey = Some(ActiveJourney {
            journey_id: "gratitude_7_day".into(),
            current_step: 2,
        });
        doc.completed_journeys.insert("other".into());
        doc.insights.push("insight".into());
        doc.last_insight_date = Some(now.date_naive());
        doc.sessions.push(Session {
            id: "s1".into(),
            start_date: now,
            end_date: now,
            title: "t".into(),
            summary: "s".into(),
            conversation: vec![ConversationTurn::model("hi"), ConversationTurn::user("hey")],
        });

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: UserDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: UserDocument = serde_json::from_str(r#"{"streak": 2}"#).unwrap();
        assert_eq!(parsed.streak, 2);
        assert_eq!(parsed.dashboard_layout, DashboardComponent::default_layout());
        assert!(parsed.journal.is_empty());
    }

    #[test]
    fn check_in_input_rejects_out_of_range_ratings() {
        let input = CheckInInput { mood: 0, energy: 3, sleep: 5, gratitude: gratitude() };
        assert_eq!(
            input.validate(),
            Err(ValidationError::RatingOutOfRange { field: "mood", value: 0 })
        );

        let input = CheckInInput { mood: 5, energy: 6, sleep: 1, gratitude: gratitude() };
        assert!(input.validate().is_err());

        let input = CheckInInput { mood: 1, energy: 5, sleep: 3, gratitude: gratitude() };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn new_entry_flags_follow_connectivity() {
        let now = Utc::now();
        let online = JournalEntry::new("1".into(), now, "x".into(), true);
        assert!(online.synced && online.needs_reflection);
        assert!(online.is_pending());

        let offline = JournalEntry::new("2".into(), now, "x".into(), false);
        assert!(!offline.synced && !offline.needs_reflection);
        assert!(offline.is_pending());

        let done = offline.with_reflection("r".into());
        assert!(!done.is_pending());
        assert_eq!(done.reflection.as_deref(), Some("r"));
    }

    #[test]
    fn entry_ids_are_unique_and_increasing() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let first = next_entry_id(&[], now);
        let journal = vec![JournalEntry::new(first.clone(), now, "a".into(), false)];
        let second = next_entry_id(&journal, now);
        assert!(second.parse::<u64>().unwrap() > first.parse::<u64>().unwrap());
    }

    #[test]
    fn replace_journal_entry_reports_unknown_ids() {
        let now = Utc::now();
        let mut doc = UserDocument::default();
        doc.journal.push(JournalEntry::new("1".into(), now, "a".into(), false));
        let updated = doc.journal[0].with_reflection("r".into());
        assert!(doc.replace_journal_entry(updated));
        assert!(!doc.replace_journal_entry(JournalEntry::new("9".into(), now, "b".into(), false)));
        assert_eq!(doc.journal[0].reflection.as_deref(), Some("r"));
    }
}
