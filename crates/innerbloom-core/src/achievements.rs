//! Achievement unlocking.
//!
//! The evaluator only manipulates ids; titles and icons live in the catalog.
//! Unlocks use union semantics: an id already present produces no change and
//! no bonus, so the unlocked set only ever grows.

use indexmap::IndexSet;
use serde::Serialize;

use crate::catalog::{FIRST_ENTRY, SEVEN_DAY_STREAK, TEN_ENTRIES};
use crate::model::UserDocument;
use crate::storage::RewardsConfig;

/// Streak length that unlocks [`SEVEN_DAY_STREAK`].
pub const STREAK_MILESTONE: u32 = 7;

/// State transitions that can unlock achievements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AchievementEvent {
    /// A journal entry was written; `previous_count` entries existed before.
    JournalEntryAdded { previous_count: usize },
    /// The check-in streak is now `streak`.
    StreakReached { streak: u32 },
    /// A journey's final step completed.
    JourneyCompleted { achievement_id: String },
}

/// Newly unlocked ids and their bonus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Unlocks {
    pub unlocked: Vec<String>,
    pub bonus_points: u32,
}

impl Unlocks {
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    pub fn merge(&mut self, other: Unlocks) {
        self.unlocked.extend(other.unlocked);
        self.bonus_points = self.bonus_points.saturating_add(other.bonus_points);
    }
}

pub struct AchievementEvaluator {
    bonus: u32,
}

impl AchievementEvaluator {
    pub fn new() -> Self {
        Self::with_config(&RewardsConfig::default())
    }

    pub fn with_config(config: &RewardsConfig) -> Self {
        Self {
            bonus: config.achievement_bonus,
        }
    }

    /// Ids this event would unlock, ignoring what is already unlocked.
    fn candidates(event: &AchievementEvent) -> Vec<&str> {
        match event {
            AchievementEvent::JournalEntryAdded { previous_count: 0 } => vec![FIRST_ENTRY],
            AchievementEvent::JournalEntryAdded { previous_count: 9 } => vec![TEN_ENTRIES],
            AchievementEvent::JournalEntryAdded { .. } => Vec::new(),
            AchievementEvent::StreakReached { streak } if *streak >= STREAK_MILESTONE => {
                vec![SEVEN_DAY_STREAK]
            }
            AchievementEvent::StreakReached { .. } => Vec::new(),
            AchievementEvent::JourneyCompleted { achievement_id } => vec![achievement_id.as_str()],
        }
    }

    /// Pure evaluation: returns the enlarged set and what changed.
    pub fn evaluate(
        &self,
        event: &AchievementEvent,
        unlocked: &IndexSet<String>,
    ) -> (IndexSet<String>, Unlocks) {
        let mut next = unlocked.clone();
        let mut unlocks = Unlocks::default();
        for id in Self::candidates(event) {
            if next.insert(id.to_string()) {
                unlocks.unlocked.push(id.to_string());
                unlocks.bonus_points = unlocks.bonus_points.saturating_add(self.bonus);
            }
        }
        (next, unlocks)
    }

    /// Evaluate against the document, applying new unlocks and their points.
    pub fn apply(&self, doc: &mut UserDocument, event: &AchievementEvent) -> Unlocks {
        let (next, unlocks) = self.evaluate(event, &doc.unlocked_achievements);
        if !unlocks.is_empty() {
            doc.unlocked_achievements = next;
            doc.points = doc.points.saturating_add(unlocks.bonus_points);
            for id in &unlocks.unlocked {
                tracing::info!(achievement = %id, "achievement unlocked");
            }
        }
        unlocks
    }
}

impl Default for AchievementEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
