//! Static catalogs of journeys, achievements, meditations and breathing
//! exercises.
//!
//! Catalogs are read-only configuration. They are validated once when built,
//! after which every lookup is a typed map access that reports
//! [`CatalogError::UnknownId`] instead of silently returning nothing.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub const FIRST_ENTRY: &str = "first_entry";
pub const TEN_ENTRIES: &str = "10_entries";
pub const SEVEN_DAY_STREAK: &str = "7_day_streak";

/// What the user is asked to do in a journey step.
///
/// The core does not check that the activity happened; the caller signals
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Journal,
    Meditation,
    Breathing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyStep {
    pub id: String,
    pub title: String,
    pub kind: StepKind,
    /// Meditation or breathing exercise id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Journal prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<JourneyStep>,
    pub achievement_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meditation {
    pub id: String,
    pub title: String,
    pub category: String,
    pub duration_secs: u32,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathStep {
    pub phase: BreathPhase,
    pub duration_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingExercise {
    pub id: String,
    pub title: String,
    pub description: String,
    pub pattern: Vec<BreathStep>,
}

impl BreathingExercise {
    /// Length of one full cycle of the pattern.
    pub fn cycle_secs(&self) -> u32 {
        self.pattern.iter().map(|s| s.duration_secs).sum()
    }
}

/// Unvalidated catalog contents, as read from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub journeys: Vec<JourneyDefinition>,
    #[serde(default)]
    pub achievements: Vec<AchievementDefinition>,
    #[serde(default)]
    pub meditations: Vec<Meditation>,
    #[serde(default)]
    pub breathing_exercises: Vec<BreathingExercise>,
}

/// Validated, immutable catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    journeys: BTreeMap<String, JourneyDefinition>,
    achievements: BTreeMap<String, AchievementDefinition>,
    meditations: BTreeMap<String, Meditation>,
    breathing: BTreeMap<String, BreathingExercise>,
}

fn index_by_id<T>(
    kind: &'static str,
    items: Vec<T>,
    id: impl Fn(&T) -> &str,
) -> Result<BTreeMap<String, T>, CatalogError> {
    let mut map = BTreeMap::new();
    for item in items {
        let key = id(&item).to_string();
        if key.is_empty() {
            return Err(CatalogError::Invalid(format!("{kind} with empty id")));
        }
        if map.contains_key(&key) {
            return Err(CatalogError::DuplicateId { kind, id: key });
        }
        map.insert(key, item);
    }
    Ok(map)
}

impl Catalog {
    /// Build and validate a catalog.
    ///
    /// # Errors
    /// Returns an error on duplicate ids, journeys without steps, journeys
    /// whose achievement is missing, journal steps without a prompt, or
    /// activity steps pointing at unknown meditations/exercises.
    pub fn new(data: CatalogData) -> Result<Self, CatalogError> {
        let catalog = Self {
            journeys: index_by_id("journey", data.journeys, |j| j.id.as_str())?,
            achievements: index_by_id("achievement", data.achievements, |a| a.id.as_str())?,
            meditations: index_by_id("meditation", data.meditations, |m| m.id.as_str())?,
            breathing: index_by_id("breathing exercise", data.breathing_exercises, |b| b.id.as_str())?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData =
            serde_json::from_str(json).map_err(|e| CatalogError::Invalid(e.to_string()))?;
        Self::new(data)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Invalid(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for journey in self.journeys.values() {
            if journey.steps.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "journey '{}' has no steps",
                    journey.id
                )));
            }
            if !self.achievements.contains_key(&journey.achievement_id) {
                return Err(CatalogError::Invalid(format!(
                    "journey '{}' references unknown achievement '{}'",
                    journey.id, journey.achievement_id
                )));
            }
            for step in &journey.steps {
                self.validate_step(&journey.id, step)?;
            }
        }
        Ok(())
    }

    fn validate_step(&self, journey_id: &str, step: &JourneyStep) -> Result<(), CatalogError> {
        let target_known = |known: bool| {
            if known {
                Ok(())
            } else {
                Err(CatalogError::Invalid(format!(
                    "step '{}' of journey '{journey_id}' targets unknown id {:?}",
                    step.id, step.target_id
                )))
            }
        };
        match step.kind {
            StepKind::Journal => {
                if step.prompt.as_deref().map_or(true, str::is_empty) {
                    return Err(CatalogError::Invalid(format!(
                        "journal step '{}' of journey '{journey_id}' has no prompt",
                        step.id
                    )));
                }
                Ok(())
            }
            StepKind::Meditation => target_known(
                step.target_id
                    .as_ref()
                    .is_some_and(|id| self.meditations.contains_key(id)),
            ),
            StepKind::Breathing => target_known(
                step.target_id
                    .as_ref()
                    .is_some_and(|id| self.breathing.contains_key(id)),
            ),
        }
    }

    pub fn journey(&self, id: &str) -> Result<&JourneyDefinition, CatalogError> {
        self.journeys.get(id).ok_or_else(|| CatalogError::UnknownId {
            kind: "journey",
            id: id.to_string(),
        })
    }

    pub fn achievement(&self, id: &str) -> Result<&AchievementDefinition, CatalogError> {
        self.achievements.get(id).ok_or_else(|| CatalogError::UnknownId {
            kind: "achievement",
            id: id.to_string(),
        })
    }

    pub fn meditation(&self, id: &str) -> Result<&Meditation, CatalogError> {
        self.meditations.get(id).ok_or_else(|| CatalogError::UnknownId {
            kind: "meditation",
            id: id.to_string(),
        })
    }

    pub fn breathing_exercise(&self, id: &str) -> Result<&BreathingExercise, CatalogError> {
        self.breathing.get(id).ok_or_else(|| CatalogError::UnknownId {
            kind: "breathing exercise",
            id: id.to_string(),
        })
    }

    pub fn journeys(&self) -> impl Iterator<Item = &JourneyDefinition> {
        self.journeys.values()
    }

    pub fn achievements(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.achievements.values()
    }

    /// The catalog shipped with the app.
    pub fn builtin() -> Self {
        // The built-in data is covered by `builtin_catalog_is_valid`.
        Self::new(builtin_data()).unwrap_or_else(|e| panic!("built-in catalog is invalid: {e}"))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn journal_step(id: &str, title: &str, prompt: &str) -> JourneyStep {
    JourneyStep {
        id: id.into(),
        title: title.into(),
        kind: StepKind::Journal,
        target_id: None,
        prompt: Some(prompt.into()),
    }
}

fn activity_step(id: &str, title: &str, kind: StepKind, target: &str) -> JourneyStep {
    JourneyStep {
        id: id.into(),
        title: title.into(),
        kind,
        target_id: Some(target.into()),
        prompt: None,
    }
}

fn achievement(id: &str, title: &str, description: &str, icon: &str) -> AchievementDefinition {
    AchievementDefinition {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        icon: icon.into(),
    }
}

fn breath(phase: BreathPhase, duration_secs: u32) -> BreathStep {
    BreathStep { phase, duration_secs }
}

fn builtin_data() -> CatalogData {
    CatalogData {
        journeys: vec![JourneyDefinition {
            id: "gratitude_7_day".into(),
            title: "7-Day Gratitude Challenge".into(),
            description: "Cultivate a deeper sense of gratitude and joy by focusing on the good things in your life for one week.".into(),
            achievement_id: "gratitude_journey_comp".into(),
            steps: vec![
                journal_step("d1", "Day 1: Simple Pleasures", "Write about three simple things that brought you a moment of pleasure today."),
                journal_step("d2", "Day 2: A Person of Gratitude", "Think of someone you are grateful for. Write a short note of appreciation to them (you don't have to send it)."),
                activity_step("d3", "Day 3: Mindful Gratitude", StepKind::Meditation, "gratitude"),
                journal_step("d4", "Day 4: Overcoming a Challenge", "Reflect on a past challenge you overcame. What strengths did you discover in yourself?"),
                journal_step("d5", "Day 5: The Body's Wisdom", "Write about three things you are grateful for about your body today."),
                activity_step("d6", "Day 6: Calm Breathing", StepKind::Breathing, "box"),
                journal_step("d7", "Day 7: Looking Forward", "What are you grateful for in anticipation of the week ahead?"),
            ],
        }],
        achievements: vec![
            achievement("gratitude_journey_comp", "Grateful Heart", "Completed the 7-Day Gratitude Journey.", "💖"),
            achievement(FIRST_ENTRY, "The First Step", "Wrote your first journal entry.", "✍️"),
            achievement(TEN_ENTRIES, "Reflective Mind", "Wrote 10 journal entries.", "📚"),
            achievement(SEVEN_DAY_STREAK, "Consistent Care", "Maintained a 7-day check-in streak.", "🗓️"),
        ],
        meditations: vec![
            Meditation {
                id: "anxiety".into(),
                title: "Reducing Anxiety".into(),
                category: "Anxiety".into(),
                duration_secs: 300,
                file: "https://cdn.pixabay.com/audio/2024/05/20/audio_2476b7b719.mp3".into(),
            },
            Meditation {
                id: "sleep".into(),
                title: "Preparing for Sleep".into(),
                category: "Sleep".into(),
                duration_secs: 420,
                file: "https://cdn.pixabay.com/audio/2023/11/24/audio_332a673d36.mp3".into(),
            },
            Meditation {
                id: "gratitude".into(),
                title: "Cultivating Gratitude".into(),
                category: "Gratitude".into(),
                duration_secs: 240,
                file: "https://cdn.pixabay.com/audio/2024/01/24/audio_6527582b13.mp3".into(),
            },
        ],
        breathing_exercises: vec![
            BreathingExercise {
                id: "box".into(),
                title: "Box Breathing".into(),
                description: "A simple technique to calm your nervous system.".into(),
                pattern: vec![
                    breath(BreathPhase::Inhale, 4),
                    breath(BreathPhase::Hold, 4),
                    breath(BreathPhase::Exhale, 4),
                    breath(BreathPhase::Hold, 4),
                ],
            },
            BreathingExercise {
                id: "478".into(),
                title: "4-7-8 Breathing".into(),
                description: "Known as the \"relaxing breath,\" it helps with anxiety and sleep.".into(),
                pattern: vec![
                    breath(BreathPhase::Inhale, 4),
                    breath(BreathPhase::Hold, 7),
                    breath(BreathPhase::Exhale, 8),
                ],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::new(builtin_data()).unwrap();
        let journey = catalog.journey("gratitude_7_day").unwrap();
        assert_eq!(journey.steps.len(), 7);
        assert!(catalog.achievement(&journey.achievement_id).is_ok());
        assert_eq!(catalog.achievements().count(), 4);
        assert_eq!(catalog.breathing_exercise("478").unwrap().cycle_secs(), 19);
        assert_eq!(catalog.meditation("sleep").unwrap().duration_secs, 420);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.journey("nope").unwrap_err(),
            CatalogError::UnknownId { kind: "journey", id: "nope".into() }
        );
        assert!(matches!(
            catalog.achievement("nope"),
            Err(CatalogError::UnknownId { kind: "achievement", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut data = builtin_data();
        data.achievements.push(achievement(FIRST_ENTRY, "x", "y", "z"));
        assert_eq!(
            Catalog::new(data).unwrap_err(),
            CatalogError::DuplicateId { kind: "achievement", id: FIRST_ENTRY.into() }
        );
    }

    #[test]
    fn rejects_journey_with_missing_achievement() {
        let mut data = builtin_data();
        data.journeys[0].achievement_id = "missing".into();
        assert!(matches!(Catalog::new(data), Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn rejects_activity_step_with_unknown_target() {
        let mut data = builtin_data();
        data.journeys[0].steps[2].target_id = Some("missing".into());
        assert!(matches!(Catalog::new(data), Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn rejects_journal_step_without_prompt() {
        let mut data = builtin_data();
        data.journeys[0].steps[0].prompt = None;
        assert!(matches!(Catalog::new(data), Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn rejects_empty_journey() {
        let mut data = builtin_data();
        data.journeys[0].steps.clear();
        assert!(matches!(Catalog::new(data), Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn loads_from_json() {
        let json = serde_json::to_string(&builtin_data()).unwrap();
        let catalog = Catalog::from_json(&json).unwrap();
        assert_eq!(catalog.journeys().count(), 1);

        assert!(matches!(Catalog::from_json("{not json"), Err(CatalogError::Invalid(_))));
    }
}
