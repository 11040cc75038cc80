//! Journey progression state machine.
//!
//! ```text
//! NoActiveJourney --start(id)--> InProgress(id, 0)
//! InProgress(id, i) --complete_step--> InProgress(id, i + 1)   if i + 1 < steps
//! InProgress(id, last) --complete_step--> NoActiveJourney        (Completed(id))
//! ```
//!
//! Only one journey can be active. Completing a step with no active journey
//! is a no-op so callers may signal it after any content-producing action.

use serde::Serialize;

use crate::achievements::{AchievementEvaluator, AchievementEvent, Unlocks};
use crate::catalog::{Catalog, JourneyStep};
use crate::error::{CoreError, Result};
use crate::model::{ActiveJourney, UserDocument};
use crate::storage::RewardsConfig;

/// Read-only view of journey progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyState {
    NoActiveJourney,
    InProgress { journey_id: String, step: usize },
}

impl JourneyState {
    pub fn of(doc: &UserDocument) -> Self {
        match &doc.active_journey {
            Some(active) => JourneyState::InProgress {
                journey_id: active.journey_id.clone(),
                step: active.current_step,
            },
            None => JourneyState::NoActiveJourney,
        }
    }
}

/// Result of `complete_current_step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// No journey was active.
    Idle,
    Advanced { journey_id: String, step: usize },
    Completed {
        journey_id: String,
        bonus_points: u32,
        unlocks: Unlocks,
    },
}

pub struct JourneyMachine<'a> {
    catalog: &'a Catalog,
    evaluator: AchievementEvaluator,
    completion_bonus: u32,
}

impl<'a> JourneyMachine<'a> {
    pub fn new(catalog: &'a Catalog, rewards: &RewardsConfig) -> Self {
        Self {
            catalog,
            evaluator: AchievementEvaluator::with_config(rewards),
            completion_bonus: rewards.journey_completion_bonus,
        }
    }

    /// Begin `journey_id` at step 0.
    ///
    /// # Errors
    /// `Catalog(UnknownId)` for unknown journeys, `JourneyAlreadyActive`
    /// when another journey is in progress. The document is unchanged on error.
    pub fn start(&self, doc: &mut UserDocument, journey_id: &str) -> Result<()> {
        self.catalog.journey(journey_id)?;
        if let Some(active) = &doc.active_journey {
            return Err(CoreError::JourneyAlreadyActive {
                journey_id: active.journey_id.clone(),
            });
        }
        doc.active_journey = Some(ActiveJourney {
            journey_id: journey_id.to_string(),
            current_step: 0,
        });
        tracing::debug!(journey = %journey_id, "journey started");
        Ok(())
    }

    /// Mark the current step done, completing the journey after its last step.
    ///
    /// # Errors
    /// `Catalog(UnknownId)` if the active journey is no longer in the catalog.
    pub fn complete_current_step(&self, doc: &mut UserDocument) -> Result<StepOutcome> {
        let Some(active) = doc.active_journey.clone() else {
            return Ok(StepOutcome::Idle);
        };
        let journey = self.catalog.journey(&active.journey_id)?;

        let next_step = active.current_step + 1;
        if next_step < journey.steps.len() {
            doc.active_journey = Some(ActiveJourney {
                current_step: next_step,
                ..active
            });
            tracing::debug!(journey = %journey.id, step = next_step, "journey advanced");
            return Ok(StepOutcome::Advanced {
                journey_id: journey.id.clone(),
                step: next_step,
            });
        }

        doc.active_journey = None;
        doc.completed_journeys.insert(journey.id.clone());
        doc.points = doc.points.saturating_add(self.completion_bonus);
        let unlocks = self.evaluator.apply(
            doc,
            &AchievementEvent::JourneyCompleted {
                achievement_id: journey.achievement_id.clone(),
            },
        );
        tracing::info!(journey = %journey.id, "journey completed");

        Ok(StepOutcome::Completed {
            journey_id: journey.id.clone(),
            bonus_points: self.completion_bonus,
            unlocks,
        })
    }

    /// Clear an active journey whose definition is no longer in the catalog.
    ///
    /// Returns the dropped journey id.
    pub fn retire_unknown(&self, doc: &mut UserDocument) -> Option<String> {
        let active = doc.active_journey.as_ref()?;
        if self.catalog.journey(&active.journey_id).is_ok() {
            return None;
        }
        doc.active_journey.take().map(|a| a.journey_id)
    }

    /// Definition of the step the user is currently on.
    pub fn current_step(&self, doc: &UserDocument) -> Result<Option<&'a JourneyStep>> {
        let Some(active) = &doc.active_journey else {
            return Ok(None);
        };
        let journey = self.catalog.journey(&active.journey_id)?;
        Ok(journey.steps.get(active.current_step))
    }
}
