//! Daily check-in streaks and point awards.
//!
//! A streak continues only when the previous check-in was exactly yesterday;
//! any other history (no check-ins, or a gap of two days or more) restarts it
//! at 1, so a recorded check-in always leaves `streak >= 1`.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::model::{CheckIn, CheckInInput, UserDocument};
use crate::storage::RewardsConfig;

/// Result of a recorded check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInReward {
    pub check_in: CheckIn,
    pub streak: u32,
    /// Whether the previous streak was extended rather than restarted.
    pub continued: bool,
    pub points_awarded: u32,
}

/// Streak and rewards calculator
pub struct StreakCalculator {
    config: RewardsConfig,
}

impl StreakCalculator {
    /// Create a new calculator with default rewards
    pub fn new() -> Self {
        Self {
            config: RewardsConfig::default(),
        }
    }

    /// Create with custom rewards
    pub fn with_config(config: RewardsConfig) -> Self {
        Self { config }
    }

    /// Streak after a check-in on `today`.
    pub fn next_streak(last_check_in: Option<NaiveDate>, streak: u32, today: NaiveDate) -> u32 {
        match (last_check_in, today.checked_sub_days(Days::new(1))) {
            (Some(last), Some(yesterday)) if last == yesterday => streak.saturating_add(1),
            _ => 1,
        }
    }

    /// Record a check-in for `today`.
    ///
    /// The document is only modified on success.
    ///
    /// # Errors
    /// `Validation` for out-of-range ratings, `AlreadyCheckedInToday` if a
    /// check-in for `today` already exists.
    pub fn apply_check_in(
        &self,
        doc: &mut UserDocument,
        input: CheckInInput,
        today: NaiveDate,
    ) -> Result<CheckInReward> {
        input.validate()?;
        if doc.has_check_in_on(today) {
            return Err(CoreError::AlreadyCheckedInToday { date: today });
        }

        let streak = Self::next_streak(doc.last_check_in, doc.streak, today);
        let continued = streak > 1;
        let check_in = input.into_check_in(today);

        doc.streak = streak;
        doc.points = doc.points.saturating_add(self.config.check_in_points);
        doc.last_check_in = Some(today);
        doc.check_ins.insert(0, check_in.clone());

        tracing::debug!(%today, streak, continued, "check-in recorded");

        Ok(CheckInReward {
            check_in,
            streak,
            continued,
            points_awarded: self.config.check_in_points,
        })
    }
}

impl Default for StreakCalculator {
    fn default() -> Self {
        Self::new()
    }
}
