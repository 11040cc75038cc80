//! Integration tests for the state container over durable stores.

use chrono::{Days, NaiveDate};
use innerbloom_core::{
    Catalog, CheckInInput, Config, Connectivity, CoreError, DashboardComponent, JsonFileStore,
    SqliteStore, StateContainer, StepOutcome, UserDocument,
};
use innerbloom_core::catalog::StepKind;
use tempfile::TempDir;

fn input(mood: u8) -> CheckInInput {
    CheckInInput {
        mood,
        energy: 3,
        sleep: 4,
        gratitude: ["coffee".into(), "a walk".into(), "my dog".into()],
    }
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 28).unwrap()
}

fn open_json(dir: &TempDir) -> StateContainer<JsonFileStore> {
    let store = JsonFileStore::new_with_path(dir.path()).unwrap();
    StateContainer::open(store, Catalog::builtin(), Config::default(), Connectivity::new(false)).unwrap()
}

#[test]
fn test_week_of_check_ins_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let c = open_json(&dir);
        for i in 0..7 {
            let today = start().checked_add_days(Days::new(i)).unwrap();
            let out = c.complete_check_in_on(input(4), today).unwrap();
            assert!(out.is_persisted());
            assert_eq!(out.value.reward.streak, i as u32 + 1);
        }
    }

    let c = open_json(&dir);
    let doc = c.snapshot();
    assert_eq!(doc.streak, 7);
    assert_eq!(doc.points, 7 * 10 + 50);
    assert_eq!(doc.check_ins.len(), 7);
    assert!(doc.unlocked_achievements.contains("7_day_streak"));

    // Crossing a month boundary still counts as consecutive.
    assert_eq!(doc.last_check_in, NaiveDate::from_ymd_opt(2024, 2, 3));
}

#[test]
fn test_gap_restarts_streak() {
    let dir = TempDir::new().unwrap();
    let c = open_json(&dir);
    c.complete_check_in_on(input(3), start()).unwrap();
    c.complete_check_in_on(input(3), start().checked_add_days(Days::new(1)).unwrap())
        .unwrap();
    let out = c
        .complete_check_in_on(input(3), start().checked_add_days(Days::new(3)).unwrap())
        .unwrap();
    assert_eq!(out.value.reward.streak, 1);
    assert!(!out.value.reward.continued);
}

#[test]
fn test_gratitude_journey_through_journal_steps() {
    let dir = TempDir::new().unwrap();
    let c = open_json(&dir);
    c.start_journey("gratitude_7_day").unwrap();

    let steps = c.catalog().journey("gratitude_7_day").unwrap().steps.len();
    let mut outcome = None;
    for i in 0..steps {
        let step = c.current_step().unwrap().unwrap();
        outcome = match step.kind {
            StepKind::Journal => {
                assert!(step.prompt.is_some(), "journal steps carry a prompt");
                c.add_journal_entry(&format!("day {i}"), true).unwrap().value.step
            }
            StepKind::Meditation | StepKind::Breathing => {
                assert!(step.target_id.is_some());
                Some(c.complete_journey_step().unwrap().value)
            }
        };
    }

    assert!(matches!(outcome, Some(StepOutcome::Completed { .. })));
    let doc = c.snapshot();
    assert!(doc.active_journey.is_none());
    assert_eq!(doc.completed_journeys.len(), 1);
    // 100 completion + 50 first_entry + 50 journey achievement
    assert_eq!(doc.points, 200);
    assert!(c.current_step().unwrap().is_none());
}

#[test]
fn test_sqlite_store_round_trips_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("innerbloom.db");
    let mut config = Config::default();
    config.storage.backend = innerbloom_core::storage::StorageBackend::Sqlite;

    let written: UserDocument = {
        let store = SqliteStore::open_at(&path).unwrap();
        let c = StateContainer::open(store, Catalog::builtin(), config.clone(), Connectivity::new(false))
            .unwrap();
        c.complete_check_in_on(input(5), start()).unwrap();
        c.add_journal_entry("quiet evening", false).unwrap();
        c.update_dashboard_layout(vec![DashboardComponent::Insight, DashboardComponent::Stats])
            .unwrap();
        c.snapshot()
    };

    let store = SqliteStore::open_at(&path).unwrap();
    let c = StateContainer::open(store, Catalog::builtin(), config, Connectivity::new(false)).unwrap();
    assert_eq!(c.snapshot(), written);
}

#[test]
fn test_corrupt_document_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("inner-bloom-data.json"), "{not json").unwrap();
    let store = JsonFileStore::new_with_path(dir.path()).unwrap();

    let err = StateContainer::open(store, Catalog::builtin(), Config::default(), Connectivity::new(true))
        .err()
        .unwrap();
    assert!(matches!(err, CoreError::Persist(_)));
}
