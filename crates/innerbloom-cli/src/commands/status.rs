use serde_json::json;

use super::{print_json, App, CliResult};

pub fn run(offline: bool) -> CliResult {
    let app = App::open(offline)?;
    let doc = app.state.snapshot();
    print_json(&json!({
        "streak": doc.streak,
        "points": doc.points,
        "lastCheckIn": doc.last_check_in,
        "checkIns": doc.check_ins.len(),
        "journalEntries": doc.journal.len(),
        "sessions": doc.sessions.len(),
        "activeJourney": doc.active_journey,
        "completedJourneys": doc.completed_journeys,
        "unlockedAchievements": doc.unlocked_achievements.len(),
        "latestInsight": doc.insights.first(),
        "sync": app.state.sync_status(),
        "enrichment": app.gemini.is_some(),
    }))
}

pub fn achievements(offline: bool) -> CliResult {
    let app = App::open(offline)?;
    let doc = app.state.snapshot();
    let list: Vec<_> = app
        .state
        .catalog()
        .achievements()
        .map(|a| {
            json!({
                "id": a.id,
                "title": a.title,
                "description": a.description,
                "icon": a.icon,
                "unlocked": doc.unlocked_achievements.contains(&a.id),
            })
        })
        .collect();
    print_json(&list)
}
