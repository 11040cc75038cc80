use chrono::Local;
use serde_json::json;

use super::{print_json, warn_unsaved, App, CliResult};

/// Generate today's insight when due and show the stored ones.
pub fn run(offline: bool) -> CliResult {
    let app = App::open(offline)?;
    let outcome = app.block_on(app.state.refresh_daily_insight(app.enricher()));
    warn_unsaved(&outcome);
    print_json(&json!({
        "outcome": outcome.value,
        "insights": app.state.snapshot().insights,
    }))
}

pub fn report(offline: bool) -> CliResult {
    let app = App::open(offline)?;
    let today = Local::now().date_naive();
    let report = app.block_on(app.state.monthly_report(app.enricher(), today));
    println!("{report}");
    Ok(())
}
