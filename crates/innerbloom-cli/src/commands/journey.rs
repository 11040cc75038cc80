use clap::Subcommand;
use innerbloom_core::JourneyState;
use serde_json::json;

use super::{print_json, print_outcome, warn_unsaved, App, CliResult};

#[derive(Subcommand)]
pub enum JourneyAction {
    /// List available journeys
    List,
    /// Start a journey
    Start {
        /// Journey id (e.g. "gratitude_7_day")
        id: String,
    },
    /// Mark the current step as done
    Step,
    /// Show the active journey and its current step
    Status,
}

pub fn run(action: JourneyAction, offline: bool) -> CliResult {
    let app = App::open(offline)?;
    match action {
        JourneyAction::List => {
            let doc = app.state.snapshot();
            let journeys: Vec<_> = app
                .state
                .catalog()
                .journeys()
                .map(|j| {
                    json!({
                        "id": j.id,
                        "title": j.title,
                        "description": j.description,
                        "steps": j.steps.len(),
                        "completed": doc.completed_journeys.contains(&j.id),
                    })
                })
                .collect();
            print_json(&journeys)?;
        }
        JourneyAction::Start { id } => {
            let outcome = app.state.start_journey(&id)?;
            warn_unsaved(&outcome);
            let step = app.state.current_step()?;
            print_json(&step)?;
        }
        JourneyAction::Step => {
            let outcome = app.state.complete_journey_step()?;
            print_outcome(&outcome)?;
        }
        JourneyAction::Status => {
            let status = match JourneyState::of(&app.state.snapshot()) {
                JourneyState::NoActiveJourney => json!({ "active": false }),
                JourneyState::InProgress { journey_id, step } => {
                    let journey = app.state.catalog().journey(&journey_id)?;
                    json!({
                        "active": true,
                        "journey": journey_id,
                        "title": journey.title,
                        "step": step + 1,
                        "of": journey.steps.len(),
                        "current": app.state.current_step()?,
                    })
                }
            };
            print_json(&status)?;
        }
    }
    Ok(())
}
