use clap::Subcommand;
use innerbloom_core::{JournalEntry, ReflectionStatus};
use serde::Serialize;

use super::{print_json, print_outcome, warn_unsaved, App, CliResult};

#[derive(Subcommand)]
pub enum JournalAction {
    /// Write a new entry
    Add {
        /// Entry text
        content: String,
        /// Count this entry as the active journey step
        #[arg(long)]
        journey_step: bool,
    },
    /// List entries, newest first
    List {
        /// Only entries still waiting for a reflection
        #[arg(long)]
        pending: bool,
    },
    /// Rewrite an entry; its reflection is fetched again
    Update {
        /// Entry id
        id: String,
        /// New text
        content: String,
    },
    /// Fetch reflections for every queued entry
    Sync,
    /// Suggest a prompt based on the latest check-in
    Prompt,
}

#[derive(Serialize)]
struct Written {
    #[serde(flatten)]
    added: innerbloom_core::JournalAdded,
    reflection: ReflectionStatus,
}

pub fn run(action: JournalAction, offline: bool) -> CliResult {
    let app = App::open(offline)?;
    match action {
        JournalAction::Add {
            content,
            journey_step,
        } => {
            let outcome = app.state.add_journal_entry(&content, journey_step)?;
            let reflected = app.block_on(
                app.state
                    .reflect_entry(&outcome.value.entry.id, app.enricher()),
            )?;
            if outcome.persist_warning.is_some() || reflected.persist_warning.is_some() {
                eprintln!("warning: changes were not saved");
            }
            print_json(&Written {
                added: outcome.value,
                reflection: reflected.value,
            })?;
        }
        JournalAction::List { pending } => {
            let doc = app.state.snapshot();
            let entries: Vec<&JournalEntry> = doc
                .journal
                .iter()
                .filter(|e| !pending || e.is_pending())
                .collect();
            print_json(&entries)?;
        }
        JournalAction::Update { id, content } => {
            let doc = app.state.snapshot();
            let existing = doc
                .journal_entry(&id)
                .ok_or_else(|| format!("unknown journal entry: {id}"))?;
            let updated = JournalEntry {
                content,
                reflection: None,
                synced: false,
                needs_reflection: false,
                ..existing.clone()
            };
            let outcome = app.state.update_journal_entry(updated)?;
            warn_unsaved(&outcome);
            println!("ok");
        }
        JournalAction::Sync => {
            let outcome = app.block_on(app.state.process_sync_queue(app.enricher()));
            print_outcome(&outcome)?;
        }
        JournalAction::Prompt => {
            let prompt = app.block_on(app.state.journal_prompt(app.enricher()));
            println!("{prompt}");
        }
    }
    Ok(())
}
