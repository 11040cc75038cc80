use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use innerbloom_core::enrichment::summarize_session;
use innerbloom_core::model::ConversationTurn;
use innerbloom_core::GuidedSession;
use serde_json::json;

use super::{print_json, warn_unsaved, App, CliResult};

/// Typed on its own line to end a session early.
const END_COMMAND: &str = "/end";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a 40-minute guided conversation on stdin/stdout
    Start,
    /// Summarize and store a recorded conversation (JSON list of turns)
    Summarize {
        /// Path to the transcript
        file: PathBuf,
    },
    /// List stored sessions
    List,
}

pub fn run(action: SessionAction, offline: bool) -> CliResult {
    let app = App::open(offline)?;
    match action {
        SessionAction::Start => start(&app)?,
        SessionAction::Summarize { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let conversation: Vec<ConversationTurn> = serde_json::from_str(&raw)?;
            let now = Utc::now();
            let session = app.block_on(summarize_session(conversation, now, now, app.enricher()));
            let outcome = app.state.add_session(session.clone())?;
            warn_unsaved(&outcome);
            print_json(&session)?;
        }
        SessionAction::List => {
            let sessions: Vec<_> = app
                .state
                .snapshot()
                .sessions
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "title": s.title,
                        "summary": s.summary,
                        "startDate": s.start_date,
                        "turns": s.conversation.len(),
                    })
                })
                .collect();
            print_json(&sessions)?;
        }
    }
    Ok(())
}

fn start(app: &App) -> CliResult {
    let Some(gemini) = app.gemini.as_ref().filter(|_| app.state.connectivity().is_online()) else {
        return Err("guided sessions need a network connection and an API key".into());
    };
    let mut session = app.block_on(GuidedSession::begin(gemini.chat(), Utc::now()))?;
    println!("{}", session.conversation()[0].text);
    eprintln!("(type {END_COMMAND} to finish)");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if session.is_expired(Utc::now()) {
            println!("Our time is up for today. Thank you for sharing.");
            break;
        }
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line == END_COMMAND {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match app.block_on(session.send(line)) {
            Ok(reply) => println!("{reply}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    let stored = app.block_on(session.finish(app.enricher(), Utc::now()));
    let outcome = app.state.add_session(stored.clone())?;
    warn_unsaved(&outcome);
    print_json(&json!({ "title": stored.title, "summary": stored.summary }))
}
