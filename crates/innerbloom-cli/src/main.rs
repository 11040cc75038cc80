use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "innerbloom", version, about = "Inner Bloom wellness CLI")]
struct Cli {
    /// Treat the network as unavailable; journal entries are queued
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record today's check-in
    Checkin(commands::checkin::CheckinArgs),
    /// Journal entries and reflections
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Guided journeys
    Journey {
        #[command(subcommand)]
        action: commands::journey::JourneyAction,
    },
    /// List achievements and which are unlocked
    Achievements,
    /// Generate today's insight if due
    Insight,
    /// Monthly report over the last 30 days
    Report,
    /// Streak, points and sync status
    Status,
    /// Dashboard layout
    Layout {
        #[command(subcommand)]
        action: commands::layout::LayoutAction,
    },
    /// Guided conversational sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("INNERBLOOM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let offline = cli.offline;
    let result = match cli.command {
        Commands::Checkin(args) => commands::checkin::run(args, offline),
        Commands::Journal { action } => commands::journal::run(action, offline),
        Commands::Journey { action } => commands::journey::run(action, offline),
        Commands::Achievements => commands::status::achievements(offline),
        Commands::Insight => commands::insight::run(offline),
        Commands::Report => commands::insight::report(offline),
        Commands::Status => commands::status::run(offline),
        Commands::Layout { action } => commands::layout::run(action, offline),
        Commands::Session { action } => commands::session::run(action, offline),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
