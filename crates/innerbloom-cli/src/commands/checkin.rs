use clap::Args;
use innerbloom_core::CheckInInput;

use super::{print_outcome, App, CliResult};

#[derive(Args)]
pub struct CheckinArgs {
    /// Mood, 1 (low) to 5 (great)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    mood: u8,
    /// Energy, 1 to 5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    energy: u8,
    /// Sleep quality, 1 to 5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    sleep: u8,
    /// Three things you are grateful for
    #[arg(long, num_args = 3, required = true)]
    gratitude: Vec<String>,
}

pub fn run(args: CheckinArgs, offline: bool) -> CliResult {
    let gratitude: [String; 3] = args
        .gratitude
        .try_into()
        .map_err(|_| "exactly three --gratitude values are required")?;
    let app = App::open(offline)?;
    let outcome = app.state.complete_check_in(CheckInInput {
        mood: args.mood,
        energy: args.energy,
        sleep: args.sleep,
        gratitude,
    })?;
    print_outcome(&outcome)
}
