use clap::Subcommand;
use innerbloom_core::DashboardComponent;

use super::{print_json, warn_unsaved, App, CliResult};

#[derive(Subcommand)]
pub enum LayoutAction {
    /// Show the dashboard component order
    Show,
    /// Set the dashboard component order
    Set {
        /// Components in display order (stats, tree, journey, insight)
        #[arg(required = true)]
        components: Vec<String>,
    },
}

pub fn run(action: LayoutAction, offline: bool) -> CliResult {
    let app = App::open(offline)?;
    match action {
        LayoutAction::Show => {
            print_json(&app.state.snapshot().dashboard_layout)?;
        }
        LayoutAction::Set { components } => {
            let layout = components
                .iter()
                .map(|c| c.parse::<DashboardComponent>())
                .collect::<Result<Vec<_>, _>>()?;
            let outcome = app.state.update_dashboard_layout(layout)?;
            warn_unsaved(&outcome);
            print_json(&app.state.snapshot().dashboard_layout)?;
        }
    }
    Ok(())
}
