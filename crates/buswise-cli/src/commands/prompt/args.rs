use clap::Args;

use crate::commands::TripArgs;

/// Arguments for the `prompt` command.
#[derive(Debug, Args)]
pub struct PromptArgs {
    #[command(flatten)]
    pub trip: TripArgs,

    /// Minimum accepted length of each location.
    #[arg(long, value_name = "CHARS", default_value_t = buswise_planner::contracts::MIN_LOCATION_CHARS)]
    pub min_chars: usize,
}
