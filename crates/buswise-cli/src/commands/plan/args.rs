use clap::Args;

use crate::commands::TripArgs;

/// Arguments for the `plan` command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub trip: TripArgs,

    /// Print the tagged result as JSON instead of a readable itinerary.
    #[arg(long)]
    pub json: bool,

    /// Model to use instead of the configured one.
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,
}
