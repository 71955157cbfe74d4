use buswise_planner::TripRequest;
use clap::Args;

/// Trip description shared by `plan` and `prompt`.
#[derive(Debug, Clone, Args)]
pub struct TripArgs {
    /// Starting location.
    #[arg(long, value_name = "PLACE")]
    pub from: String,

    /// Destination.
    #[arg(long, value_name = "PLACE")]
    pub to: String,

    /// Free-text preferences, e.g. "avoid transfers".
    #[arg(long, value_name = "TEXT")]
    pub notes: Option<String>,
}

impl TripArgs {
    pub fn to_request(&self) -> TripRequest {
        TripRequest {
            start: self.from.clone(),
            destination: self.to.clone(),
            notes: self.notes.clone(),
        }
    }
}
