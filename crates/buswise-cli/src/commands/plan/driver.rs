use std::path::PathBuf;

use buswise_config::BuswiseConfig;
use buswise_core::log_info;
use buswise_planner::TripPlanner;

use super::args::PlanArgs;
use super::output::PlanView;
use crate::error::{CliError, CliResult};

fn load_config(path: Option<PathBuf>) -> CliResult<BuswiseConfig> {
    BuswiseConfig::load(path.as_deref()).map_err(|err| CliError::Config {
        message: err.to_string(),
    })
}

pub async fn execute(args: PlanArgs, config: Option<PathBuf>) -> CliResult<()> {
    let mut config = load_config(config)?;
    if let Some(model) = args.model {
        config.llm.model = Some(model);
    }

    let planner = TripPlanner::connect(&config)
        .await
        .map_err(|err| CliError::Config {
            message: format!("{err:#}"),
        })?;

    let request = args.trip.to_request();
    log_info!(
        "cli::plan",
        start = %request.start,
        destination = %request.destination,
        "Planning trip"
    );
    let result = planner.plan_trip(request).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    match result.into_result() {
        Ok(plan) => {
            if !args.json {
                print!(
                    "{}",
                    PlanView {
                        from: &args.trip.from,
                        to: &args.trip.to,
                        plan: &plan,
                    }
                );
            }
            Ok(())
        }
        Err(message) => Err(CliError::Planning { message }),
    }
}
