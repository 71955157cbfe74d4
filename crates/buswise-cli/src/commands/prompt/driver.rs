use buswise_core::PlannerError;
use buswise_planner::{build_prompt, validate_request};

use super::args::PromptArgs;
use crate::error::{CliError, CliResult};

pub fn execute(args: PromptArgs) -> CliResult<()> {
    println!("{}", render(&args)?);
    Ok(())
}

fn render(args: &PromptArgs) -> CliResult<String> {
    let validated = validate_request(&args.trip.to_request(), args.min_chars).map_err(|err| {
        CliError::Planning {
            message: err.to_string(),
        }
    })?;
    build_prompt(&validated).map_err(|err| match err {
        PlannerError::Prompt { message } => CliError::Prompt { message },
        other => CliError::Planning {
            message: other.to_string(),
        },
    })
}
