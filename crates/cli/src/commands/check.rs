use std::fs;
use std::path::Path;

use rigsmith_core::compat::{check_compatibility, recommended_psu_watts};
use rigsmith_core::domain::build::Build;
use serde_json::json;

use crate::commands::{CommandResult, EXIT_INPUT};

/// Checks a build read from a JSON file. No configuration or database is needed.
pub fn run(path: &Path) -> CommandResult {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "input",
                format!("could not read build file `{}`: {error}", path.display()),
                EXIT_INPUT,
            );
        }
    };

    let build: Build = match serde_json::from_str(&raw) {
        Ok(build) => build,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "input",
                format!("build file `{}` is not a valid build: {error}", path.display()),
                EXIT_INPUT,
            );
        }
    };

    let result = check_compatibility(&build);
    let message = if result.ok {
        format!("build is compatible ({} warnings)", result.warnings.len())
    } else {
        format!("build has {} compatibility errors", result.errors.len())
    };

    CommandResult::success_with_data(
        "check",
        message,
        Some(json!({
            "result": result,
            "recommended_psu_watts": recommended_psu_watts(result.estimated_watts),
        })),
    )
}
