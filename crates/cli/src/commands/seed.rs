use chrono::Utc;
use rigsmith_db::DemoDataset;
use serde_json::json;

use crate::commands::{
    load_config, open_database, runtime, CommandResult, EXIT_INPUT, EXIT_MIGRATION,
};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let seeded = DemoDataset::load(&pool, Utc::now())
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION));
        let verified = match seeded {
            Ok(seeded) => DemoDataset::verify(&pool)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), EXIT_INPUT))
                .and_then(|verification| {
                    let failed: Vec<String> = verification
                        .checks
                        .into_iter()
                        .filter_map(|(check, passed)| (!passed).then_some(check))
                        .collect();
                    if verification.all_present {
                        Ok(seeded)
                    } else {
                        Err(("seed_verification", verification_message(&failed), EXIT_INPUT))
                    }
                }),
            Err(error) => Err(error),
        };

        pool.close().await;
        verified
    });

    match result {
        Ok(seeded) => CommandResult::success_with_data(
            "seed",
            format!(
                "demo dataset loaded: {} parts upserted, {} new views recorded",
                seeded.parts_seeded, seeded.views_seeded
            ),
            Some(json!({
                "parts_seeded": seeded.parts_seeded,
                "views_seeded": seeded.views_seeded,
            })),
        ),
        Err(error) => CommandResult::from_step_error("seed", error),
    }
}

fn verification_message(failed_checks: &[String]) -> String {
    if failed_checks.is_empty() {
        "some demo data failed to load".to_string()
    } else {
        format!("demo data verification failed for checks: {}", failed_checks.join(", "))
    }
}
