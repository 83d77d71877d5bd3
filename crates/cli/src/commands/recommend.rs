use rigsmith_core::recommendations::{RecommendationService, ScoringParams};
use rigsmith_db::repositories::{SqlCatalogRepository, SqlViewEventStore};
use serde_json::json;

use crate::commands::{load_config, open_database, runtime, CommandResult, StepError, EXIT_INPUT};

#[derive(Clone, Copy, Debug, Default)]
pub struct ParamOverrides {
    pub window_days: Option<u32>,
    pub decay_lambda: Option<f64>,
    pub limit: Option<usize>,
}

impl ParamOverrides {
    fn apply(self, defaults: ScoringParams) -> ScoringParams {
        ScoringParams {
            window_days: self.window_days.unwrap_or(defaults.window_days),
            decay_lambda: self.decay_lambda.unwrap_or(defaults.decay_lambda),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

pub fn run(slug: &str, overrides: ParamOverrides) -> CommandResult {
    let slug = slug.trim();
    if slug.is_empty() {
        return CommandResult::failure(
            "recommend",
            "input",
            "a product slug is required",
            EXIT_INPUT,
        );
    }

    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let params = overrides.apply(config.recommendations.scoring_params());
    if params.is_degenerate() {
        return CommandResult::failure(
            "recommend",
            "input",
            "window_days and limit must be positive and decay_lambda finite and non-negative",
            EXIT_INPUT,
        );
    }

    let runtime = match runtime("recommend") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let service = RecommendationService::new(
            SqlViewEventStore::new(pool.clone()),
            SqlCatalogRepository::new(pool.clone()),
            params,
        );

        let (also_viewed, upgrades) =
            tokio::join!(service.also_viewed(slug, None), service.upgrades(slug, None));
        pool.close().await;
        Ok::<_, StepError>((also_viewed, upgrades))
    });

    match result {
        Ok((also_viewed, upgrades)) => CommandResult::success_with_data(
            "recommend",
            format!(
                "{} also-viewed and {} upgrade suggestions for `{slug}`",
                also_viewed.len(),
                upgrades.flat.len()
            ),
            Some(json!({
                "product_slug": slug,
                "params": params,
                "also_viewed": also_viewed,
                "upgrades": upgrades,
            })),
        ),
        Err(error) => CommandResult::from_step_error("recommend", error),
    }
}
