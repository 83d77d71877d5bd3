//! JSON API: build checks, power estimates, view ingestion and recommendations.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rigsmith_core::{
    compat::{
        recommended_psu_watts, CompatibilityEngine, CompatibilityResult,
        DeterministicCompatibilityEngine,
    },
    domain::{build::Build, view_event::ViewEvent},
    errors::{ApplicationError, DomainError, InterfaceError},
    events::ViewEventStore,
    recommendations::{RecommendationService, ScoredCandidate, ScoringParams, UpgradeList},
};
use rigsmith_db::{
    repositories::{SqlCatalogRepository, SqlViewEventStore},
    DbPool,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Upper bound on caller-supplied result limits.
pub const MAX_LIMIT: usize = 100;

type Recommendations = RecommendationService<SqlViewEventStore, SqlCatalogRepository>;

#[derive(Clone)]
pub struct ApiState {
    engine: DeterministicCompatibilityEngine,
    events: SqlViewEventStore,
    recommendations: Arc<Recommendations>,
}

impl ApiState {
    pub fn new(db_pool: DbPool, defaults: ScoringParams) -> Self {
        let events = SqlViewEventStore::new(db_pool.clone());
        let recommendations = RecommendationService::new(
            events.clone(),
            SqlCatalogRepository::new(db_pool),
            defaults,
        );
        Self {
            engine: DeterministicCompatibilityEngine,
            events,
            recommendations: Arc::new(recommendations),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/builds/check", post(check_build))
        .route("/api/v1/builds/power", post(estimate_power))
        .route("/api/v1/views", post(record_view))
        .route("/api/v1/products/{slug}/also-viewed", get(also_viewed))
        .route("/api/v1/products/{slug}/upgrades", get(upgrades))
        .route("/api/v1/recommendations/cart", post(cart_recommendations))
        .with_state(state)
}

/// Error body returned to API callers. Internal details stay in the logs.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    correlation_id: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body =
            ErrorBody { error: self.0.user_message(), correlation_id: self.0.correlation_id() };
        (status, Json(body)).into_response()
    }
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Unwraps a JSON body, logging and discarding it when it cannot be read.
fn readable_body<T>(body: Result<Json<T>, JsonRejection>, route: &'static str) -> Option<T> {
    match body {
        Ok(Json(value)) => Some(value),
        Err(rejection) => {
            warn!(
                event_name = "api.request.unreadable_body",
                route,
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "request body could not be read; answering with a neutral result"
            );
            None
        }
    }
}

pub async fn check_build(
    State(state): State<ApiState>,
    body: Result<Json<Build>, JsonRejection>,
) -> Json<CompatibilityResult> {
    match readable_body(body, "/api/v1/builds/check") {
        Some(build) => Json(state.engine.check(&build)),
        None => Json(CompatibilityResult::default()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerEstimate {
    pub required_watts: u32,
    pub recommended_psu_watts: u32,
}

/// An unreadable body is estimated as an empty build.
pub async fn estimate_power(
    State(state): State<ApiState>,
    body: Result<Json<Build>, JsonRejection>,
) -> Json<PowerEstimate> {
    let build = readable_body(body, "/api/v1/builds/power").unwrap_or_default();
    let required_watts = state.engine.required_watts(&build);
    Json(PowerEstimate {
        required_watts,
        recommended_psu_watts: recommended_psu_watts(required_watts),
    })
}

#[derive(Clone, Debug, Deserialize)]
pub struct RecordViewRequest {
    pub slug: String,
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordViewResponse {
    pub id: String,
}

pub async fn record_view(
    State(state): State<ApiState>,
    body: Result<Json<RecordViewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordViewResponse>), ApiError> {
    let correlation_id = correlation_id();

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(
                event_name = "api.views.unreadable_body",
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "product view body could not be read"
            );
            return Err(ApiError(InterfaceError::BadRequest {
                message: rejection.body_text(),
                correlation_id,
            }));
        }
    };

    let slug = request.slug.trim();
    let session_id = request.session_id.trim();
    if slug.is_empty() || session_id.is_empty() {
        let error = ApplicationError::from(DomainError::IncompleteView);
        return Err(ApiError(error.into_interface(correlation_id)));
    }

    let event = ViewEvent::new(slug, session_id, request.user_id, Utc::now());
    let id = event.id.0.clone();

    if let Err(error) = state.events.append(event).await {
        warn!(
            event_name = "api.views.append_failed",
            correlation_id = %correlation_id,
            product_slug = %slug,
            error = %error,
            "failed to record product view"
        );
        let error = ApplicationError::Persistence(error.to_string());
        return Err(ApiError(error.into_interface(correlation_id)));
    }

    info!(
        event_name = "api.views.recorded",
        correlation_id = %correlation_id,
        product_slug = %slug,
        "product view recorded"
    );
    Ok((StatusCode::CREATED, Json(RecordViewResponse { id })))
}

/// Optional per-request overrides of the configured scoring parameters.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScoringQuery {
    pub window_days: Option<u32>,
    pub decay_lambda: Option<f64>,
    pub limit: Option<usize>,
}

impl ScoringQuery {
    pub fn resolve(&self, defaults: ScoringParams) -> ScoringParams {
        ScoringParams {
            window_days: self.window_days.unwrap_or(defaults.window_days),
            decay_lambda: self.decay_lambda.unwrap_or(defaults.decay_lambda),
            limit: self.limit.unwrap_or(defaults.limit).min(MAX_LIMIT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub items: Vec<ScoredCandidate>,
}

pub async fn also_viewed(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Query(query): Query<ScoringQuery>,
) -> Json<RecommendationsResponse> {
    let params = query.resolve(state.recommendations.defaults());
    let items = state.recommendations.also_viewed(&slug, Some(params)).await;
    Json(RecommendationsResponse { items })
}

#[derive(Clone, Debug, Deserialize)]
pub struct CartRequest {
    #[serde(default)]
    pub slugs: Vec<String>,
    #[serde(flatten)]
    pub scoring: ScoringQuery,
}

pub async fn cart_recommendations(
    State(state): State<ApiState>,
    body: Result<Json<CartRequest>, JsonRejection>,
) -> Json<RecommendationsResponse> {
    let Some(request) = readable_body(body, "/api/v1/recommendations/cart") else {
        return Json(RecommendationsResponse { items: Vec::new() });
    };
    let params = request.scoring.resolve(state.recommendations.defaults());
    let items = state.recommendations.for_cart(&request.slugs, Some(params)).await;
    Json(RecommendationsResponse { items })
}

pub async fn upgrades(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Query(query): Query<ScoringQuery>,
) -> Json<UpgradeList> {
    let params = query.resolve(state.recommendations.defaults());
    Json(state.recommendations.upgrades(&slug, Some(params)).await)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::{Path, Query, State},
        http::{header, Request, StatusCode},
        response::IntoResponse,
        Json, Router,
    };
    use chrono::Utc;
    use rigsmith_core::recommendations::ScoringParams;
    use rigsmith_db::{connect_with_settings, migrations, DemoDataset, DbPool};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{
        also_viewed, cart_recommendations, check_build, estimate_power, record_view, router,
        upgrades, ApiState, CartRequest, RecordViewRequest, ScoringQuery,
    };

    async fn seeded_pool() -> DbPool {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");
        DemoDataset::load(&pool, Utc::now()).await.expect("demo data should load");
        pool
    }

    fn state(pool: &DbPool) -> ApiState {
        ApiState::new(pool.clone(), ScoringParams::default())
    }

    async fn post_json(router: &Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn unreadable_check_bodies_get_a_neutral_result() {
        let pool = seeded_pool().await;
        let router = router(state(&pool));

        for body in ["", "not json", "[1, 2]"] {
            let (status, payload) = post_json(&router, "/api/v1/builds/check", body).await;
            assert_eq!(status, StatusCode::OK, "body {body:?}");
            assert_eq!(payload["ok"], true);
            assert_eq!(payload["errors"], json!([]));
            assert_eq!(payload["warnings"], json!([]));
            assert_eq!(payload["tips"], json!([]));
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn bare_spec_build_is_checked_over_http() {
        let pool = seeded_pool().await;
        let router = router(state(&pool));

        let (status, payload) = post_json(
            &router,
            "/api/v1/builds/check",
            r#"{"cpu":{"socket":"AM5","tdp_w":120},"mb":{"socket":"AM4"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["ok"], false);
        let errors = payload["errors"].as_array().expect("errors array");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().is_some_and(|e| e.contains("AM5") && e.contains("AM4")));
        pool.close().await;
    }

    #[tokio::test]
    async fn unreadable_cart_and_power_bodies_degrade() {
        let pool = seeded_pool().await;
        let router = router(state(&pool));

        for body in ["", "{\"slugs\": 7}"] {
            let (status, payload) =
                post_json(&router, "/api/v1/recommendations/cart", body).await;
            assert_eq!(status, StatusCode::OK, "body {body:?}");
            assert_eq!(payload["items"], json!([]));
        }

        let (status, payload) = post_json(&router, "/api/v1/builds/power", "not json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["required_watts"], 109);

        let (status, payload) = post_json(&router, "/api/v1/views", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
        pool.close().await;
    }

    #[tokio::test]
    async fn check_reports_socket_mismatch() {
        let pool = seeded_pool().await;
        let build = serde_json::from_value(json!({
            "cpu": {
                "id": "c1", "slug": "cpu-am5", "name": "CPU", "category": "cpu",
                "price": "299.00", "stock": 1, "active": true,
                "specs": { "socket": "AM5", "tdp_w": 105 }
            },
            "mb": {
                "id": "m1", "slug": "mb-lga", "name": "Board", "category": "motherboard",
                "price": "199.00", "stock": 1, "active": true,
                "specs": { "socket": "LGA1700" }
            }
        }))
        .expect("build should deserialize");

        let Json(result) = check_build(State(state(&pool)), Ok(Json(build))).await;

        assert!(!result.ok);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("AM5"));
        pool.close().await;
    }

    #[tokio::test]
    async fn power_estimate_for_empty_build_uses_defaults() {
        let pool = seeded_pool().await;

        let Json(estimate) =
            estimate_power(State(state(&pool)), Ok(Json(Default::default()))).await;

        assert_eq!(estimate.required_watts, 109);
        assert_eq!(estimate.recommended_psu_watts, 164);
        pool.close().await;
    }

    #[tokio::test]
    async fn recorded_views_feed_also_viewed() {
        let pool = seeded_pool().await;
        let state = state(&pool);

        for slug in ["monitor-27-qhd", "tower-air-120"] {
            let (status, _) = record_view(
                State(state.clone()),
                Ok(Json(RecordViewRequest {
                    slug: slug.to_string(),
                    session_id: "sess-api-1".to_string(),
                    user_id: None,
                })),
            )
            .await
            .expect("view should be recorded");
            assert_eq!(status, StatusCode::CREATED);
        }

        let Json(response) = also_viewed(
            State(state),
            Path("monitor-27-qhd".to_string()),
            Query(ScoringQuery::default()),
        )
        .await;

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].product_slug, "tower-air-120");
        pool.close().await;
    }

    #[tokio::test]
    async fn blank_view_fields_are_rejected() {
        let pool = seeded_pool().await;

        let error = record_view(
            State(state(&pool)),
            Ok(Json(RecordViewRequest {
                slug: "  ".to_string(),
                session_id: "sess-1".to_string(),
                user_id: None,
            })),
        )
        .await
        .expect_err("blank slug should be rejected");

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
        pool.close().await;
    }

    #[tokio::test]
    async fn cart_and_upgrades_return_demo_rankings() {
        let pool = seeded_pool().await;
        let state = state(&pool);

        let request: CartRequest =
            serde_json::from_value(json!({ "slugs": ["ryzen-7-9700x"], "limit": 2 }))
                .expect("cart request should deserialize");
        let Json(cart) = cart_recommendations(State(state.clone()), Ok(Json(request))).await;
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].product_slug, "b650-aorus");

        let Json(list) = upgrades(
            State(state),
            Path("titan-advanced".to_string()),
            Query(ScoringQuery::default()),
        )
        .await;
        assert_eq!(list.flat.first().map(|c| c.product_slug.as_str()), Some("rtx-5070"));
        assert!(list.by_bucket.contains_key("GPU"));
        pool.close().await;
    }

    #[tokio::test]
    async fn unknown_slug_and_degenerate_params_return_empty_lists() {
        let pool = seeded_pool().await;
        let state = state(&pool);

        let Json(unknown) = also_viewed(
            State(state.clone()),
            Path("no-such-part".to_string()),
            Query(ScoringQuery::default()),
        )
        .await;
        assert!(unknown.items.is_empty());

        let Json(zero_window) = also_viewed(
            State(state),
            Path("titan-advanced".to_string()),
            Query(ScoringQuery { window_days: Some(0), ..ScoringQuery::default() }),
        )
        .await;
        assert!(zero_window.items.is_empty());
        pool.close().await;
    }
}
