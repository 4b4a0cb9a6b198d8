use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method, StatusCode,
    },
    routing::get,
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use server_api::{current_reading, requested_location};
use shared::{
    error::ApiError,
    protocol::{AqiFeed, LocationQuery, AQI_CURRENT_ROUTE, AQI_EDGE_ROUTE, HEALTH_ROUTE},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::app_state::AppState;

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(healthz))
        .route(AQI_EDGE_ROUTE, get(aqi_data))
        .route(AQI_CURRENT_ROUTE, get(aqi_data))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

async fn healthz() -> &'static str {
    "ok"
}

async fn aqi_data(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LocationQuery>,
) -> Result<Json<AqiFeed>, (StatusCode, Json<ApiError>)> {
    let location = requested_location(&state.api, &q).to_string();
    let mut rng = StdRng::from_entropy();
    let resolved = current_reading(&state.api, &location, &mut rng)
        .await
        .map_err(|e| {
            error!(%location, error = %e, "failed to build AQI reading");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiError::from(e)))
        })?;
    Ok(Json(vec![resolved.reading]))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
