use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use folio_core_health_contracts::{HealthFeatureService, HealthStatus};
use serde::Serialize;

pub fn router(service: Arc<impl HealthFeatureService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health))
        .with_state(service)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    email: bool,
    email_configured: bool,
}

async fn health(service: State<Arc<impl HealthFeatureService>>) -> Response {
    let HealthStatus {
        email,
        email_configured,
    } = service.get_status().await;

    let (code, status) = if email {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "degraded")
    };

    let response = HealthResponse {
        status,
        email,
        email_configured,
    };

    (code, Json(response)).into_response()
}
