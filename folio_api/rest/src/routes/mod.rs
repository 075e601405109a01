use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_models::relay::RelayResponse;

pub mod health;
pub mod relay;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    relay_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        RelayResponse {
            success: false,
            message: "Internal server error".into(),
            error: None,
        },
    )
}

fn relay_response(code: StatusCode, response: RelayResponse) -> Response {
    (code, Json(response)).into_response()
}
