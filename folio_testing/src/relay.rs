//! Stub relay for front end and client development. Submissions are
//! validated like the real relay does, then kept in memory instead of being
//! mailed.

use std::{net::IpAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing, Json, Router,
};
use folio_models::{
    relay::{RelayResponse, SubmissionRequest, RELAY_ROUTE},
    submission::Submission,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::info;

/// Submissions with this message are answered like a transport failure.
pub const FAIL_MESSAGE: &str = "fail";
pub const FAIL_ERROR: &str = "stub transport failure";

const INBOX_ROUTE: &str = "/inbox";

/// Every submission the stub accepted, in order.
#[derive(Debug, Clone, Default)]
pub struct Inbox(Arc<Mutex<Vec<SubmissionRequest>>>);

impl Inbox {
    pub async fn submissions(&self) -> Vec<SubmissionRequest> {
        self.0.lock().await.clone()
    }
}

pub async fn start_server(host: IpAddr, port: u16) -> anyhow::Result<()> {
    info!("Starting relay testing server on {host}:{port}");
    info!("Relay endpoint: http://{host}:{port}{RELAY_ROUTE}");
    info!("Received submissions: http://{host}:{port}{INBOX_ROUTE}");
    info!("Submissions with the message {FAIL_MESSAGE:?} fail like a broken mail transport");

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router(Inbox::default()))
        .await
        .context("Failed to start HTTP server")
}

pub fn router(inbox: Inbox) -> Router<()> {
    Router::new()
        .route(RELAY_ROUTE, routing::post(send_email))
        .route(INBOX_ROUTE, routing::get(list_inbox))
        .route("/health", routing::get(health))
        .with_state(inbox)
}

async fn send_email(
    State(inbox): State<Inbox>,
    request: Result<Json<SubmissionRequest>, JsonRejection>,
) -> (StatusCode, Json<RelayResponse>) {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RelayResponse::invalid_body(rejection.body_text())),
            )
        }
    };

    if let Err(err) = Submission::try_from(request.clone()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(RelayResponse::missing_fields(&err)),
        );
    }

    if request.message.as_deref().map(str::trim) == Some(FAIL_MESSAGE) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RelayResponse::failed(FAIL_ERROR)),
        );
    }

    info!(kind = ?request.kind, name = ?request.name, "received submission");
    inbox.0.lock().await.push(request);

    (StatusCode::OK, Json(RelayResponse::sent()))
}

async fn list_inbox(State(inbox): State<Inbox>) -> Json<Vec<SubmissionRequest>> {
    Json(inbox.submissions().await)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    email: bool,
    email_configured: bool,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        email: true,
        email_configured: true,
    })
}
