use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing, Json, Router,
};
use folio_core_relay_contracts::{RelayError, RelayFeatureService};
use folio_models::{
    relay::{RelayResponse, SubmissionRequest, RELAY_ROUTE},
    submission::Submission,
};
use tracing::debug;

use super::relay_response;

pub fn router(service: Arc<impl RelayFeatureService>) -> Router<()> {
    Router::new()
        .route(RELAY_ROUTE, routing::post(send_email))
        .with_state(service)
}

async fn send_email(
    service: State<Arc<impl RelayFeatureService>>,
    request: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => {
            debug!(%rejection, "rejecting malformed submission");
            return relay_response(
                StatusCode::BAD_REQUEST,
                RelayResponse::invalid_body(rejection.body_text()),
            );
        }
    };

    let submission = match Submission::try_from(request) {
        Ok(submission) => submission,
        Err(err) => {
            debug!(missing = ?err.0, "rejecting incomplete submission");
            return relay_response(StatusCode::BAD_REQUEST, RelayResponse::missing_fields(&err));
        }
    };

    match service.relay(submission).await {
        Ok(()) => relay_response(StatusCode::OK, RelayResponse::sent()),
        Err(err @ RelayError::Refused) => relay_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            RelayResponse::failed(err.to_string()),
        ),
        Err(RelayError::Other(err)) => relay_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            RelayResponse::failed(format!("{err:#}")),
        ),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
    };
    use folio_core_health_contracts::MockHealthFeatureService;
    use folio_core_relay_contracts::MockRelayFeatureService;
    use folio_demo::{
        jane_contact_request, jane_visitor_profile_request, JANE_CONTACT, JANE_VISITOR_PROFILE,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::tests::{body_json, call, sut};

    fn request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(RELAY_ROUTE)
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn json_request(body: &impl serde::Serialize) -> Request<Body> {
        request(serde_json::to_vec(body).unwrap())
    }

    #[tokio::test]
    async fn contact_sent() {
        // Arrange
        let relay = MockRelayFeatureService::new().with_relay(JANE_CONTACT.clone(), Ok(()));
        let sut = sut(MockHealthFeatureService::new(), relay);

        // Act
        let response = call(sut, json_request(&jane_contact_request())).await;

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": true, "message": "Email sent successfully!"})
        );
    }

    #[tokio::test]
    async fn visitor_profile_sent() {
        // Arrange
        let relay =
            MockRelayFeatureService::new().with_relay(JANE_VISITOR_PROFILE.clone(), Ok(()));
        let sut = sut(MockHealthFeatureService::new(), relay);

        // Act
        let response = call(sut, json_request(&jane_visitor_profile_request())).await;

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_string_type_falls_back_to_contact() {
        // Arrange
        let relay = MockRelayFeatureService::new().with_relay(JANE_CONTACT.clone(), Ok(()));
        let sut = sut(MockHealthFeatureService::new(), relay);

        // Act
        let response = call(
            sut,
            json_request(&json!({
                "type": 1,
                "name": "Jane",
                "email": "jane@x.com",
                "subject": 42,
                "message": "hi",
            })),
        )
        .await;

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": true, "message": "Email sent successfully!"})
        );
    }

    #[tokio::test]
    async fn missing_fields() {
        // Arrange
        let sut = sut(
            MockHealthFeatureService::new(),
            MockRelayFeatureService::new(),
        );

        // Act
        let response = call(sut, json_request(&json!({"name": "Jane", "message": ""}))).await;

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Missing required fields: email, message"})
        );
    }

    #[tokio::test]
    async fn missing_name() {
        // Arrange
        let sut = sut(
            MockHealthFeatureService::new(),
            MockRelayFeatureService::new(),
        );

        // Act
        let response = call(
            sut,
            json_request(&json!({"email": "jane@x.com", "message": "hi"})),
        )
        .await;

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Missing required fields: name"})
        );
    }

    #[tokio::test]
    async fn invalid_body() {
        // Arrange
        let sut = sut(
            MockHealthFeatureService::new(),
            MockRelayFeatureService::new(),
        );

        // Act
        let response = call(sut, request("not json")).await;

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid request body");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn transport_error() {
        // Arrange
        let relay = MockRelayFeatureService::new().with_relay(
            JANE_CONTACT.clone(),
            Err(anyhow!("Connection refused (os error 111)").into()),
        );
        let sut = sut(MockHealthFeatureService::new(), relay);

        // Act
        let response = call(sut, json_request(&jane_contact_request())).await;

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "message": "Failed to send email",
                "error": "Connection refused (os error 111)",
            })
        );
    }

    #[tokio::test]
    async fn refused() {
        // Arrange
        let relay = MockRelayFeatureService::new()
            .with_relay(JANE_CONTACT.clone(), Err(RelayError::Refused));
        let sut = sut(MockHealthFeatureService::new(), relay);

        // Act
        let response = call(sut, json_request(&jane_contact_request())).await;

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "The mail server refused the message."
        );
    }
}
