use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    Router,
};
use folio_core_health_contracts::HealthFeatureService;
use folio_core_relay_contracts::RelayFeatureService;
use folio_di::Build;
use folio_utils::Apply;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
};
use tracing::info;

mod middlewares;
mod routes;

#[derive(Debug, Clone, Build)]
pub struct RestServer<Health, Relay> {
    health: Health,
    relay: Relay,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: Arc<AllowedOrigins>,
    /// Directory with the static front end, served for every path that is
    /// not an api route.
    pub public_dir: Option<Arc<PathBuf>>,
}

/// Origins allowed to call the api from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parse the configured origins. A single `*` anywhere in the list
    /// allows any origin.
    pub fn parse(origins: &[String]) -> anyhow::Result<Self> {
        if origins.iter().any(|origin| origin == "*") {
            return Ok(Self::Any);
        }

        origins
            .iter()
            .map(|origin| {
                origin
                    .parse()
                    .with_context(|| format!("Invalid allowed origin: {origin:?}"))
            })
            .collect::<anyhow::Result<_>>()
            .map(Self::List)
    }

    fn cors_layer(&self) -> CorsLayer {
        let allow_origin = match self {
            Self::Any => AllowOrigin::any(),
            Self::List(origins) => AllowOrigin::list(origins.iter().cloned()),
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
    }
}

impl<Health, Relay> RestServer<Health, Relay>
where
    Health: HealthFeatureService,
    Relay: RelayFeatureService,
{
    pub async fn serve(self) -> anyhow::Result<()> {
        let RestServerConfig { host, port, .. } = self.config;
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind to {host}:{port}"))?;
        info!("Listening on {}", listener.local_addr()?);

        let service = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service).await.map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let cors = self.config.allowed_origins.cors_layer();

        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::relay::router(self.relay.into()))
            .apply_map(self.config.public_dir, |router, public_dir| {
                router.fallback_service(ServeDir::new(public_dir.as_path()))
            })
            .layer(cors);

        // layers added last run first: the request id must exist before the
        // trace span is created
        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        middlewares::panic_handler::add(router)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use axum::{
        body::Body,
        http::{header::ORIGIN, Request, Response, StatusCode},
    };
    use folio_core_health_contracts::{HealthStatus, MockHealthFeatureService};
    use folio_core_relay_contracts::MockRelayFeatureService;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    pub(crate) type Sut = RestServer<MockHealthFeatureService, MockRelayFeatureService>;

    pub(crate) fn sut(health: MockHealthFeatureService, relay: MockRelayFeatureService) -> Sut {
        RestServer {
            health,
            relay,
            config: config(),
        }
    }

    pub(crate) fn config() -> RestServerConfig {
        RestServerConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            allowed_origins: AllowedOrigins::Any.into(),
            public_dir: None,
        }
    }

    pub(crate) async fn call(sut: Sut, request: Request<Body>) -> Response<Body> {
        sut.router().oneshot(request).await.unwrap()
    }

    pub(crate) async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn parse_allowed_origins() {
        assert_eq!(
            AllowedOrigins::parse(&["https://folio.example".into(), "*".into()]).unwrap(),
            AllowedOrigins::Any
        );
        assert_eq!(
            AllowedOrigins::parse(&["https://folio.example".into()]).unwrap(),
            AllowedOrigins::List(vec![HeaderValue::from_static("https://folio.example")])
        );
        assert_eq!(
            AllowedOrigins::parse(&[]).unwrap(),
            AllowedOrigins::List(Vec::new())
        );
        assert!(AllowedOrigins::parse(&["bad\norigin".into()]).is_err());
    }

    #[tokio::test]
    async fn cors_preflight() {
        // Arrange
        let sut = RestServer {
            config: RestServerConfig {
                allowed_origins: AllowedOrigins::parse(&["https://folio.example".into()])
                    .unwrap()
                    .into(),
                ..config()
            },
            ..sut(MockHealthFeatureService::new(), MockRelayFeatureService::new())
        };
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/send-email")
            .header(ORIGIN, "https://folio.example")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();

        // Act
        let response = call(sut, request).await;

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://folio.example"
        );
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        // Arrange
        let health = MockHealthFeatureService::new().with_get_status(HealthStatus {
            email: true,
            email_configured: true,
        });
        let sut = sut(health, MockRelayFeatureService::new());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        // Act
        let response = call(sut, request).await;

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(request_id.len(), 22);
    }

    #[tokio::test]
    async fn serves_public_dir() {
        // Arrange
        let public_dir = tempfile::tempdir().unwrap();
        std::fs::write(public_dir.path().join("index.html"), "<h1>Portfolio</h1>").unwrap();

        let sut = RestServer {
            config: RestServerConfig {
                public_dir: Some(public_dir.path().to_path_buf().into()),
                ..config()
            },
            ..sut(MockHealthFeatureService::new(), MockRelayFeatureService::new())
        };
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        // Act
        let response = call(sut, request).await;

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<h1>Portfolio</h1>");
    }
}
