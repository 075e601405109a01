use std::{future::Future, sync::Arc};

use anyhow::Context;
use folio_models::relay::{RelayResponse, SubmissionRequest, RELAY_ROUTE};
use serde::Deserialize;
use url::Url;

use crate::http::HttpClient;

const HEALTH_ROUTE: &str = "/health";

#[cfg_attr(test, mockall::automock)]
pub trait RelayApiService: Send + Sync + 'static {
    /// Post the submission to the relay. Exactly one request is sent, an
    /// error means that no response was received at all.
    fn send_submission(
        &self,
        request: SubmissionRequest,
    ) -> impl Future<Output = anyhow::Result<RelayReply>> + Send;

    fn health(&self) -> impl Future<Output = anyhow::Result<HealthReport>> + Send;
}

/// What the relay answered to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub status: u16,
    /// Missing if the body was not a relay response, e.g. from a proxy.
    pub body: Option<RelayResponse>,
}

impl RelayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.body.as_ref().is_some_and(|body| body.success)
    }

    /// The error text reported by the relay, if any.
    pub fn error(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.error.as_deref().or((!body.success).then_some(&*body.message)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub email: bool,
    pub email_configured: bool,
}

#[derive(Debug, Clone)]
pub struct RelayApiServiceImpl {
    base_url: Arc<Url>,
    client: HttpClient,
}

impl RelayApiServiceImpl {
    /// Routes are resolved below `base_url`, so a relay mounted under a path
    /// prefix keeps that prefix.
    pub fn new(mut base_url: Url) -> anyhow::Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url: base_url.into(),
            client: HttpClient::new()?,
        })
    }

    fn endpoint(&self, route: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(route.trim_start_matches('/'))
            .with_context(|| format!("Invalid relay url {}", self.base_url))
    }
}

impl RelayApiService for RelayApiServiceImpl {
    async fn send_submission(&self, request: SubmissionRequest) -> anyhow::Result<RelayReply> {
        let response = self
            .client
            .post(self.endpoint(RELAY_ROUTE)?)
            .json(&request)
            .send()
            .await
            .context("Failed to reach the relay")?;

        let status = response.status().as_u16();
        let body = response.json::<RelayResponse>().await.ok();

        Ok(RelayReply { status, body })
    }

    async fn health(&self) -> anyhow::Result<HealthReport> {
        self.client
            .get(self.endpoint(HEALTH_ROUTE)?)
            .send()
            .await
            .context("Failed to reach the relay")?
            .json()
            .await
            .context("Invalid health response")
    }
}

#[cfg(test)]
impl MockRelayApiService {
    pub fn with_send_submission(mut self, request: SubmissionRequest, reply: RelayReply) -> Self {
        self.expect_send_submission()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(move |_| Box::pin(std::future::ready(Ok(reply))));
        self
    }

    pub fn with_send_submission_error(
        mut self,
        request: SubmissionRequest,
        error: &'static str,
    ) -> Self {
        self.expect_send_submission()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(move |_| Box::pin(std::future::ready(Err(anyhow::anyhow!(error)))));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: Option<RelayResponse>) -> RelayReply {
        RelayReply { status, body }
    }

    #[test]
    fn success_requires_2xx_and_success_flag() {
        assert!(reply(200, Some(RelayResponse::sent())).is_success());
        assert!(!reply(200, None).is_success());
        assert!(!reply(500, Some(RelayResponse::sent())).is_success());
        assert!(!reply(200, Some(RelayResponse::failed("smtp down"))).is_success());
    }

    #[test]
    fn error_text() {
        assert_eq!(
            reply(500, Some(RelayResponse::failed("smtp down"))).error(),
            Some("smtp down")
        );
        assert_eq!(
            reply(400, Some(RelayResponse::invalid_body("expected value"))).error(),
            Some("expected value")
        );
        assert_eq!(reply(200, Some(RelayResponse::sent())).error(), None);
        assert_eq!(reply(502, None).error(), None);
    }

    #[test]
    fn endpoints_keep_the_path_prefix() {
        for base in ["https://host/portfolio", "https://host/portfolio/"] {
            let api = RelayApiServiceImpl::new(base.parse().unwrap()).unwrap();
            assert_eq!(
                api.endpoint(RELAY_ROUTE).unwrap().as_str(),
                "https://host/portfolio/api/send-email"
            );
            assert_eq!(
                api.endpoint(HEALTH_ROUTE).unwrap().as_str(),
                "https://host/portfolio/health"
            );
        }
    }

    #[test]
    fn endpoints_at_the_host_root() {
        let api = RelayApiServiceImpl::new("http://127.0.0.1:3000".parse().unwrap()).unwrap();
        assert_eq!(
            api.endpoint(RELAY_ROUTE).unwrap().as_str(),
            "http://127.0.0.1:3000/api/send-email"
        );
    }
}
