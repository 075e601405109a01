use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use folio_core_health_contracts::{HealthFeatureService, HealthStatus};
use folio_di::Build;
use folio_email_contracts::EmailService;
use folio_shared_contracts::time::TimeService;
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone, Build)]
pub struct HealthFeatureServiceImpl<Time, Email> {
    time: Time,
    email: Email,
    config: HealthFeatureConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub cache_ttl: Duration,
    pub email_configured: bool,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
}

impl CachedStatus {
    fn fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now < self.timestamp + ttl
    }
}

impl<Time, Email> HealthFeatureService for HealthFeatureServiceImpl<Time, Email>
where
    Time: TimeService,
    Email: EmailService,
{
    async fn get_status(&self) -> HealthStatus {
        let now = self.time.now();
        let ttl = self.config.cache_ttl;

        if let Some(cached) = self
            .state
            .cache
            .read()
            .await
            .as_ref()
            .filter(|c| c.fresh(now, ttl))
        {
            return cached.status;
        }

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard.as_ref().filter(|c| c.fresh(now, ttl)) {
            return cached.status;
        }

        let email = self
            .email
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping smtp server: {err:#}"))
            .is_ok();

        let status = HealthStatus {
            email,
            email_configured: self.config.email_configured,
        };

        cache_guard
            .insert(CachedStatus {
                status,
                timestamp: now,
            })
            .status
    }
}
