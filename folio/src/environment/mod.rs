use folio_api_rest::{AllowedOrigins, RestServerConfig};
use folio_config::Config;
use folio_core_health_impl::HealthFeatureConfig;
use folio_core_relay_impl::RelayFeatureConfig;
use folio_di::provider;
use types::Email;

pub mod types;

provider! {
    /// The default provider, capable of providing all the dependencies
    pub Provider {
        email: Email,
        ..config: ConfigProvider {
            // API
            RestServerConfig,

            // Core
            HealthFeatureConfig,
            RelayFeatureConfig,
        }
    }
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> Self {
        Self {
            _state: Default::default(),
            email,
            config,
        }
    }
}

provider! {
    /// Reduced provider, capable of providing services that only depend on the configuration
    pub ConfigProvider {
        // API
        rest_server_config: RestServerConfig,

        // Core
        health_feature_config: HealthFeatureConfig,
        relay_feature_config: RelayFeatureConfig,
    }
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let rest_server_config = RestServerConfig {
            host: config.http.host,
            port: config.http.port,
            allowed_origins: AllowedOrigins::parse(&config.http.allowed_origins)?.into(),
            public_dir: config.http.public_dir.clone().map(Into::into),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: *config.health.cache_ttl,
            email_configured: config.email.credentials().is_some(),
        };

        let relay_feature_config = RelayFeatureConfig {
            recipient: config.contact.recipient.clone().into(),
        };

        Ok(Self {
            _state: Default::default(),
            rest_server_config,
            health_feature_config,
            relay_feature_config,
        })
    }
}
