use folio_config::Config;
use folio_di::Provide;
use folio_email_contracts::EmailService;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    email,
    environment::{types::RestServer, ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to smtp server");
    let email = email::connect(&config.email).await?;
    if config.email.credentials().is_none() {
        warn!("No smtp credentials configured");
    }

    spawn_transport_check(email.clone());

    let config_provider = ConfigProvider::new(&config)?;
    let mut provider = Provider::new(config_provider, email);
    let server: RestServer = provider.provide();
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve().await
}

/// Pings the mail transport in the background and logs the outcome.
///
/// An unusable transport only fails the submissions, the static site and the
/// health endpoint keep working.
pub fn spawn_transport_check(email: impl EmailService) -> JoinHandle<bool> {
    tokio::spawn(async move {
        match email.ping().await {
            Ok(()) => {
                info!("Smtp server is ready to send emails");
                true
            }
            Err(err) => {
                warn!("Smtp server is not usable: {err:#}");
                false
            }
        }
    })
}
