use anyhow::ensure;
use chrono::Utc;
use clap::Subcommand;
use folio_config::Config;
use folio_email_contracts::{ContentType, Email, EmailService};
use folio_models::email_address::EmailAddressWithName;
use folio_templates_contracts::{DeliverabilityTestTemplate, TemplateService};
use folio_templates_impl::TemplateServiceImpl;
use folio_utils::folio_version;
use tracing::info;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test {
        /// Defaults to the configured contact recipient
        recipient: Option<EmailAddressWithName>,
    },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: Option<EmailAddressWithName>) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email).await?;
    email_service.ping().await?;

    let body = TemplateServiceImpl::default().render(&DeliverabilityTestTemplate {
        version: folio_version().into(),
        sent_at: Utc::now().to_rfc3339(),
    })?;

    let recipient = recipient.unwrap_or(config.contact.recipient);
    info!(%recipient, "Sending test email");

    let ok = email_service
        .send(Email {
            recipient,
            subject: "Portfolio Email Test".into(),
            body,
            content_type: ContentType::Html,
            reply_to: None,
        })
        .await?;

    ensure!(ok, "Failed to send email");
    info!("Test email sent");

    Ok(())
}
