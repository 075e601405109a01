use anyhow::Context;
use folio_config::EmailConfig;
use folio_email_impl::{EmailServiceImpl, SmtpCredentials};

/// Connect to the SMTP server
pub async fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    let credentials = config
        .credentials()
        .map(|(username, password)| SmtpCredentials { username, password });

    EmailServiceImpl::new(&config.smtp_url, config.from.clone(), credentials)
        .await
        .context("Failed to connect to SMTP server")
}
