use anyhow::anyhow;
use folio_email_contracts::{ContentType, Email, EmailService};
use folio_models::{email_address::EmailAddressWithName, Sensitive};
use folio_utils::Apply;
use lettre::{
    message::{header, MessageBuilder},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

/// Login for the mail account, e.g. a gmail address and its app password.
#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: Sensitive<String>,
}

impl EmailServiceImpl {
    /// Build the pooled SMTP transport. No connection is opened until the
    /// first email is sent or [`EmailService::ping`] is called.
    pub async fn new(
        url: &str,
        from: EmailAddressWithName,
        credentials: Option<SmtpCredentials>,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)?
            .apply_map(credentials, |builder, credentials| {
                builder.credentials(Credentials::new(
                    credentials.username,
                    credentials.password.0,
                ))
            })
            .build();

        Ok(Self { from, transport })
    }

    #[cfg(feature = "dummy")]
    pub async fn dummy() -> Self {
        Self::new("smtp://dummy", "dummy@example.com".parse().unwrap(), None)
            .await
            .unwrap()
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let message = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
            .subject(email.subject)
            .header(match email.content_type {
                ContentType::Text => header::ContentType::TEXT_PLAIN,
                ContentType::Html => header::ContentType::TEXT_HTML,
            })
            .body(email.body)?;

        let response = self.transport.send(message).await?;
        debug!(code = %response.code(), "smtp server answered");

        Ok(response.is_positive())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}
