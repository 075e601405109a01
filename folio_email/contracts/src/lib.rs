use std::future::Future;

use folio_models::email_address::EmailAddressWithName;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Hand the email to the mail transport.
    ///
    /// Returns `Ok(false)` if the mail server answered but refused the
    /// message, and an error if the transport itself failed.
    fn send(&self, email: Email) -> impl Future<Output = anyhow::Result<bool>> + Send;

    /// Check that the mail server is reachable and accepts our credentials.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: String,
    pub content_type: ContentType,
    pub reply_to: Option<EmailAddressWithName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: bool) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_send_error(mut self, email: Email, error: &'static str) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(Err(anyhow::anyhow!(error)))));
        self
    }

    pub fn with_ping(mut self, result: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(if result {
                Ok(())
            } else {
                Err(anyhow::anyhow!("connection refused"))
            }))
        });
        self
    }
}
