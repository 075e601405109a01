use std::future::Future;

use folio_models::submission::Submission;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RelayFeatureService: Send + Sync + 'static {
    /// Render the submission into a notification email and send it to the
    /// site operator.
    ///
    /// Nothing is retried or persisted: on error the submission is lost
    /// unless the caller submits it again.
    fn relay(&self, submission: Submission)
        -> impl Future<Output = Result<(), RelayError>> + Send;
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("The mail server refused the message.")]
    Refused,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockRelayFeatureService {
    pub fn with_relay(mut self, submission: Submission, result: Result<(), RelayError>) -> Self {
        self.expect_relay()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
