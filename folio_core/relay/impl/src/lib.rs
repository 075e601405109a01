use std::sync::Arc;

use folio_core_relay_contracts::{RelayError, RelayFeatureService};
use folio_di::Build;
use folio_email_contracts::{ContentType, Email, EmailService};
use folio_models::{
    email_address::EmailAddressWithName,
    submission::{Submission, SubmissionKind},
};
use folio_templates_contracts::{ContactTemplate, TemplateService, VisitorProfileTemplate};
use tracing::{error, info, warn};

pub const DEFAULT_CONTACT_SUBJECT: &str = "New Contact Form Submission";
pub const VISITOR_PROFILE_SUBJECT: &str = "New Visitor Profile Submission";
pub const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, Build)]
pub struct RelayFeatureServiceImpl<Email, Template> {
    email: Email,
    template: Template,
    config: RelayFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct RelayFeatureConfig {
    /// The site operator, who receives every notification.
    pub recipient: Arc<EmailAddressWithName>,
}

impl<EmailS, TemplateS> RelayFeatureService for RelayFeatureServiceImpl<EmailS, TemplateS>
where
    EmailS: EmailService,
    TemplateS: TemplateService,
{
    async fn relay(&self, submission: Submission) -> Result<(), RelayError> {
        let submission_type = submission.kind.submission_type();

        let reply_to = submission.submitter.email.parse_address();
        if reply_to.is_none() {
            warn!(%submission_type, "submitter email is not a valid address, sending without reply-to");
        }

        let (subject, body) = self.render(submission)?;

        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject,
            body,
            content_type: ContentType::Html,
            reply_to: reply_to.map(Into::into),
        };

        match self.email.send(email).await {
            Ok(true) => {
                info!(%submission_type, "relayed submission");
                Ok(())
            }
            Ok(false) => {
                warn!(%submission_type, "mail server refused the notification");
                Err(RelayError::Refused)
            }
            Err(err) => {
                error!(%submission_type, "failed to send notification: {err:#}");
                Err(RelayError::Other(err))
            }
        }
    }
}

impl<EmailS, TemplateS> RelayFeatureServiceImpl<EmailS, TemplateS>
where
    TemplateS: TemplateService,
{
    /// Select the template for the submission and return subject and body.
    fn render(&self, submission: Submission) -> anyhow::Result<(String, String)> {
        let Submission {
            submitter,
            message,
            kind,
        } = submission;

        match kind {
            SubmissionKind::Contact { subject } => {
                let subject = subject
                    .map(|x| x.into_inner())
                    .unwrap_or_else(|| DEFAULT_CONTACT_SUBJECT.into());
                let body = self.template.render(&ContactTemplate {
                    name: submitter.name.into_inner(),
                    email: submitter.email.into_inner(),
                    subject: subject.clone(),
                    message: message.into_inner(),
                })?;
                Ok((subject, body))
            }
            SubmissionKind::VisitorProfile { country, state } => {
                let body = self.template.render(&VisitorProfileTemplate {
                    name: submitter.name.into_inner(),
                    email: submitter.email.into_inner(),
                    country: country.map_or_else(|| NOT_PROVIDED.into(), |x| x.into_inner()),
                    state: state.map_or_else(|| NOT_PROVIDED.into(), |x| x.into_inner()),
                    message: message.into_inner(),
                })?;
                Ok((VISITOR_PROFILE_SUBJECT.into(), body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_demo::{
        JANE_CONTACT, JANE_CONTACT_WITH_SUBJECT, JANE_VISITOR_PROFILE, OPERATOR,
    };
    use folio_email_contracts::MockEmailService;
    use folio_models::submission::{SubmissionKind, Submitter};
    use folio_templates_contracts::MockTemplateService;
    use folio_templates_impl::TemplateServiceImpl;
    use folio_utils::assert_matches;

    use super::*;

    fn config() -> RelayFeatureConfig {
        RelayFeatureConfig {
            recipient: Arc::new(OPERATOR.clone()),
        }
    }

    fn jane_contact_template(subject: &str) -> ContactTemplate {
        ContactTemplate {
            name: "Jane".into(),
            email: "jane@x.com".into(),
            subject: subject.into(),
            message: "hi".into(),
        }
    }

    fn notification(subject: &str, body: &str) -> Email {
        Email {
            recipient: OPERATOR.clone(),
            subject: subject.into(),
            body: body.into(),
            content_type: ContentType::Html,
            reply_to: Some("jane@x.com".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn contact_with_default_subject() {
        // Arrange
        let template = MockTemplateService::new().with_render(
            jane_contact_template(DEFAULT_CONTACT_SUBJECT),
            "<contact>".into(),
        );

        let email = MockEmailService::new()
            .with_send(notification(DEFAULT_CONTACT_SUBJECT, "<contact>"), true);

        let sut = RelayFeatureServiceImpl {
            email,
            template,
            config: config(),
        };

        // Act
        let result = sut.relay(JANE_CONTACT.clone()).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn contact_with_subject() {
        // Arrange
        let template = MockTemplateService::new().with_render(
            jane_contact_template("Freelance project"),
            "<contact>".into(),
        );

        let email = MockEmailService::new()
            .with_send(notification("Freelance project", "<contact>"), true);

        let sut = RelayFeatureServiceImpl {
            email,
            template,
            config: config(),
        };

        // Act
        let result = sut.relay(JANE_CONTACT_WITH_SUBJECT.clone()).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn visitor_profile() {
        // Arrange
        let template = MockTemplateService::new().with_render(
            VisitorProfileTemplate {
                name: "Jane".into(),
                email: "jane@x.com".into(),
                country: "US".into(),
                state: "CA".into(),
                message: "hi".into(),
            },
            "<visitor>".into(),
        );

        let email = MockEmailService::new()
            .with_send(notification(VISITOR_PROFILE_SUBJECT, "<visitor>"), true);

        let sut = RelayFeatureServiceImpl {
            email,
            template,
            config: config(),
        };

        // Act
        let result = sut.relay(JANE_VISITOR_PROFILE.clone()).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn visitor_profile_body_contains_location() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_send()
            .once()
            .withf(|email| {
                email.subject == VISITOR_PROFILE_SUBJECT
                    && email.body.contains("<strong>Country:</strong> US")
                    && email.body.contains("<strong>State:</strong> CA")
                    && !email.body.contains("New Contact Message")
            })
            .return_once(|_| Box::pin(std::future::ready(Ok(true))));

        let sut = RelayFeatureServiceImpl {
            email,
            template: TemplateServiceImpl::default(),
            config: config(),
        };

        // Act
        let result = sut.relay(JANE_VISITOR_PROFILE.clone()).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn visitor_profile_without_location() {
        // Arrange
        let submission = Submission {
            kind: SubmissionKind::VisitorProfile {
                country: None,
                state: None,
            },
            ..JANE_CONTACT.clone()
        };

        let template = MockTemplateService::new().with_render(
            VisitorProfileTemplate {
                name: "Jane".into(),
                email: "jane@x.com".into(),
                country: NOT_PROVIDED.into(),
                state: NOT_PROVIDED.into(),
                message: "hi".into(),
            },
            "<visitor>".into(),
        );

        let email = MockEmailService::new()
            .with_send(notification(VISITOR_PROFILE_SUBJECT, "<visitor>"), true);

        let sut = RelayFeatureServiceImpl {
            email,
            template,
            config: config(),
        };

        // Act
        let result = sut.relay(submission).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn unparseable_email_omits_reply_to() {
        // Arrange
        let submission = Submission {
            submitter: Submitter {
                email: "jane at x dot com".try_into().unwrap(),
                ..JANE_CONTACT.submitter.clone()
            },
            ..JANE_CONTACT.clone()
        };

        let template = MockTemplateService::new().with_render(
            ContactTemplate {
                email: "jane at x dot com".into(),
                ..jane_contact_template(DEFAULT_CONTACT_SUBJECT)
            },
            "<contact>".into(),
        );

        let email = MockEmailService::new().with_send(
            Email {
                reply_to: None,
                ..notification(DEFAULT_CONTACT_SUBJECT, "<contact>")
            },
            true,
        );

        let sut = RelayFeatureServiceImpl {
            email,
            template,
            config: config(),
        };

        // Act
        let result = sut.relay(submission).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn refused() {
        // Arrange
        let template = MockTemplateService::new().with_render(
            jane_contact_template(DEFAULT_CONTACT_SUBJECT),
            "<contact>".into(),
        );

        let email = MockEmailService::new()
            .with_send(notification(DEFAULT_CONTACT_SUBJECT, "<contact>"), false);

        let sut = RelayFeatureServiceImpl {
            email,
            template,
            config: config(),
        };

        // Act
        let result = sut.relay(JANE_CONTACT.clone()).await;

        // Assert
        assert_matches!(result, Err(RelayError::Refused));
    }

    #[tokio::test]
    async fn transport_error() {
        // Arrange
        let template = MockTemplateService::new().with_render(
            jane_contact_template(DEFAULT_CONTACT_SUBJECT),
            "<contact>".into(),
        );

        let email = MockEmailService::new().with_send_error(
            notification(DEFAULT_CONTACT_SUBJECT, "<contact>"),
            "Invalid login: 535 Username and Password not accepted",
        );

        let sut = RelayFeatureServiceImpl {
            email,
            template,
            config: config(),
        };

        // Act
        let result = sut.relay(JANE_CONTACT.clone()).await;

        // Assert
        assert_matches!(
            result,
            Err(RelayError::Other(err))
                if err.to_string() == "Invalid login: 535 Username and Password not accepted"
        );
    }

    #[tokio::test]
    async fn same_submission_twice_sends_twice() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_send()
            .times(2)
            .returning(|_| Box::pin(std::future::ready(Ok(true))));

        let sut = RelayFeatureServiceImpl {
            email,
            template: TemplateServiceImpl::default(),
            config: config(),
        };

        // Act
        let first = sut.relay(JANE_CONTACT.clone()).await;
        let second = sut.relay(JANE_CONTACT.clone()).await;

        // Assert
        first.unwrap();
        second.unwrap();
    }
}
