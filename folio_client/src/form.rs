use std::sync::atomic::{AtomicBool, Ordering};

use folio_models::{relay::SubmissionRequest, submission::SubmissionType};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    api::{RelayApiService, RelayReply},
    notify::{Notification, Notifier},
    store::{Counter, LocalStore},
    validation::{check_email, check_required, FieldIssue},
};

pub const CONTACT_SENT: &str = "Message sent successfully! I will get back to you soon.";
pub const VISITOR_PROFILE_SENT: &str = "Profile submitted successfully!";
pub const HIRE_INTEREST: &str = "Thank you for your interest! I will contact you soon.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Vec<FieldIssue> {
        [
            check_required("name", &self.name),
            check_required("email", &self.email),
            check_email("email", &self.email),
            check_required("message", &self.message),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn to_request(&self) -> SubmissionRequest {
        SubmissionRequest {
            kind: Some(SubmissionType::Contact.as_str().into()),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            subject: non_empty(&self.subject),
            message: Some(self.message.clone()),
            country: None,
            state: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorProfileForm {
    pub name: String,
    pub email: String,
    pub country: String,
    pub state: String,
    pub message: String,
}

impl VisitorProfileForm {
    pub fn validate(&self) -> Vec<FieldIssue> {
        [
            check_required("name", &self.name),
            check_required("email", &self.email),
            check_email("email", &self.email),
            check_required("message", &self.message),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn to_request(&self) -> SubmissionRequest {
        SubmissionRequest {
            kind: Some(SubmissionType::VisitorProfile.as_str().into()),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            subject: None,
            message: Some(self.message.clone()),
            country: non_empty(&self.country),
            state: non_empty(&self.state),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.into())
}

/// The relay accepted the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub message: &'static str,
    /// Advisory issues found before sending.
    pub warnings: Vec<FieldIssue>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("A submission of this form is already in progress.")]
    InFlight,
    #[error("The relay answered with status {}.", .0.status)]
    Rejected(RelayReply),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Drives the contact and visitor profile forms: one request per submit,
/// feedback through the notifier and bookkeeping in the local store.
#[derive(Debug)]
pub struct SubmissionClient<Api, Store, Notify> {
    api: Api,
    store: Store,
    notifier: Notify,
    /// Address shown to the user when the relay cannot deliver a message.
    fallback_email: String,
    contact: InFlight,
    visitor_profile: InFlight,
}

impl<Api, Store, Notify> SubmissionClient<Api, Store, Notify>
where
    Api: RelayApiService,
    Store: LocalStore,
    Notify: Notifier,
{
    pub fn new(api: Api, store: Store, notifier: Notify, fallback_email: String) -> Self {
        Self {
            api,
            store,
            notifier,
            fallback_email,
            contact: InFlight::default(),
            visitor_profile: InFlight::default(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn notifier(&self) -> &Notify {
        &self.notifier
    }

    /// Submit the contact form. The form is cleared on success and left
    /// untouched on failure.
    pub async fn submit_contact(&self, form: &mut ContactForm) -> Result<Ack, SubmitError> {
        let _guard = self.contact.acquire().ok_or(SubmitError::InFlight)?;

        let warnings = report(form.validate());
        let result = self.send(form.to_request()).await;
        if let Err(err) = result {
            self.notifier.notify(Notification::error(format!(
                "Failed to send message. Please try emailing directly at {}",
                self.fallback_email
            )));
            return Err(err);
        }

        *form = ContactForm::default();
        self.store
            .increment(Counter::Message)
            .inspect_err(|err| error!("Failed to update message count: {err:#}"))
            .ok();
        self.notifier.notify(Notification::success(CONTACT_SENT));

        Ok(Ack {
            message: CONTACT_SENT,
            warnings,
        })
    }

    /// Submit the visitor profile form. On success the state is added to the
    /// visited states.
    pub async fn submit_visitor_profile(
        &self,
        form: &mut VisitorProfileForm,
    ) -> Result<Ack, SubmitError> {
        let _guard = self.visitor_profile.acquire().ok_or(SubmitError::InFlight)?;

        let warnings = report(form.validate());
        let result = self.send(form.to_request()).await;
        if let Err(err) = result {
            self.notifier.notify(Notification::error(format!(
                "Failed to submit profile. Please try emailing directly at {}",
                self.fallback_email
            )));
            return Err(err);
        }

        let state = std::mem::take(form).state;
        if let Some(state) = non_empty(&state) {
            match self.store.insert_state(&state) {
                Ok(true) => info!(%state, "new visited state"),
                Ok(false) => {}
                Err(err) => error!("Failed to update visited states: {err:#}"),
            }
        }
        self.notifier
            .notify(Notification::success(VISITOR_PROFILE_SENT));

        Ok(Ack {
            message: VISITOR_PROFILE_SENT,
            warnings,
        })
    }

    /// Count a page visit and return the new visitor count.
    pub fn register_visit(&self) -> anyhow::Result<u64> {
        self.store.increment(Counter::Visitor)
    }

    /// Count a click on the hire button and thank the visitor.
    pub fn express_hire_interest(&self) -> anyhow::Result<u64> {
        let count = self.store.increment(Counter::Hire)?;
        self.notifier.notify(Notification::success(HIRE_INTEREST));
        Ok(count)
    }

    async fn send(&self, request: SubmissionRequest) -> Result<(), SubmitError> {
        let reply = self
            .api
            .send_submission(request)
            .await
            .inspect_err(|err| warn!("Submission failed: {err:#}"))?;

        if !reply.is_success() {
            warn!(status = reply.status, error = ?reply.error(), "relay did not accept the submission");
            return Err(SubmitError::Rejected(reply));
        }

        Ok(())
    }
}

fn report(issues: Vec<FieldIssue>) -> Vec<FieldIssue> {
    for issue in &issues {
        warn!("{issue}");
    }
    issues
}

/// Allows one submission per form at a time.
#[derive(Debug, Default)]
struct InFlight(AtomicBool);

impl InFlight {
    fn acquire(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }
}

/// Releases the form when dropped, whatever the outcome of the submission.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
