//! Fixtures shared by the tests of all crates.

use std::sync::LazyLock;

use folio_models::{
    email_address::EmailAddressWithName,
    relay::SubmissionRequest,
    submission::{Submission, SubmissionKind, Submitter},
};

pub static OPERATOR: LazyLock<EmailAddressWithName> =
    LazyLock::new(|| "Portfolio Owner <owner@example.com>".parse().unwrap());

pub static JANE: LazyLock<Submitter> = LazyLock::new(|| Submitter {
    name: "Jane".try_into().unwrap(),
    email: "jane@x.com".try_into().unwrap(),
});

/// Scenario A: a contact message without subject.
pub static JANE_CONTACT: LazyLock<Submission> = LazyLock::new(|| Submission {
    submitter: JANE.clone(),
    message: "hi".try_into().unwrap(),
    kind: SubmissionKind::Contact { subject: None },
});

pub static JANE_CONTACT_WITH_SUBJECT: LazyLock<Submission> = LazyLock::new(|| Submission {
    kind: SubmissionKind::Contact {
        subject: Some("Freelance project".try_into().unwrap()),
    },
    ..JANE_CONTACT.clone()
});

/// Scenario B: a visitor profile from California.
pub static JANE_VISITOR_PROFILE: LazyLock<Submission> = LazyLock::new(|| Submission {
    kind: SubmissionKind::VisitorProfile {
        country: Some("US".try_into().unwrap()),
        state: Some("CA".try_into().unwrap()),
    },
    ..JANE_CONTACT.clone()
});

pub fn jane_contact_request() -> SubmissionRequest {
    SubmissionRequest {
        name: Some("Jane".into()),
        email: Some("jane@x.com".into()),
        message: Some("hi".into()),
        ..Default::default()
    }
}

pub fn jane_visitor_profile_request() -> SubmissionRequest {
    SubmissionRequest {
        kind: Some("visitor_profile".into()),
        country: Some("US".into()),
        state: Some("CA".into()),
        ..jane_contact_request()
    }
}
