use serde::{Deserialize, Serialize};

use crate::{email_address::EmailAddress, macros::nutype_string};

/// A validated submission, ready to be relayed to the site operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub submitter: Submitter,
    pub message: SubmissionMessage,
    pub kind: SubmissionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub name: SubmitterName,
    pub email: SubmitterEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionKind {
    Contact {
        subject: Option<SubmissionSubject>,
    },
    VisitorProfile {
        country: Option<VisitorCountry>,
        state: Option<VisitorState>,
    },
}

impl SubmissionKind {
    pub fn submission_type(&self) -> SubmissionType {
        match self {
            Self::Contact { .. } => SubmissionType::Contact,
            Self::VisitorProfile { .. } => SubmissionType::VisitorProfile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    Contact,
    VisitorProfile,
}

impl SubmissionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::VisitorProfile => "visitor_profile",
        }
    }

    /// Every value other than `visitor_profile`, including none at all, selects
    /// the contact template.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("visitor_profile") => Self::VisitorProfile,
            _ => Self::Contact,
        }
    }
}

impl std::fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

nutype_string!(SubmitterName(validate(not_empty)));
nutype_string!(
    /// Free form reply address. Only emptiness is checked, the relay omits
    /// the reply-to header when the value is not a parseable address.
    SubmitterEmail(validate(not_empty))
);
nutype_string!(SubmissionMessage(validate(not_empty)));
nutype_string!(SubmissionSubject(validate(not_empty)));
nutype_string!(VisitorCountry(validate(not_empty)));
nutype_string!(VisitorState(validate(not_empty)));

impl SubmitterEmail {
    pub fn parse_address(&self) -> Option<EmailAddress> {
        let email: &str = self.as_ref();
        email.parse().ok()
    }
}
