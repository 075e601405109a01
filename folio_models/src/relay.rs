//! JSON contract of `POST /api/send-email`, shared by the relay and its
//! clients.

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::submission::{
    Submission, SubmissionKind, SubmissionMessage, SubmissionSubject, SubmissionType,
    Submitter, SubmitterEmail, SubmitterName, VisitorCountry, VisitorState,
};

pub const RELAY_ROUTE: &str = "/api/send-email";

/// Raw submission as it travels over the wire. Nothing is validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
}

/// Optional fields that are never checked accept any JSON value. Everything
/// that is not a string is treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Text(value) => Some(value),
        Lenient::Other(_) => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required fields: {}", .0.join(", "))]
pub struct MissingFieldsError(pub Vec<&'static str>);

impl TryFrom<SubmissionRequest> for Submission {
    type Error = MissingFieldsError;

    fn try_from(value: SubmissionRequest) -> Result<Self, Self::Error> {
        let name = value.name.and_then(|x| SubmitterName::try_new(x).ok());
        let email = value.email.and_then(|x| SubmitterEmail::try_new(x).ok());
        let message = value
            .message
            .and_then(|x| SubmissionMessage::try_new(x).ok());

        let (Some(name), Some(email), Some(message)) = (&name, &email, &message) else {
            let missing = [
                ("name", name.is_none()),
                ("email", email.is_none()),
                ("message", message.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect();
            return Err(MissingFieldsError(missing));
        };

        let kind = match SubmissionType::from_tag(value.kind.as_deref()) {
            SubmissionType::Contact => SubmissionKind::Contact {
                subject: value
                    .subject
                    .and_then(|x| SubmissionSubject::try_new(x).ok()),
            },
            SubmissionType::VisitorProfile => SubmissionKind::VisitorProfile {
                country: value.country.and_then(|x| VisitorCountry::try_new(x).ok()),
                state: value.state.and_then(|x| VisitorState::try_new(x).ok()),
            },
        };

        Ok(Submission {
            submitter: Submitter {
                name: name.clone(),
                email: email.clone(),
            },
            message: message.clone(),
            kind,
        })
    }
}

/// Body of every `POST /api/send-email` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub const SENT: &'static str = "Email sent successfully!";
    pub const FAILED: &'static str = "Failed to send email";
    pub const INVALID_BODY: &'static str = "Invalid request body";

    pub fn sent() -> Self {
        Self {
            success: true,
            message: Self::SENT.into(),
            error: None,
        }
    }

    pub fn missing_fields(err: &MissingFieldsError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            error: None,
        }
    }

    pub fn invalid_body(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Self::INVALID_BODY.into(),
            error: Some(error.into()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Self::FAILED.into(),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    fn request(json: serde_json::Value) -> SubmissionRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn contact_with_defaulted_subject() {
        let submission = Submission::try_from(request(serde_json::json!({
            "name": "Jane",
            "email": "jane@x.com",
            "message": "hi",
        })))
        .unwrap();

        assert_eq!(submission.submitter.name.into_inner(), "Jane");
        assert_eq!(submission.kind, SubmissionKind::Contact { subject: None });
    }

    #[test]
    fn empty_subject_counts_as_absent() {
        let submission = Submission::try_from(request(serde_json::json!({
            "name": "Jane",
            "email": "jane@x.com",
            "subject": "  ",
            "message": "hi",
            "type": "contact",
        })))
        .unwrap();

        assert_eq!(submission.kind, SubmissionKind::Contact { subject: None });
    }

    #[test]
    fn non_string_optional_fields_count_as_absent() {
        let request = request(serde_json::json!({
            "type": 1,
            "name": "Jane",
            "email": "jane@x.com",
            "subject": 42,
            "message": "hi",
            "country": ["US"],
            "state": null,
        }));

        assert_eq!(request.kind, None);
        assert_eq!(request.subject, None);
        assert_eq!(request.country, None);
        assert_eq!(request.state, None);

        let submission = Submission::try_from(request).unwrap();
        assert_eq!(submission.kind, SubmissionKind::Contact { subject: None });
    }

    #[test]
    fn visitor_profile() {
        let submission = Submission::try_from(request(serde_json::json!({
            "name": "Jane",
            "email": "jane@x.com",
            "message": "hi",
            "type": "visitor_profile",
            "country": "US",
            "state": "CA",
        })))
        .unwrap();

        assert_matches!(
            submission.kind,
            SubmissionKind::VisitorProfile {
                country: Some(country),
                state: Some(state),
            } if country.as_str() == "US" && state.as_str() == "CA"
        );
    }

    #[test]
    fn unknown_type_selects_contact() {
        let submission = Submission::try_from(request(serde_json::json!({
            "name": "Jane",
            "email": "jane@x.com",
            "message": "hi",
            "type": "hire",
            "country": "US",
        })))
        .unwrap();

        assert_eq!(submission.kind.submission_type(), SubmissionType::Contact);
    }

    #[test]
    fn missing_fields_are_listed() {
        for (json, expected) in [
            (
                serde_json::json!({ "email": "jane@x.com", "message": "hi" }),
                vec!["name"],
            ),
            (
                serde_json::json!({ "name": "Jane", "email": "", "message": "hi" }),
                vec!["email"],
            ),
            (
                serde_json::json!({ "name": "Jane", "email": "jane@x.com", "message": " " }),
                vec!["message"],
            ),
            (serde_json::json!({}), vec!["name", "email", "message"]),
            (
                serde_json::json!({ "name": null, "email": null, "message": "hi" }),
                vec!["name", "email"],
            ),
        ] {
            let result = Submission::try_from(request(json));
            assert_eq!(result, Err(MissingFieldsError(expected)));
        }
    }

    #[test]
    fn missing_fields_message() {
        let err = MissingFieldsError(vec!["name", "message"]);
        assert_eq!(err.to_string(), "Missing required fields: name, message");
    }

    #[test]
    fn response_omits_empty_error() {
        let json = serde_json::to_value(RelayResponse::sent()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "message": "Email sent successfully!" })
        );
    }

    #[test]
    fn request_serializes_type_tag() {
        let json = serde_json::to_value(SubmissionRequest {
            kind: Some("visitor_profile".into()),
            name: Some("Jane".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "visitor_profile", "name": "Jane" })
        );
    }
}
