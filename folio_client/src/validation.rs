//! Advisory field checks. They are shown to the user but never stop a
//! submission, the relay has the final say.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldIssue {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} is not a valid email address")]
    InvalidEmail(&'static str),
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn check_required(field: &'static str, value: &str) -> Option<FieldIssue> {
    value.trim().is_empty().then_some(FieldIssue::Required(field))
}

/// Checks the format of a non empty email field.
pub fn check_email(field: &'static str, value: &str) -> Option<FieldIssue> {
    let value = value.trim();
    (!value.is_empty() && !is_valid_email(value)).then_some(FieldIssue::InvalidEmail(field))
}
