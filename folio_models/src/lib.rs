use std::ops::Deref;

use serde::{Deserialize, Serialize};

pub mod email_address;
mod macros;
pub mod relay;
pub mod submission;

/// Wrapper for secrets that must never show up in logs or debug output.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitive<T>(pub T);

impl<T> std::fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[sensitive]")
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for Sensitive<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_debug_is_redacted() {
        let secret = Sensitive("app-password".to_owned());
        assert_eq!(format!("{secret:?}"), "[sensitive]");
        assert_eq!(*secret, "app-password");
    }
}
