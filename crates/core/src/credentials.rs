//! Email + password credentials accepted by signup and login.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Request body for signup and login.
///
/// Both fields default to empty so a missing field surfaces as a validation
/// error rather than a deserialization rejection.
#[derive(Clone, Default, Deserialize, Serialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Require both fields and a syntactically valid email address.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(CoreError::Validation(
                "Email and password required".into(),
            ));
        }
        self.validate()
            .map_err(|_| CoreError::Validation("Email address is invalid".into()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
