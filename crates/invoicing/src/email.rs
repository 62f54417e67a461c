use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use charterwise_core::{DomainError, DomainResult, ValueObject};

/// Syntactically valid email address (normalised to lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: impl AsRef<str>) -> DomainResult<Self> {
        let email = raw.as_ref().trim();
        if !email.validate_email() {
            return Err(DomainError::validation("Invalid email"));
        }
        Ok(Self(email.to_lowercase()))
    }

    /// Empty or whitespace-only input means "no address given".
    pub fn parse_optional(raw: Option<&str>) -> DomainResult<Option<Self>> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(email) => Self::parse(email).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for EmailAddress {}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
