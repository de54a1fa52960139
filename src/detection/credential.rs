use std::fmt;

use crate::util::jwt;

/// Claims tried, in order, when deriving a user id from the credential.
const USER_ID_CLAIMS: &[&str] = &["sub", "userId", "id"];

/// Session credential discovered in the page's storage.
///
/// The value is opaque to the host. It is usually a three-segment signed
/// token, but nothing here depends on that.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CredentialToken(String);

impl CredentialToken {
    /// Wraps a raw value, rejecting empty or whitespace-only strings.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn looks_signed(&self) -> bool {
        jwt::is_three_segment(&self.0)
    }

    pub fn user_id(&self) -> Option<String> {
        jwt::string_claim(&self.0, USER_ID_CLAIMS)
    }

    /// Header value for the registration endpoint.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep full credentials out of `{:?}` output.
impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CredentialToken")
            .field(&crate::logger::redact(&self.0))
            .finish()
    }
}

impl fmt::Display for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
