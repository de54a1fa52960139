use std::fmt::{Display, Formatter};

use crate::bridge::error::BridgeError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostErrorCode {
    PermissionBlocked,
    TokenUnavailable,
    RegistrationFailed,
    Storage,
    InvalidArgument,
    Internal,
    TopicFailed,
}

impl HostErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostErrorCode::PermissionBlocked => "host/permission-blocked",
            HostErrorCode::TokenUnavailable => "host/token-unavailable",
            HostErrorCode::RegistrationFailed => "host/registration-failed",
            HostErrorCode::Storage => "host/storage",
            HostErrorCode::InvalidArgument => "host/invalid-argument",
            HostErrorCode::Internal => "host/internal",
            HostErrorCode::TopicFailed => "host/topic-failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostError {
    pub code: HostErrorCode,
    message: String,
}

impl HostError {
    pub fn new(code: HostErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for HostError {}

impl From<BridgeError> for HostError {
    fn from(err: BridgeError) -> Self {
        internal_error(format!("Bridge delivery failed: {err}"))
    }
}

pub type HostResult<T> = Result<T, HostError>;

pub fn permission_blocked(message: impl Into<String>) -> HostError {
    HostError::new(HostErrorCode::PermissionBlocked, message)
}

pub fn token_unavailable() -> HostError {
    HostError::new(
        HostErrorCode::TokenUnavailable,
        "The push platform returned no registration token.",
    )
}

pub fn registration_failed(message: impl Into<String>) -> HostError {
    HostError::new(HostErrorCode::RegistrationFailed, message)
}

pub fn storage_error(message: impl Into<String>) -> HostError {
    HostError::new(HostErrorCode::Storage, message)
}

pub fn invalid_argument(message: impl Into<String>) -> HostError {
    HostError::new(HostErrorCode::InvalidArgument, message)
}

pub fn internal_error(message: impl Into<String>) -> HostError {
    HostError::new(HostErrorCode::Internal, message)
}

pub fn topic_failed(message: impl Into<String>) -> HostError {
    HostError::new(HostErrorCode::TopicFailed, message)
}
