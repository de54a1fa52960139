use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeErrorCode {
    MalformedMessage,
    UnknownMessage,
    InjectionFailed,
    ChannelClosed,
}

impl BridgeErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeErrorCode::MalformedMessage => "bridge/malformed-message",
            BridgeErrorCode::UnknownMessage => "bridge/unknown-message",
            BridgeErrorCode::InjectionFailed => "bridge/injection-failed",
            BridgeErrorCode::ChannelClosed => "bridge/channel-closed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeError {
    pub code: BridgeErrorCode,
    message: String,
}

impl BridgeError {
    pub fn new(code: BridgeErrorCode, message: impl Into<String>) -> Self {
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

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for BridgeError {}

pub type BridgeResult<T> = Result<T, BridgeError>;

pub fn malformed_message(message: impl Into<String>) -> BridgeError {
    BridgeError::new(BridgeErrorCode::MalformedMessage, message)
}

pub fn unknown_message(kind: &str) -> BridgeError {
    BridgeError::new(
        BridgeErrorCode::UnknownMessage,
        format!("Unknown bridge message type \"{kind}\""),
    )
}

pub fn injection_failed(message: impl Into<String>) -> BridgeError {
    BridgeError::new(BridgeErrorCode::InjectionFailed, message)
}

pub fn channel_closed() -> BridgeError {
    BridgeError::new(
        BridgeErrorCode::ChannelClosed,
        "The host side of the bridge is no longer listening.",
    )
}
