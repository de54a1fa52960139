use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::error::{malformed_message, unknown_message, BridgeResult};
use crate::detection::CredentialToken;

/// Messages posted by the page to the host, discriminated by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    #[serde(rename = "getFCMToken")]
    GetFcmToken,
    #[serde(rename = "authAndFCMTokens", rename_all = "camelCase")]
    AuthAndFcmTokens {
        #[serde(default)]
        auth_token: Option<String>,
        #[serde(default)]
        fcm_token: Option<String>,
        #[serde(default)]
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    #[serde(rename = "subscribeToTopic")]
    SubscribeToTopic { topic: String },
    #[serde(rename = "unsubscribeFromTopic")]
    UnsubscribeFromTopic { topic: String },
    #[serde(rename = "sendTokenToServer")]
    SendTokenToServer,
    #[serde(rename = "userLoggedIn", rename_all = "camelCase")]
    UserLoggedIn {
        #[serde(default)]
        auth_token: Option<String>,
        #[serde(default)]
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Debug builds only.
    #[serde(rename = "testPushNotification")]
    TestPushNotification,
    #[serde(rename = "initializePushNotifications")]
    InitializePushNotifications,
}

pub const MESSAGE_KINDS: &[&str] = &[
    "getFCMToken",
    "authAndFCMTokens",
    "subscribeToTopic",
    "unsubscribeFromTopic",
    "sendTokenToServer",
    "userLoggedIn",
    "testPushNotification",
    "initializePushNotifications",
];

impl BridgeMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeMessage::GetFcmToken => "getFCMToken",
            BridgeMessage::AuthAndFcmTokens { .. } => "authAndFCMTokens",
            BridgeMessage::SubscribeToTopic { .. } => "subscribeToTopic",
            BridgeMessage::UnsubscribeFromTopic { .. } => "unsubscribeFromTopic",
            BridgeMessage::SendTokenToServer => "sendTokenToServer",
            BridgeMessage::UserLoggedIn { .. } => "userLoggedIn",
            BridgeMessage::TestPushNotification => "testPushNotification",
            BridgeMessage::InitializePushNotifications => "initializePushNotifications",
        }
    }

    pub fn user_logged_in(credential: &CredentialToken) -> Self {
        BridgeMessage::UserLoggedIn {
            auth_token: Some(credential.as_str().to_string()),
            success: true,
            error: None,
        }
    }

    /// Pairs a push token with whatever credential the page could find.
    pub fn auth_and_fcm_tokens(fcm_token: &str, credential: Option<&CredentialToken>) -> Self {
        BridgeMessage::AuthAndFcmTokens {
            auth_token: credential.map(|credential| credential.as_str().to_string()),
            fcm_token: Some(fcm_token.to_string()),
            success: credential.is_some(),
            error: credential
                .is_none()
                .then(|| "No auth token found in page storage".to_string()),
        }
    }

    /// Parses a raw `postMessage` payload.
    ///
    /// A well-formed object whose `type` is not one of [`MESSAGE_KINDS`] is
    /// reported as `bridge/unknown-message`; anything else that fails to parse
    /// is `bridge/malformed-message`.
    pub fn parse(raw: &str) -> BridgeResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| malformed_message(format!("Bridge message is not JSON: {err}")))?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed_message("Bridge message has no string `type` field"))?;
        if !MESSAGE_KINDS.contains(&kind) {
            return Err(unknown_message(kind));
        }
        let kind = kind.to_string();
        serde_json::from_value(value)
            .map_err(|err| malformed_message(format!("Invalid \"{kind}\" message: {err}")))
    }

    pub fn to_json(&self) -> String {
        // Serializing a plain enum of strings and bools cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
