use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Result of asking the platform for notification permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

impl AuthorizationStatus {
    /// Provisional delivery counts as granted.
    pub fn is_enabled(self) -> bool {
        matches!(
            self,
            AuthorizationStatus::Authorized | AuthorizationStatus::Provisional
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationStatus::NotDetermined => "not-determined",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Authorized => "authorized",
            AuthorizationStatus::Provisional => "provisional",
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload displayed to the user when a notification is shown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
}

/// Message delivered by the push platform.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessagePayload {
    pub notification: Option<NotificationPayload>,
    pub data: Option<HashMap<String, String>>,
    pub from: Option<String>,
    pub collapse_key: Option<String>,
    pub message_id: Option<String>,
}

impl MessagePayload {
    /// The `data` map as a JSON object, `null` when the message carried none.
    pub fn data_value(&self) -> Value {
        match &self.data {
            Some(data) => Value::Object(
                data.iter()
                    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                    .collect::<Map<String, Value>>(),
            ),
            None => Value::Null,
        }
    }
}

/// Where an incoming push message came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageSource {
    Foreground,
    NotificationOpened,
    InitialNotification,
}

impl MessageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageSource::Foreground => "foreground",
            MessageSource::NotificationOpened => "notification-opened",
            MessageSource::InitialNotification => "initial-notification",
        }
    }
}

pub type TokenHandler = Arc<dyn Fn(String) + Send + Sync + 'static>;

pub type MessageHandler = Arc<dyn Fn(MessagePayload) + Send + Sync + 'static>;

pub type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

/// A two-button modal shown by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl DialogPrompt {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        confirm_label: impl Into<String>,
        cancel_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: confirm_label.into(),
            cancel_label: cancel_label.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogChoice {
    Confirm,
    Cancel,
}
