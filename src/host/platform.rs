use async_trait::async_trait;

use crate::host::error::{topic_failed, HostResult};
use crate::host::types::{
    AuthorizationStatus, DialogChoice, DialogPrompt, MessageHandler, MessagePayload, TokenHandler,
    Unsubscribe,
};
use crate::host::LOGGER;

/// The device's push notification service.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    async fn request_permission(&self) -> HostResult<AuthorizationStatus>;

    async fn get_token(&self) -> HostResult<Option<String>>;

    async fn delete_token(&self) -> HostResult<()>;

    async fn subscribe_to_topic(&self, topic: &str) -> HostResult<()> {
        Err(topic_failed(format!(
            "Topic subscription is not supported on this platform (topic \"{topic}\")"
        )))
    }

    async fn unsubscribe_from_topic(&self, topic: &str) -> HostResult<()> {
        Err(topic_failed(format!(
            "Topic unsubscription is not supported on this platform (topic \"{topic}\")"
        )))
    }

    /// Invoked whenever the platform silently reissues the registration token.
    fn on_token_refresh(&self, handler: TokenHandler) -> Unsubscribe;

    fn on_message(&self, handler: MessageHandler) -> Unsubscribe;

    fn on_notification_opened(&self, handler: MessageHandler) -> Unsubscribe;

    /// The notification that launched the app, if any.
    async fn initial_notification(&self) -> HostResult<Option<MessagePayload>> {
        Ok(None)
    }
}

/// Native modal dialogs.
#[async_trait]
pub trait UserDialog: Send + Sync {
    async fn confirm(&self, prompt: &DialogPrompt) -> DialogChoice;

    fn open_settings(&self) {
        LOGGER.info("Opening the app notification settings");
    }
}
