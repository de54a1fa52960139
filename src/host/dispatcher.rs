use std::collections::HashMap;
use std::sync::Arc;

use crate::bridge::BridgeMessage;
use crate::detection::CredentialToken;
use crate::host::constants::{TEST_NOTIFICATION_BODY, TEST_NOTIFICATION_TITLE};
use crate::host::error::{HostError, HostResult};
use crate::host::permission::{PermissionFlow, PermissionOutcome};
use crate::host::registration::{RegistrationClient, RegistrationRequest};
use crate::host::session::HostSession;
use crate::host::token_manager::TokenLifecycleManager;
use crate::host::types::{MessagePayload, MessageSource, NotificationPayload};
use crate::host::LOGGER;
use crate::logger::redact;
use crate::util::current_timestamp_ms;

/// What became of one page message. Nothing here is fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// Understood but deliberately not acted on.
    Ignored(&'static str),
    /// Not a message this host understands.
    Dropped(String),
    Failed(HostError),
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled)
    }
}

/// Routes page messages to host components and absorbs their errors.
pub struct HostDispatcher {
    manager: Arc<TokenLifecycleManager>,
    permission: Arc<PermissionFlow>,
    registration: RegistrationClient,
    session: Arc<HostSession>,
    platform: String,
    debug: bool,
}

impl std::fmt::Debug for HostDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostDispatcher")
            .field("registration", &self.registration)
            .field("platform", &self.platform)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl HostDispatcher {
    pub fn new(
        manager: Arc<TokenLifecycleManager>,
        permission: Arc<PermissionFlow>,
        registration: RegistrationClient,
        session: Arc<HostSession>,
        platform: impl Into<String>,
        debug: bool,
    ) -> Self {
        Self {
            manager,
            permission,
            registration,
            session,
            platform: platform.into(),
            debug,
        }
    }

    pub async fn handle_raw(&self, raw: &str) -> DispatchOutcome {
        match BridgeMessage::parse(raw) {
            Ok(message) => self.handle(message).await,
            Err(err) => {
                LOGGER.warn(format!("Dropping page message: {err}"));
                DispatchOutcome::Dropped(err.to_string())
            }
        }
    }

    pub async fn handle(&self, message: BridgeMessage) -> DispatchOutcome {
        let kind = message.kind();
        LOGGER.debug(format!("Page message \"{kind}\""));
        let result = match message {
            BridgeMessage::GetFcmToken => self.on_get_fcm_token().await,
            BridgeMessage::AuthAndFcmTokens {
                auth_token,
                fcm_token,
                success,
                error,
            } => self.on_auth_and_fcm_tokens(auth_token, fcm_token, success, error).await,
            BridgeMessage::SubscribeToTopic { topic } => self
                .manager
                .subscribe_to_topic(&topic)
                .await
                .map(|_| DispatchOutcome::Handled),
            BridgeMessage::UnsubscribeFromTopic { topic } => self
                .manager
                .unsubscribe_from_topic(&topic)
                .await
                .map(|_| DispatchOutcome::Handled),
            BridgeMessage::SendTokenToServer => self.on_send_token_to_server().await,
            BridgeMessage::UserLoggedIn {
                auth_token,
                success,
                error,
            } => self.on_user_logged_in(auth_token, success, error).await,
            BridgeMessage::TestPushNotification => Ok(self.on_test_push_notification()),
            BridgeMessage::InitializePushNotifications => Ok(self.start_permission_flow().await),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                LOGGER.error(format!("\"{kind}\" failed: {err}"));
                DispatchOutcome::Failed(err)
            }
        }
    }

    async fn on_get_fcm_token(&self) -> HostResult<DispatchOutcome> {
        if self.manager.forward_current()?.is_none() {
            self.manager.obtain_token().await?;
        }
        Ok(DispatchOutcome::Handled)
    }

    async fn on_auth_and_fcm_tokens(
        &self,
        auth_token: Option<String>,
        fcm_token: Option<String>,
        success: bool,
        error: Option<String>,
    ) -> HostResult<DispatchOutcome> {
        let credential = auth_token.and_then(CredentialToken::new);
        let fcm_token = fcm_token.filter(|token| !token.is_empty());
        let (Some(credential), Some(fcm_token), true) = (credential, fcm_token, success) else {
            LOGGER.warn(format!(
                "Page could not pair the push token with a credential: {}",
                error.as_deref().unwrap_or("missing field")
            ));
            return Ok(DispatchOutcome::Ignored("token pairing incomplete"));
        };

        self.session.remember(credential.clone());
        self.register(&fcm_token, &credential).await?;
        Ok(DispatchOutcome::Handled)
    }

    async fn on_send_token_to_server(&self) -> HostResult<DispatchOutcome> {
        let (Some(token), Some(credential)) = (self.manager.current_token(), self.session.credential())
        else {
            LOGGER.info("sendTokenToServer before a token and a credential are both known");
            return Ok(DispatchOutcome::Ignored("no token or credential yet"));
        };
        self.register(&token, &credential).await?;
        Ok(DispatchOutcome::Handled)
    }

    async fn on_user_logged_in(
        &self,
        auth_token: Option<String>,
        success: bool,
        error: Option<String>,
    ) -> HostResult<DispatchOutcome> {
        let credential = auth_token.and_then(CredentialToken::new);
        let (Some(credential), true) = (credential, success) else {
            LOGGER.warn(format!(
                "Login report without a credential: {}",
                error.as_deref().unwrap_or("missing authToken")
            ));
            return Ok(DispatchOutcome::Ignored("login report without credential"));
        };

        LOGGER.info(format!(
            "Page reported login (credential {})",
            redact(credential.as_str())
        ));
        self.session.remember(credential);
        Ok(self.start_permission_flow().await)
    }

    async fn start_permission_flow(&self) -> DispatchOutcome {
        match self.permission.run().await {
            PermissionOutcome::Enabled(_) | PermissionOutcome::Declined => DispatchOutcome::Handled,
            PermissionOutcome::AlreadyShown => DispatchOutcome::Ignored("permission dialog already shown"),
            PermissionOutcome::Failed(err) => {
                LOGGER.warn(format!("Push notifications not enabled: {err}"));
                DispatchOutcome::Failed(err)
            }
        }
    }

    fn on_test_push_notification(&self) -> DispatchOutcome {
        if !self.debug {
            LOGGER.info("Ignoring testPushNotification outside debug mode");
            return DispatchOutcome::Ignored("test notifications are debug-only");
        }
        let payload = MessagePayload {
            notification: Some(NotificationPayload {
                title: Some(TEST_NOTIFICATION_TITLE.to_string()),
                body: Some(TEST_NOTIFICATION_BODY.to_string()),
                image: None,
            }),
            data: Some(HashMap::from([
                ("type".to_string(), "test".to_string()),
                ("title".to_string(), TEST_NOTIFICATION_TITLE.to_string()),
                ("body".to_string(), TEST_NOTIFICATION_BODY.to_string()),
                ("timestamp".to_string(), current_timestamp_ms().to_string()),
            ])),
            message_id: Some(format!("test-{}", current_timestamp_ms())),
            ..Default::default()
        };
        self.manager.forward_message(MessageSource::Foreground, &payload);
        DispatchOutcome::Handled
    }

    async fn register(&self, token: &str, credential: &CredentialToken) -> HostResult<()> {
        let device_id = self.manager.store().device_id()?;
        let user_id = match credential.user_id() {
            Some(user_id) => user_id,
            None => {
                LOGGER.debug(if credential.looks_signed() {
                    "Credential has no user id claim, registering under the device id"
                } else {
                    "Opaque credential, registering under the device id"
                });
                device_id.clone()
            }
        };
        let request = RegistrationRequest {
            token,
            platform: &self.platform,
            user_id: &user_id,
            device_id: &device_id,
            credential: Some(credential),
        };
        self.registration.register(&request).await
    }
}
