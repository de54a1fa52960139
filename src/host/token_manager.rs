use std::sync::{Arc, Mutex, Weak};

use crate::bridge::{PageCallback, PageInjector};
use crate::detection::Latch;
use crate::host::constants::{
    SETTINGS_PROMPT_CANCEL, SETTINGS_PROMPT_CONFIRM, SETTINGS_PROMPT_MESSAGE, SETTINGS_PROMPT_TITLE,
};
use crate::host::error::{invalid_argument, permission_blocked, token_unavailable, HostResult};
use crate::host::platform::{PushPlatform, UserDialog};
use crate::host::session::HostSession;
use crate::host::token_store::{TokenRecord, TokenStore};
use crate::host::types::{
    DialogChoice, DialogPrompt, MessageHandler, MessagePayload, MessageSource, TokenHandler,
    Unsubscribe,
};
use crate::host::LOGGER;
use crate::logger::redact;

/// Owns the push registration token: obtains it, persists it, forwards it to
/// the page and follows platform-side rotation for the rest of the process.
pub struct TokenLifecycleManager {
    me: Weak<TokenLifecycleManager>,
    platform: Arc<dyn PushPlatform>,
    dialog: Arc<dyn UserDialog>,
    store: TokenStore,
    injector: Arc<dyn PageInjector>,
    session: Arc<HostSession>,
    current: Mutex<Option<String>>,
    listeners_installed: Latch,
    subscriptions: Mutex<Vec<Unsubscribe>>,
}

impl std::fmt::Debug for TokenLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenLifecycleManager")
            .field("has_token", &self.current.lock().unwrap().is_some())
            .field("listeners_installed", &self.listeners_installed.is_set())
            .finish_non_exhaustive()
    }
}

impl TokenLifecycleManager {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        dialog: Arc<dyn UserDialog>,
        store: TokenStore,
        injector: Arc<dyn PageInjector>,
        session: Arc<HostSession>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            platform,
            dialog,
            store,
            injector,
            session,
            current: Mutex::new(None),
            listeners_installed: Latch::new(),
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Asks for permission and, only when granted, fetches, persists and
    /// forwards the token. A denial shows the settings dialog once per call
    /// and is not retried.
    pub async fn obtain_token(&self) -> HostResult<String> {
        let status = self.platform.request_permission().await?;
        LOGGER.info(format!("Notification permission status: {status}"));
        if !status.is_enabled() {
            LOGGER.warn("Notification permission denied");
            self.offer_settings().await;
            return Err(permission_blocked(format!(
                "Notification permission is {status}"
            )));
        }

        let token = self
            .platform
            .get_token()
            .await?
            .filter(|token| !token.is_empty())
            .ok_or_else(token_unavailable)?;
        self.accept_token(&token)?;

        if self.install_listeners() {
            self.forward_initial_notification().await;
        }
        Ok(token)
    }

    /// The token held in memory, else the persisted one.
    pub fn current_token(&self) -> Option<String> {
        if let Some(token) = self.current.lock().unwrap().clone() {
            return Some(token);
        }
        match self.store.read_token() {
            Ok(record) => record.map(|record| record.token),
            Err(err) => {
                LOGGER.warn(format!("Failed to read the persisted push token: {err}"));
                None
            }
        }
    }

    /// Sends the known token to the page again without touching the platform.
    pub fn forward_current(&self) -> HostResult<Option<String>> {
        let Some(token) = self.current_token() else {
            return Ok(None);
        };
        self.forward_token(&token)?;
        Ok(Some(token))
    }

    pub async fn delete_token(&self) -> HostResult<()> {
        self.platform.delete_token().await?;
        self.store.remove_token()?;
        *self.current.lock().unwrap() = None;
        LOGGER.info("Push token deleted");
        Ok(())
    }

    pub async fn subscribe_to_topic(&self, topic: &str) -> HostResult<()> {
        let topic = validate_topic(topic)?;
        self.platform.subscribe_to_topic(topic).await?;
        LOGGER.info(format!("Subscribed to topic \"{topic}\""));
        Ok(())
    }

    pub async fn unsubscribe_from_topic(&self, topic: &str) -> HostResult<()> {
        let topic = validate_topic(topic)?;
        self.platform.unsubscribe_from_topic(topic).await?;
        LOGGER.info(format!("Unsubscribed from topic \"{topic}\""));
        Ok(())
    }

    /// Hands a push message's data to the page.
    pub fn forward_message(&self, source: MessageSource, payload: &MessagePayload) {
        LOGGER.debug(format!(
            "Forwarding {} message {:?} to the page",
            source.as_str(),
            payload.message_id
        ));
        let callback = PageCallback::ReceiveFcmData {
            data: payload.data_value(),
        };
        if let Err(err) = self.injector.deliver(&callback) {
            LOGGER.warn(format!("Failed to forward {} message: {err}", source.as_str()));
        }
    }

    /// Drops every platform listener. Rotation is no longer followed afterwards.
    pub fn detach_listeners(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock().unwrap());
        for unsubscribe in subscriptions {
            unsubscribe();
        }
    }

    fn accept_token(&self, token: &str) -> HostResult<()> {
        self.store.write_token(&TokenRecord::new(token))?;
        *self.current.lock().unwrap() = Some(token.to_string());
        LOGGER.info(format!("Push token {} stored", redact(token)));
        self.forward_token(token)
    }

    fn forward_token(&self, token: &str) -> HostResult<()> {
        let callback = PageCallback::ReceiveFcmToken {
            token: token.to_string(),
            auth_token: self.session.credential().map(|credential| credential.into_string()),
        };
        self.injector.deliver(&callback)?;
        Ok(())
    }

    fn handle_refresh(&self, token: String) {
        if token.is_empty() {
            return;
        }
        if self.current.lock().unwrap().as_deref() == Some(token.as_str()) {
            LOGGER.debug("Platform re-issued the current push token, nothing to do");
            return;
        }
        LOGGER.info(format!("Push token rotated to {}", redact(&token)));
        if let Err(err) = self.accept_token(&token) {
            LOGGER.error(format!("Failed to apply rotated push token: {err}"));
        }
    }

    /// Installs the platform listeners on first call; returns whether it did.
    fn install_listeners(&self) -> bool {
        if !self.listeners_installed.try_latch() {
            return false;
        }

        let me = self.me.clone();
        let on_refresh: TokenHandler = Arc::new(move |token: String| {
            if let Some(manager) = me.upgrade() {
                manager.handle_refresh(token);
            }
        });

        let mut subscriptions = self.subscriptions.lock().unwrap();
        subscriptions.push(self.platform.on_token_refresh(on_refresh));
        subscriptions.push(
            self.platform
                .on_message(self.message_handler(MessageSource::Foreground)),
        );
        subscriptions.push(
            self.platform
                .on_notification_opened(self.message_handler(MessageSource::NotificationOpened)),
        );
        true
    }

    fn message_handler(&self, source: MessageSource) -> MessageHandler {
        let me = self.me.clone();
        Arc::new(move |payload: MessagePayload| {
            if let Some(manager) = me.upgrade() {
                manager.forward_message(source, &payload);
            }
        })
    }

    async fn forward_initial_notification(&self) {
        match self.platform.initial_notification().await {
            Ok(Some(payload)) => self.forward_message(MessageSource::InitialNotification, &payload),
            Ok(None) => {}
            Err(err) => LOGGER.warn(format!("Failed to read the launch notification: {err}")),
        }
    }

    async fn offer_settings(&self) {
        let prompt = DialogPrompt::new(
            SETTINGS_PROMPT_TITLE,
            SETTINGS_PROMPT_MESSAGE,
            SETTINGS_PROMPT_CONFIRM,
            SETTINGS_PROMPT_CANCEL,
        );
        if self.dialog.confirm(&prompt).await == DialogChoice::Confirm {
            self.dialog.open_settings();
        }
    }
}

impl Drop for TokenLifecycleManager {
    fn drop(&mut self) {
        self.detach_listeners();
    }
}

fn validate_topic(topic: &str) -> HostResult<&str> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(invalid_argument("Topic name must not be empty"));
    }
    Ok(topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingInjector;
    use crate::detection::CredentialToken;
    use crate::host::storage::MemoryHostStorage;
    use crate::host::types::AuthorizationStatus;
    use crate::test_support::{FakePushPlatform, ScriptedDialog};
    use serde_json::json;
    use std::collections::HashMap;

    struct Fixture {
        platform: Arc<FakePushPlatform>,
        dialog: Arc<ScriptedDialog>,
        injector: Arc<RecordingInjector>,
        session: Arc<HostSession>,
        manager: Arc<TokenLifecycleManager>,
    }

    fn fixture(status: AuthorizationStatus) -> Fixture {
        let platform = FakePushPlatform::new(status, ["push-1"]);
        let dialog = ScriptedDialog::new([]);
        let injector = RecordingInjector::new();
        let session = Arc::new(HostSession::new());
        let manager = TokenLifecycleManager::new(
            platform.clone(),
            dialog.clone(),
            TokenStore::new(Arc::new(MemoryHostStorage::new())),
            injector.clone(),
            session.clone(),
        );
        Fixture {
            platform,
            dialog,
            injector,
            session,
            manager,
        }
    }

    fn token_callback(token: &str, auth: Option<&str>) -> PageCallback {
        PageCallback::ReceiveFcmToken {
            token: token.into(),
            auth_token: auth.map(str::to_string),
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn granted_permission_persists_and_forwards() {
        let fx = fixture(AuthorizationStatus::Authorized);
        fx.session.remember(CredentialToken::new("cred").unwrap());

        let token = fx.manager.obtain_token().await.unwrap();
        assert_eq!(token, "push-1");
        assert_eq!(fx.manager.store().read_token().unwrap().unwrap().token, "push-1");
        assert_eq!(fx.injector.take(), [token_callback("push-1", Some("cred"))]);
        assert_eq!(fx.platform.refresh_listener_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn provisional_permission_is_enough() {
        let fx = fixture(AuthorizationStatus::Provisional);
        assert!(fx.manager.obtain_token().await.is_ok());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn denial_offers_settings_and_fetches_nothing() {
        let fx = fixture(AuthorizationStatus::Denied);
        fx.dialog.push_answer(DialogChoice::Confirm);

        let err = fx.manager.obtain_token().await.unwrap_err();
        assert_eq!(err.code_str(), "host/permission-blocked");
        assert_eq!(fx.platform.token_requests(), 0);
        assert_eq!(fx.dialog.prompts()[0].title, SETTINGS_PROMPT_TITLE);
        assert_eq!(fx.dialog.settings_opened(), 1);
        assert!(fx.injector.delivered().is_empty());
        assert!(fx.manager.current_token().is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_token_is_an_error() {
        let fx = fixture(AuthorizationStatus::Authorized);
        fx.platform.set_tokens(Vec::<String>::new());
        let err = fx.manager.obtain_token().await.unwrap_err();
        assert_eq!(err.code_str(), "host/token-unavailable");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rotation_is_persisted_and_forwarded_without_new_permission() {
        let fx = fixture(AuthorizationStatus::Authorized);
        fx.manager.obtain_token().await.unwrap();
        fx.injector.take();

        fx.platform.emit_refresh("push-2");

        assert_eq!(fx.platform.permission_requests(), 1);
        assert_eq!(fx.manager.current_token().as_deref(), Some("push-2"));
        assert_eq!(fx.manager.store().read_token().unwrap().unwrap().token, "push-2");
        assert_eq!(fx.injector.take(), [token_callback("push-2", None)]);

        // the same token again is not re-forwarded
        fx.platform.emit_refresh("push-2");
        assert!(fx.injector.delivered().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn listeners_are_installed_once() {
        let fx = fixture(AuthorizationStatus::Authorized);
        fx.platform.set_tokens(["push-1", "push-1"]);
        fx.manager.obtain_token().await.unwrap();
        fx.manager.obtain_token().await.unwrap();
        assert_eq!(fx.platform.refresh_listener_count(), 1);
        assert_eq!(fx.platform.message_listener_count(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn push_messages_reach_the_page() {
        let fx = fixture(AuthorizationStatus::Authorized);
        let launch = MessagePayload {
            data: Some(HashMap::from([("screen".to_string(), "inbox".to_string())])),
            ..Default::default()
        };
        fx.platform.set_initial_notification(Some(launch));

        fx.manager.obtain_token().await.unwrap();
        fx.platform.emit_message(MessagePayload {
            data: Some(HashMap::from([("orderId".to_string(), "7".to_string())])),
            ..Default::default()
        });
        fx.platform.emit_opened(MessagePayload::default());

        let data: Vec<_> = fx
            .injector
            .take()
            .into_iter()
            .filter_map(|callback| match callback {
                PageCallback::ReceiveFcmData { data } => Some(data),
                _ => None,
            })
            .collect();
        assert_eq!(
            data,
            [json!({"screen": "inbox"}), json!({"orderId": "7"}), json!(null)]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_token_clears_state() {
        let fx = fixture(AuthorizationStatus::Authorized);
        fx.manager.obtain_token().await.unwrap();
        fx.manager.delete_token().await.unwrap();
        assert_eq!(fx.platform.deleted(), 1);
        assert!(fx.manager.current_token().is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn topics_are_validated_and_routed() {
        let fx = fixture(AuthorizationStatus::Authorized);
        fx.manager.subscribe_to_topic(" news ").await.unwrap();
        fx.manager.unsubscribe_from_topic("news").await.unwrap();
        assert_eq!(fx.platform.topics(), ["+news", "-news"]);

        let err = fx.manager.subscribe_to_topic("  ").await.unwrap_err();
        assert_eq!(err.code_str(), "host/invalid-argument");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn dropping_the_manager_detaches_listeners() {
        let fx = fixture(AuthorizationStatus::Authorized);
        fx.manager.obtain_token().await.unwrap();
        let Fixture {
            platform, manager, ..
        } = fx;
        drop(manager);
        assert_eq!(platform.refresh_listener_count(), 0);
    }
}
