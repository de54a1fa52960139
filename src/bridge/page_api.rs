use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;

use crate::bridge::callback::PageCallback;
use crate::bridge::channel::{PageEndpoint, PageInjector};
use crate::bridge::error::{injection_failed, BridgeResult};
use crate::bridge::message::BridgeMessage;
use crate::bridge::LOGGER;
use crate::detection::{CredentialToken, DetectionListener, DetectionOutcome, Detector};

/// Page storage key mirroring the host's push token.
pub const PAGE_FCM_TOKEN_KEY: &str = "fcmToken";

pub type PageDataHandler = Arc<dyn Fn(&Value) + Send + Sync + 'static>;

/// The page side of the bridge: what the injected globals do, expressed natively.
pub struct PageApi {
    endpoint: PageEndpoint,
    detector: Arc<Detector>,
    data_handler: Mutex<Option<PageDataHandler>>,
}

impl std::fmt::Debug for PageApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageApi")
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

/// Detection listener that reports the login to the host.
pub fn report_login_listener(endpoint: PageEndpoint) -> DetectionListener {
    Arc::new(move |credential: &CredentialToken| {
        if let Err(err) = endpoint.post_message(&BridgeMessage::user_logged_in(credential)) {
            LOGGER.warn(format!("Failed to report login to the host: {err}"));
        }
    })
}

impl PageApi {
    pub fn new(endpoint: PageEndpoint, detector: Arc<Detector>) -> Self {
        Self {
            endpoint,
            detector,
            data_handler: Mutex::new(None),
        }
    }

    pub fn detector(&self) -> &Arc<Detector> {
        &self.detector
    }

    /// `getFCMToken()`
    pub fn get_fcm_token(&self) -> BridgeResult<()> {
        self.endpoint.post_message(&BridgeMessage::GetFcmToken)
    }

    /// `subscribeToNotifications(topic)`
    pub fn subscribe_to_notifications(&self, topic: &str) -> BridgeResult<()> {
        self.endpoint.post_message(&BridgeMessage::SubscribeToTopic {
            topic: topic.to_string(),
        })
    }

    /// `unsubscribeFromNotifications(topic)`
    pub fn unsubscribe_from_notifications(&self, topic: &str) -> BridgeResult<()> {
        self.endpoint.post_message(&BridgeMessage::UnsubscribeFromTopic {
            topic: topic.to_string(),
        })
    }

    /// `sendTokenToServer()`
    pub fn send_token_to_server(&self) -> BridgeResult<()> {
        self.endpoint.post_message(&BridgeMessage::SendTokenToServer)
    }

    /// `getAuthToken()`: reads storage without touching the login latch.
    pub fn get_auth_token(&self) -> Option<CredentialToken> {
        self.detector.peek()
    }

    /// `sendAuthAndFCMTokens(fcmToken)`
    pub fn send_auth_and_fcm_tokens(&self, fcm_token: &str) -> BridgeResult<()> {
        let credential = self.get_auth_token();
        self.endpoint
            .post_message(&BridgeMessage::auth_and_fcm_tokens(fcm_token, credential.as_ref()))
    }

    /// `initializePushNotifications()`
    pub fn initialize_push_notifications(&self) -> BridgeResult<()> {
        self.endpoint
            .post_message(&BridgeMessage::InitializePushNotifications)
    }

    /// `checkTokenAfterLogin()`: one manual detection attempt.
    pub fn check_token_after_login(&self) -> DetectionOutcome {
        self.detector.attempt("check-token-after-login")
    }

    /// `receiveFCMToken(token, authToken)`
    ///
    /// Mirrors the token into page storage and answers with the token paired
    /// with a credential: the one passed in, else whatever storage holds.
    pub fn receive_fcm_token(&self, token: &str, auth_token: Option<&str>) -> BridgeResult<()> {
        self.detector
            .page()
            .local_storage()
            .set_item(PAGE_FCM_TOKEN_KEY, token);
        let credential = auth_token
            .and_then(CredentialToken::new)
            .or_else(|| self.get_auth_token());
        self.endpoint
            .post_message(&BridgeMessage::auth_and_fcm_tokens(token, credential.as_ref()))
    }

    /// `receiveFCMData(data)`
    pub fn receive_fcm_data(&self, data: &Value) {
        let handler = self.data_handler.lock().unwrap().clone();
        match handler {
            Some(handler) => handler(data),
            None => LOGGER.debug("Push data received but the page registered no handler"),
        }
    }

    pub fn set_data_handler(&self, handler: Option<PageDataHandler>) {
        *self.data_handler.lock().unwrap() = handler;
    }

    pub fn handle_callback(&self, callback: &PageCallback) -> BridgeResult<()> {
        match callback {
            PageCallback::ReceiveFcmToken { token, auth_token } => {
                self.receive_fcm_token(token, auth_token.as_deref())
            }
            PageCallback::ReceiveFcmData { data } => {
                self.receive_fcm_data(data);
                Ok(())
            }
        }
    }
}

/// Delivers host callbacks straight into an in-process [`PageApi`].
#[derive(Debug)]
pub struct LoopbackInjector {
    page: Weak<PageApi>,
}

impl LoopbackInjector {
    pub fn new(page: &Arc<PageApi>) -> Self {
        Self {
            page: Arc::downgrade(page),
        }
    }
}

impl PageInjector for LoopbackInjector {
    fn deliver(&self, callback: &PageCallback) -> BridgeResult<()> {
        let page = self
            .page
            .upgrade()
            .ok_or_else(|| injection_failed("The page has been torn down"))?;
        page.handle_callback(callback)
    }
}
