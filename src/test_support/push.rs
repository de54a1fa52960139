use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::host::{
    AuthorizationStatus, HostResult, MessageHandler, MessagePayload, PushPlatform, TokenHandler,
    Unsubscribe,
};

type Listeners<H> = Arc<Mutex<Vec<(usize, H)>>>;

/// Scripted push platform. Tokens are handed out in order; an exhausted
/// queue yields no token.
pub struct FakePushPlatform {
    status: Mutex<AuthorizationStatus>,
    tokens: Mutex<VecDeque<String>>,
    initial: Mutex<Option<MessagePayload>>,
    topics: Mutex<Vec<String>>,
    refresh: Listeners<TokenHandler>,
    messages: Listeners<MessageHandler>,
    opened: Listeners<MessageHandler>,
    next_id: AtomicUsize,
    permission_requests: AtomicUsize,
    token_requests: AtomicUsize,
    deleted: AtomicUsize,
}

impl FakePushPlatform {
    pub fn new<I, S>(status: AuthorizationStatus, tokens: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            status: Mutex::new(status),
            tokens: Mutex::new(tokens.into_iter().map(Into::into).collect()),
            initial: Mutex::new(None),
            topics: Mutex::new(Vec::new()),
            refresh: Arc::default(),
            messages: Arc::default(),
            opened: Arc::default(),
            next_id: AtomicUsize::new(0),
            permission_requests: AtomicUsize::new(0),
            token_requests: AtomicUsize::new(0),
            deleted: AtomicUsize::new(0),
        })
    }

    pub fn set_tokens<I, S>(&self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.tokens.lock().unwrap() = tokens.into_iter().map(Into::into).collect();
    }

    pub fn set_initial_notification(&self, payload: Option<MessagePayload>) {
        *self.initial.lock().unwrap() = payload;
    }

    pub fn emit_refresh(&self, token: &str) {
        for handler in snapshot(&self.refresh) {
            handler(token.to_string());
        }
    }

    pub fn emit_message(&self, payload: MessagePayload) {
        for handler in snapshot(&self.messages) {
            handler(payload.clone());
        }
    }

    pub fn emit_opened(&self, payload: MessagePayload) {
        for handler in snapshot(&self.opened) {
            handler(payload.clone());
        }
    }

    pub fn refresh_listener_count(&self) -> usize {
        self.refresh.lock().unwrap().len()
    }

    /// Foreground plus notification-opened listeners.
    pub fn message_listener_count(&self) -> usize {
        self.messages.lock().unwrap().len() + self.opened.lock().unwrap().len()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> usize {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Topic calls in order, `+topic` for subscribe and `-topic` for unsubscribe.
    pub fn topics(&self) -> Vec<String> {
        self.topics.lock().unwrap().clone()
    }

    fn listen<H: Send + 'static>(&self, listeners: &Listeners<H>, handler: H) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        listeners.lock().unwrap().push((id, handler));
        let listeners = Arc::clone(listeners);
        Box::new(move || {
            listeners.lock().unwrap().retain(|(other, _)| *other != id);
        })
    }
}

fn snapshot<H: Clone>(listeners: &Listeners<H>) -> Vec<H> {
    listeners
        .lock()
        .unwrap()
        .iter()
        .map(|(_, handler)| handler.clone())
        .collect()
}

#[async_trait]
impl PushPlatform for FakePushPlatform {
    async fn request_permission(&self) -> HostResult<AuthorizationStatus> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        Ok(*self.status.lock().unwrap())
    }

    async fn get_token(&self) -> HostResult<Option<String>> {
        self.token_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.tokens.lock().unwrap().pop_front())
    }

    async fn delete_token(&self) -> HostResult<()> {
        self.deleted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe_to_topic(&self, topic: &str) -> HostResult<()> {
        self.topics.lock().unwrap().push(format!("+{topic}"));
        Ok(())
    }

    async fn unsubscribe_from_topic(&self, topic: &str) -> HostResult<()> {
        self.topics.lock().unwrap().push(format!("-{topic}"));
        Ok(())
    }

    fn on_token_refresh(&self, handler: TokenHandler) -> Unsubscribe {
        self.listen(&self.refresh, handler)
    }

    fn on_message(&self, handler: MessageHandler) -> Unsubscribe {
        self.listen(&self.messages, handler)
    }

    fn on_notification_opened(&self, handler: MessageHandler) -> Unsubscribe {
        self.listen(&self.opened, handler)
    }

    async fn initial_notification(&self) -> HostResult<Option<MessagePayload>> {
        Ok(self.initial.lock().unwrap().take())
    }
}
