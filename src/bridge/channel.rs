use std::sync::{Arc, Mutex};

use crate::bridge::callback::PageCallback;
use crate::bridge::error::{channel_closed, injection_failed, BridgeResult};
use crate::bridge::message::BridgeMessage;

/// Creates the page-to-host half of the bridge.
///
/// Payloads travel as raw strings, exactly as a WebView `postMessage` hands
/// them over, and are parsed on the host side.
pub fn bridge_channel() -> (PageEndpoint, HostEndpoint) {
    let (tx, rx) = async_channel::unbounded();
    (PageEndpoint { tx }, HostEndpoint { rx })
}

#[derive(Clone, Debug)]
pub struct PageEndpoint {
    tx: async_channel::Sender<String>,
}

impl PageEndpoint {
    pub fn post_message(&self, message: &BridgeMessage) -> BridgeResult<()> {
        self.post_raw(message.to_json())
    }

    pub fn post_raw(&self, raw: impl Into<String>) -> BridgeResult<()> {
        self.tx.try_send(raw.into()).map_err(|_| channel_closed())
    }
}

#[derive(Clone, Debug)]
pub struct HostEndpoint {
    rx: async_channel::Receiver<String>,
}

impl HostEndpoint {
    /// Next raw payload, or `None` once every page endpoint is gone.
    pub async fn recv(&self) -> Option<String> {
        self.rx.recv().await.ok()
    }

    pub fn try_recv(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Host-to-page direction: delivers a callback into the page.
pub trait PageInjector: Send + Sync {
    fn deliver(&self, callback: &PageCallback) -> BridgeResult<()>;
}

type ScriptFn = dyn Fn(&str) -> Result<(), String> + Send + Sync + 'static;

/// Adapts a "evaluate this JavaScript" primitive, such as a WebView's
/// `injectJavaScript`, into a [`PageInjector`].
pub struct ScriptInjector {
    evaluate: Box<ScriptFn>,
}

impl ScriptInjector {
    pub fn new<F>(evaluate: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            evaluate: Box::new(evaluate),
        }
    }
}

impl std::fmt::Debug for ScriptInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInjector").finish_non_exhaustive()
    }
}

impl PageInjector for ScriptInjector {
    fn deliver(&self, callback: &PageCallback) -> BridgeResult<()> {
        (self.evaluate)(&callback.to_script()).map_err(|err| {
            injection_failed(format!("{} injection failed: {err}", callback.function_name()))
        })
    }
}

/// Keeps every delivered callback; useful when the page is driven by hand.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    delivered: Mutex<Vec<PageCallback>>,
}

impl RecordingInjector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delivered(&self) -> Vec<PageCallback> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<PageCallback> {
        std::mem::take(&mut *self.delivered.lock().unwrap())
    }
}

impl PageInjector for RecordingInjector {
    fn deliver(&self, callback: &PageCallback) -> BridgeResult<()> {
        self.delivered.lock().unwrap().push(callback.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::error::BridgeErrorCode;

    #[tokio::test(flavor = "current_thread")]
    async fn page_messages_reach_host_in_order() {
        let (page, host) = bridge_channel();
        page.post_message(&BridgeMessage::GetFcmToken).unwrap();
        page.post_raw("{\"type\":\"sendTokenToServer\"}").unwrap();
        assert_eq!(host.pending(), 2);

        assert_eq!(host.recv().await.as_deref(), Some(r#"{"type":"getFCMToken"}"#));
        assert_eq!(host.try_recv().as_deref(), Some(r#"{"type":"sendTokenToServer"}"#));
        assert_eq!(host.try_recv(), None);

        drop(page);
        assert_eq!(host.recv().await, None);
    }

    #[test]
    fn posting_after_host_is_gone_fails() {
        let (page, host) = bridge_channel();
        drop(host);
        let err = page.post_message(&BridgeMessage::GetFcmToken).unwrap_err();
        assert_eq!(err.code, BridgeErrorCode::ChannelClosed);
    }

    #[test]
    fn script_injector_reports_failures() {
        let ok = ScriptInjector::new(|script| {
            assert!(script.contains("receiveFCMData"));
            Ok(())
        });
        let callback = PageCallback::ReceiveFcmData {
            data: serde_json::json!({}),
        };
        ok.deliver(&callback).unwrap();

        let failing = ScriptInjector::new(|_| Err("webview detached".to_string()));
        let err = failing.deliver(&callback).unwrap_err();
        assert_eq!(err.code, BridgeErrorCode::InjectionFailed);
        assert!(err.message().contains("webview detached"));
    }
}
