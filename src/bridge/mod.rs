//! The message pipe between the embedded page and the host shell.
//!
//! Page to host: JSON payloads discriminated by `type` ([`BridgeMessage`]),
//! carried as raw strings over [`bridge_channel`]. Host to page: callbacks
//! ([`PageCallback`]) delivered through a [`PageInjector`], normally by
//! evaluating a rendered script in the page.

mod callback;
mod channel;
pub mod error;
mod message;
mod page_api;
mod script;

use crate::logger::Logger;

pub(crate) static LOGGER: Logger = Logger::new("@webview-bridge/bridge");

pub use callback::PageCallback;
pub use channel::{
    bridge_channel, HostEndpoint, PageEndpoint, PageInjector, RecordingInjector, ScriptInjector,
};
pub use message::{BridgeMessage, MESSAGE_KINDS};
pub use page_api::{report_login_listener, LoopbackInjector, PageApi, PageDataHandler, PAGE_FCM_TOKEN_KEY};
pub use script::{bootstrap_script, injected_globals, LOGIN_DETECTED_FLAG};
