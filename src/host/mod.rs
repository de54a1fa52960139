//! Native side of the bridge.
//!
//! The [`HostDispatcher`] receives page messages and routes them: a login
//! report opens the one-time [`PermissionFlow`], which hands over to the
//! [`TokenLifecycleManager`] for the push token. Paired tokens go to the
//! application server through the [`RegistrationClient`].

mod constants;
mod dispatcher;
pub mod error;
mod permission;
mod platform;
mod registration;
mod session;
mod storage;
mod token_manager;
mod token_store;
mod types;

use crate::logger::Logger;

pub(crate) static LOGGER: Logger = Logger::new("@webview-bridge/host");

pub use constants::{
    DEFAULT_STORAGE_DIR, DEVICE_ID_STORAGE_KEY, FCM_TOKEN_STORAGE_KEY, STORAGE_DIR_ENV,
};
pub use dispatcher::{DispatchOutcome, HostDispatcher};
pub use error::{HostError, HostErrorCode, HostResult};
pub use permission::{PermissionFlow, PermissionOutcome};
pub use platform::{PushPlatform, UserDialog};
pub use registration::{RegistrationClient, RegistrationRequest, RegistrationRoute};
pub use session::HostSession;
pub use storage::{FileHostStorage, HostStorage, MemoryHostStorage};
pub use token_manager::TokenLifecycleManager;
pub use token_store::{generate_device_id, TokenRecord, TokenStore};
pub use types::{
    AuthorizationStatus, DialogChoice, DialogPrompt, MessageHandler, MessagePayload, MessageSource,
    NotificationPayload, TokenHandler, Unsubscribe,
};
