//! Top-level wiring: configuration and the [`Shell`] that owns both sides.

mod api;
mod config;

use crate::logger::Logger;

pub(crate) static LOGGER: Logger = Logger::new("@webview-bridge/shell");

pub use api::{Shell, ShellBuilder};
pub use config::{
    ConfigError, ShellConfig, DEBUG_ENV, DEFAULT_PAGE_URL, DEFAULT_REGISTRATION_URL, LOG_LEVEL_ENV,
    PAGE_URL_ENV, PLATFORM_ENV, REGISTRATION_ROUTE_ENV, REGISTRATION_URL_ENV,
};
