//! Push-notification bridge between a native shell and an embedded web page.
//!
//! The page side watches the page's storage for a session credential
//! ([`detection`]), reports the login over the [`bridge`], and the native side
//! ([`host`]) asks for notification permission once, obtains the push token,
//! follows its rotation and registers it with the application server.
//! [`shell::Shell`] wires both halves together.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use webview_push_bridge::host::{PushPlatform, UserDialog};
//! # use webview_push_bridge::shell::{Shell, ShellConfig};
//! # async fn start(platform: Arc<dyn PushPlatform>, dialog: Arc<dyn UserDialog>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ShellConfig::from_env()?;
//! let shell = Shell::builder(config, platform, dialog).build()?;
//! let _script = shell.injected_javascript();
//! shell.page_loaded();
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod detection;
pub mod host;
pub mod logger;
pub mod shell;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;
