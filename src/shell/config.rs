use std::fmt::{Display, Formatter};

use url::Url;

use crate::detection::DetectionSchedule;
use crate::host::RegistrationRoute;
use crate::logger::LogLevel;

pub const PAGE_URL_ENV: &str = "WEBVIEW_BRIDGE_PAGE_URL";
pub const REGISTRATION_URL_ENV: &str = "WEBVIEW_BRIDGE_REGISTRATION_URL";
pub const REGISTRATION_ROUTE_ENV: &str = "WEBVIEW_BRIDGE_REGISTRATION_ROUTE";
pub const PLATFORM_ENV: &str = "WEBVIEW_BRIDGE_PLATFORM";
pub const DEBUG_ENV: &str = "WEBVIEW_BRIDGE_DEBUG";
pub const LOG_LEVEL_ENV: &str = "WEBVIEW_BRIDGE_LOG_LEVEL";

pub const DEFAULT_PAGE_URL: &str = "https://kcell-service.vercel.app";
pub const DEFAULT_REGISTRATION_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    variable: &'static str,
    message: String,
}

impl ConfigError {
    fn new(variable: &'static str, message: impl Into<String>) -> Self {
        Self {
            variable,
            message: message.into(),
        }
    }

    pub fn variable(&self) -> &'static str {
        self.variable
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.variable, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellConfig {
    /// Page loaded into the web view.
    pub page_url: String,
    pub registration_base_url: String,
    pub registration_route: RegistrationRoute,
    /// Reported to the registration endpoint as `platform`.
    pub platform: String,
    /// Enables `testPushNotification`.
    pub debug: bool,
    pub log_level: LogLevel,
    pub schedule: DetectionSchedule,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            registration_base_url: DEFAULT_REGISTRATION_URL.to_string(),
            registration_route: RegistrationRoute::default(),
            platform: std::env::consts::OS.to_string(),
            debug: false,
            log_level: LogLevel::Info,
            schedule: DetectionSchedule::default(),
        }
    }
}

impl ShellConfig {
    /// Defaults overridden by the `WEBVIEW_BRIDGE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(PAGE_URL_ENV) {
            config.page_url = parse_url(PAGE_URL_ENV, &url)?;
        }
        if let Some(url) = get(REGISTRATION_URL_ENV) {
            config.registration_base_url = parse_url(REGISTRATION_URL_ENV, &url)?;
        }
        if let Some(route) = get(REGISTRATION_ROUTE_ENV) {
            config.registration_route = route
                .parse()
                .map_err(|err| ConfigError::new(REGISTRATION_ROUTE_ENV, format!("{err}")))?;
        }
        if let Some(platform) = get(PLATFORM_ENV) {
            config.platform = platform.trim().to_string();
        }
        if let Some(debug) = get(DEBUG_ENV) {
            config.debug = parse_bool(DEBUG_ENV, &debug)?;
        }
        if let Some(level) = get(LOG_LEVEL_ENV) {
            config.log_level = level
                .parse()
                .map_err(|err| ConfigError::new(LOG_LEVEL_ENV, format!("{err}")))?;
        }
        Ok(config)
    }

    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = url.into();
        self
    }

    pub fn with_registration_base_url(mut self, url: impl Into<String>) -> Self {
        self.registration_base_url = url.into();
        self
    }

    pub fn with_registration_route(mut self, route: RegistrationRoute) -> Self {
        self.registration_route = route;
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_schedule(mut self, schedule: DetectionSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

fn parse_url(variable: &'static str, value: &str) -> Result<String, ConfigError> {
    Url::parse(value.trim())
        .map(|_| value.trim().to_string())
        .map_err(|err| ConfigError::new(variable, format!("invalid URL \"{value}\": {err}")))
}

fn parse_bool(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::new(
            variable,
            format!("expected a boolean, got \"{other}\""),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ShellConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.page_url, DEFAULT_PAGE_URL);
        assert_eq!(config.registration_route, RegistrationRoute::Register);
        assert!(!config.debug);
    }

    #[test]
    fn environment_overrides() {
        let config = ShellConfig::from_lookup(lookup(&[
            (PAGE_URL_ENV, "https://app.example.com/login"),
            (REGISTRATION_URL_ENV, "https://push.example.com"),
            (REGISTRATION_ROUTE_ENV, "token"),
            (PLATFORM_ENV, "ios"),
            (DEBUG_ENV, "yes"),
            (LOG_LEVEL_ENV, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.page_url, "https://app.example.com/login");
        assert_eq!(config.registration_base_url, "https://push.example.com");
        assert_eq!(config.registration_route, RegistrationRoute::Token);
        assert_eq!(config.platform, "ios");
        assert!(config.debug);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = ShellConfig::from_lookup(lookup(&[(PLATFORM_ENV, "  ")])).unwrap();
        assert_eq!(config.platform, std::env::consts::OS);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        for (variable, value) in [
            (REGISTRATION_URL_ENV, "localhost 3000"),
            (REGISTRATION_ROUTE_ENV, "legacy"),
            (DEBUG_ENV, "maybe"),
            (LOG_LEVEL_ENV, "loud"),
        ] {
            let err = ShellConfig::from_lookup(lookup(&[(variable, value)])).unwrap_err();
            assert_eq!(err.variable(), variable);
        }
    }
}
