use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

static GLOBAL_LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Named logger forwarding to the `log` facade.
///
/// The logger name becomes the record target, so a backend can filter on
/// `@webview-bridge/detection` and friends. Records below the global level set
/// through [`set_log_level`] are dropped before reaching the facade.
#[derive(Clone, Debug)]
pub struct Logger {
    name: &'static str,
}

impl Logger {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Silent && level >= log_level()
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Debug, message);
    }

    pub fn log(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Verbose, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Error, message);
    }

    fn emit(&self, level: LogLevel, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        if let Some(facade_level) = level.to_facade() {
            log::log!(target: self.name, facade_level, "{message}");
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Verbose = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Silent = 5,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Silent => "silent",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Verbose,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Silent,
        }
    }

    fn to_facade(self) -> Option<log::Level> {
        match self {
            LogLevel::Debug => Some(log::Level::Trace),
            LogLevel::Verbose => Some(log::Level::Debug),
            LogLevel::Info => Some(log::Level::Info),
            LogLevel::Warn => Some(log::Level::Warn),
            LogLevel::Error => Some(log::Level::Error),
            LogLevel::Silent => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "verbose" => Ok(LogLevel::Verbose),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "silent" | "off" => Ok(LogLevel::Silent),
            other => Err(LogError::InvalidLogLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    InvalidLogLevel(String),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::InvalidLogLevel(level) => {
                write!(f, "Invalid value \"{level}\" assigned to `log_level`")
            }
        }
    }
}

impl std::error::Error for LogError {}

pub fn log_level() -> LogLevel {
    LogLevel::from_u8(GLOBAL_LOG_LEVEL.load(Ordering::SeqCst))
}

pub fn set_log_level(level: LogLevel) {
    GLOBAL_LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Shortens a token for log output so full credentials never hit the logs.
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    if prefix.len() < token.len() {
        format!("{prefix}…")
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{LazyLock, Mutex};

    static TEST_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" off ".parse::<LogLevel>().unwrap(), LogLevel::Silent);
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(LogError::InvalidLogLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn global_level_filters_loggers() {
        let _guard = TEST_GUARD.lock().unwrap();
        let logger = Logger::new("@webview-bridge/logger-test");

        set_log_level(LogLevel::Warn);
        assert!(!logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Error));

        set_log_level(LogLevel::Silent);
        assert!(!logger.enabled(LogLevel::Error));
        assert!(!logger.enabled(LogLevel::Silent));

        set_log_level(LogLevel::Info);
    }

    #[test]
    fn redact_keeps_short_prefix() {
        assert_eq!(redact("abc"), "abc");
        assert_eq!(redact("abcdefghijkl"), "abcdefgh…");
    }
}
