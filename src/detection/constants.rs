use std::time::Duration;

pub const AUTH_STORAGE_KEY: &str = "auth-storage";
pub const TOKEN_KEY: &str = "token";
pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const SESSION_TOKEN_KEY: &str = "session-token";

/// Field paths tried, in order, inside the `auth-storage` JSON envelope.
pub const AUTH_STORAGE_TOKEN_PATHS: &[&[&str]] = &[&["state", "token"], &["token"]];

pub const ONE_SHOT_OFFSETS: [Duration; 5] = [
    Duration::from_secs(3),
    Duration::from_secs(5),
    Duration::from_secs(8),
    Duration::from_secs(12),
    Duration::from_secs(15),
];
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const POLL_WINDOW: Duration = Duration::from_secs(60);
pub const MUTATION_DEBOUNCE: Duration = Duration::from_millis(100);
pub const ENTER_KEY_DELAY: Duration = Duration::from_millis(1_000);
pub const CLICK_DELAY: Duration = Duration::from_millis(1_500);
pub const CREDENTIAL_FOCUS_DELAY: Duration = Duration::from_millis(500);
pub const LOCATION_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const LOCATION_CHANGE_DELAY: Duration = Duration::from_millis(1_000);

pub const ENTER_KEY: &str = "Enter";
pub const CREDENTIAL_INPUT_TYPES: &[&str] = &["password", "email"];
