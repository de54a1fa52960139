/// Host storage key holding the persisted [`TokenRecord`](super::TokenRecord).
pub const FCM_TOKEN_STORAGE_KEY: &str = "fcm_token";
pub const DEVICE_ID_STORAGE_KEY: &str = "device_id";

pub const STORAGE_DIR_ENV: &str = "WEBVIEW_BRIDGE_STORAGE_DIR";
pub const DEFAULT_STORAGE_DIR: &str = ".webview-bridge";

pub const DEVICE_ID_PREFIX: &str = "device_";
pub const DEVICE_ID_SUFFIX_LEN: usize = 9;

pub(crate) const REGISTER_PATH: [&str; 3] = ["api", "fcm", "register"];
pub(crate) const TOKEN_PATH: [&str; 3] = ["api", "fcm", "token"];

pub(crate) const PERMISSION_PROMPT_TITLE: &str = "Enable notifications";
pub(crate) const PERMISSION_PROMPT_MESSAGE: &str =
    "Allow notifications to hear about account activity and important updates.";
pub(crate) const PERMISSION_PROMPT_CONFIRM: &str = "Allow";
pub(crate) const PERMISSION_PROMPT_CANCEL: &str = "Not now";

pub(crate) const SETTINGS_PROMPT_TITLE: &str = "Notifications disabled";
pub(crate) const SETTINGS_PROMPT_MESSAGE: &str =
    "To receive important notifications, turn on notification permission in the app settings.";
pub(crate) const SETTINGS_PROMPT_CONFIRM: &str = "Settings";
pub(crate) const SETTINGS_PROMPT_CANCEL: &str = "Later";

pub(crate) const TEST_NOTIFICATION_TITLE: &str = "Test notification";
pub(crate) const TEST_NOTIFICATION_BODY: &str = "Push delivery to the page is working.";
