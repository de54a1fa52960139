use crate::bridge::callback::js_literal;
use serde_json::Value;

/// Page globals that post a message without arguments, as `(global, type)`.
const SIMPLE_GLOBALS: &[(&str, &str)] = &[
    ("getFCMToken", "getFCMToken"),
    ("sendTokenToServer", "sendTokenToServer"),
    ("initializePushNotifications", "initializePushNotifications"),
];

/// Page globals taking a topic name, as `(global, type)`.
const TOPIC_GLOBALS: &[(&str, &str)] = &[
    ("subscribeToNotifications", "subscribeToTopic"),
    ("unsubscribeFromNotifications", "unsubscribeFromTopic"),
];

/// Storage lookups performed by the injected `getAuthToken()`, mirroring the
/// native probe order. Only non-blank strings count as a credential.
const AUTH_TOKEN_LOOKUP: &str = r#"
  function credential(value) {
    return typeof value === 'string' && value.trim() !== '' ? value : null;
  }
  function readEnvelope(raw) {
    try {
      var parsed = JSON.parse(raw);
      if (!parsed || typeof parsed !== 'object') { return null; }
      return credential(parsed.state && parsed.state.token) || credential(parsed.token);
    } catch (e) {
      return null;
    }
  }
  window.getAuthToken = function () {
    var wrapped = localStorage.getItem('auth-storage');
    return (wrapped ? readEnvelope(wrapped) : null)
      || credential(localStorage.getItem('token'))
      || credential(localStorage.getItem('authToken'))
      || credential(localStorage.getItem('accessToken'))
      || credential(sessionStorage.getItem('session-token'));
  };
  function postPairing(fcmToken, authToken) {
    post({
      type: 'authAndFCMTokens',
      authToken: authToken,
      fcmToken: fcmToken,
      success: !!authToken,
      error: authToken ? undefined : 'No auth token found in page storage'
    });
  }
  window.sendAuthAndFCMTokens = function (fcmToken) {
    postPairing(fcmToken, window.getAuthToken());
  };
  window.checkTokenAfterLogin = function () {
    var authToken = window.getAuthToken();
    if (authToken && !window.__pushBridgeLoginDetected) {
      window.__pushBridgeLoginDetected = true;
      post({ type: 'userLoggedIn', authToken: authToken, success: true });
    }
    return authToken;
  };
"#;

/// Native-to-page callbacks. `receiveFCMToken` mirrors the push token into
/// `fcmToken` and answers with the pairing; `receiveFCMData` hands the payload
/// to `window.onFCMData` when the page sets one.
const PAGE_CALLBACKS: &str = r#"
  window.receiveFCMToken = function (token, authToken) {
    try {
      localStorage.setItem('fcmToken', token);
    } catch (e) {}
    postPairing(token, credential(authToken) || window.getAuthToken());
  };
  window.receiveFCMData = function (data) {
    if (typeof window.onFCMData === 'function') {
      window.onFCMData(data);
    }
  };
"#;

/// Set once the injected `checkTokenAfterLogin()` has reported a login.
pub const LOGIN_DETECTED_FLAG: &str = "__pushBridgeLoginDetected";

/// JavaScript injected before the page loads.
///
/// It defines the globals the page may call (`getFCMToken()`,
/// `subscribeToNotifications(topic)`, `getAuthToken()`, ...) on top of
/// `window.ReactNativeWebView.postMessage`, plus the `receiveFCMToken` and
/// `receiveFCMData` callbacks the host invokes.
pub fn bootstrap_script() -> String {
    let mut script = String::from(
        "(function () {\n  if (window.__pushBridgeInstalled) { return; }\n  window.__pushBridgeInstalled = true;\n  function post(message) {\n    if (window.ReactNativeWebView && window.ReactNativeWebView.postMessage) {\n      window.ReactNativeWebView.postMessage(JSON.stringify(message));\n    }\n  }\n",
    );

    for (global, kind) in SIMPLE_GLOBALS {
        let kind = js_literal(&Value::String((*kind).to_string()));
        script.push_str(&format!(
            "  window.{global} = function () {{ post({{ type: {kind} }}); }};\n"
        ));
    }
    for (global, kind) in TOPIC_GLOBALS {
        let kind = js_literal(&Value::String((*kind).to_string()));
        script.push_str(&format!(
            "  window.{global} = function (topic) {{ post({{ type: {kind}, topic: String(topic) }}); }};\n"
        ));
    }
    script.push_str(AUTH_TOKEN_LOOKUP);
    script.push_str(PAGE_CALLBACKS);
    script.push_str("})();\ntrue;\n");
    script
}

/// Every global the bootstrap script defines.
pub fn injected_globals() -> Vec<&'static str> {
    SIMPLE_GLOBALS
        .iter()
        .chain(TOPIC_GLOBALS)
        .map(|(global, _)| *global)
        .chain(["getAuthToken", "sendAuthAndFCMTokens", "checkTokenAfterLogin"])
        .chain(["receiveFCMToken", "receiveFCMData"])
        .collect()
}
