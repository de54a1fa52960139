use serde_json::Value;

/// Native-to-page calls, delivered by evaluating a snippet in the page.
#[derive(Clone, Debug, PartialEq)]
pub enum PageCallback {
    /// `window.receiveFCMToken(token, authToken)`
    ReceiveFcmToken {
        token: String,
        auth_token: Option<String>,
    },
    /// `window.receiveFCMData(data)`
    ReceiveFcmData { data: Value },
}

impl PageCallback {
    pub fn function_name(&self) -> &'static str {
        match self {
            PageCallback::ReceiveFcmToken { .. } => "receiveFCMToken",
            PageCallback::ReceiveFcmData { .. } => "receiveFCMData",
        }
    }

    fn arguments(&self) -> Vec<Value> {
        match self {
            PageCallback::ReceiveFcmToken { token, auth_token } => vec![
                Value::String(token.clone()),
                auth_token.clone().map(Value::String).unwrap_or(Value::Null),
            ],
            PageCallback::ReceiveFcmData { data } => vec![data.clone()],
        }
    }

    /// Renders the JavaScript that invokes the callback if the page defines it.
    ///
    /// The trailing `true;` keeps Android WebViews from complaining about a
    /// non-serializable evaluation result.
    pub fn to_script(&self) -> String {
        let name = self.function_name();
        let arguments = self
            .arguments()
            .iter()
            .map(js_literal)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "if (typeof window.{name} === 'function') {{ window.{name}({arguments}); }} true;"
        )
    }
}

/// JSON is valid JavaScript except for raw U+2028/U+2029 inside strings on
/// older engines.
pub(crate) fn js_literal(value: &Value) -> String {
    value
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
