use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::Engine as _;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeBase64Error;

impl fmt::Display for DecodeBase64Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode base64 string")
    }
}

impl std::error::Error for DecodeBase64Error {}

/// Decode a base64url segment as used in signed tokens, returning UTF-8 text.
///
/// Padding is optional and standard-alphabet characters (`+`, `/`) are
/// accepted as well since some issuers emit them.
pub fn base64_url_decode(input: &str) -> Result<String, DecodeBase64Error> {
    let bytes = base64_url_decode_bytes(input)?;
    String::from_utf8(bytes).map_err(|_err| DecodeBase64Error)
}

pub fn base64_url_decode_bytes(input: &str) -> Result<Vec<u8>, DecodeBase64Error> {
    let normalized: String = input
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|_err| DecodeBase64Error)
}

#[cfg(test)]
pub(crate) fn base64_url_encode(input: &str) -> String {
    URL_SAFE_NO_PAD.encode(input.as_bytes())
}
