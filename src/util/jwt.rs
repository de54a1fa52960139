use crate::util::base64::base64_url_decode;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedToken {
    pub header: Value,
    pub claims: Value,
    pub signature: String,
}

/// Returns `true` when the token has the `header.payload.signature` shape.
///
/// Nothing is verified; an empty segment disqualifies the token.
pub fn is_three_segment(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().all(|part| !part.is_empty())
}

/// Best-effort decoding of a signed token. Segments that fail to decode
/// produce empty objects instead of errors.
pub fn decode_jwt(token: &str) -> Option<DecodedToken> {
    if !is_three_segment(token) {
        return None;
    }
    let mut parts = token.split('.');
    let header = decode_part(parts.next().unwrap_or_default());
    let claims = decode_part(parts.next().unwrap_or_default());
    let signature = parts.next().unwrap_or_default().to_string();
    Some(DecodedToken {
        header,
        claims,
        signature,
    })
}

/// First string (or integer) claim found among `names`, in order.
pub fn string_claim(token: &str, names: &[&str]) -> Option<String> {
    let decoded = decode_jwt(token)?;
    let claims = decoded.claims.as_object()?;
    names.iter().find_map(|name| match claims.get(*name)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn decode_part(part: &str) -> Value {
    base64_url_decode(part)
        .ok()
        .and_then(|decoded| serde_json::from_str::<Value>(&decoded).ok())
        .filter(Value::is_object)
        .unwrap_or_else(|| Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::base64::base64_url_encode;
    use serde_json::json;

    fn build_token(claims: &Value) -> String {
        let header = base64_url_encode(&json!({"alg": "HS256"}).to_string());
        let claims = base64_url_encode(&claims.to_string());
        format!("{header}.{claims}.sig")
    }

    #[test]
    fn shape_check_requires_three_non_empty_segments() {
        assert!(is_three_segment("abc.def.ghi"));
        assert!(!is_three_segment("abc.def"));
        assert!(!is_three_segment("abc..ghi"));
        assert!(!is_three_segment("a.b.c.d"));
    }

    #[test]
    fn string_claim_prefers_listed_order() {
        let token = build_token(&json!({"userId": "u-1", "sub": "s-1"}));
        assert_eq!(string_claim(&token, &["sub", "userId"]).as_deref(), Some("s-1"));
        assert_eq!(string_claim(&token, &["id", "userId"]).as_deref(), Some("u-1"));
    }

    #[test]
    fn numeric_claims_are_stringified() {
        let token = build_token(&json!({"id": 42}));
        assert_eq!(string_claim(&token, &["sub", "id"]).as_deref(), Some("42"));
    }

    #[test]
    fn undecodable_segments_yield_empty_claims() {
        let decoded = decode_jwt("abc.def.ghi").unwrap();
        assert_eq!(decoded.claims, json!({}));
        assert_eq!(string_claim("abc.def.ghi", &["sub"]), None);
    }
}
