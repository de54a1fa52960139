pub mod base64;
pub mod jwt;
pub mod runtime;

pub use base64::{base64_url_decode, DecodeBase64Error};
pub use jwt::{decode_jwt, is_three_segment, string_claim, DecodedToken};
pub use runtime::{current_timestamp_ms, sleep, spawn_detached};
