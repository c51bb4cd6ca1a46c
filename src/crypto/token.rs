use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;

/// The size of a session token in bytes.
const SESSION_TOKEN_SIZE: usize = 32;

/// The scheme clients put in front of the token.
pub const BEARER_SCHEME: &str = "Bearer";

/// Generates a new random session token.
///
/// # Returns
///
/// A URL-safe base64-encoded token.
pub fn generate_session_token() -> String {
    let mut token = [0u8; SESSION_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Removes an optional `Bearer ` prefix and surrounding whitespace.
pub fn strip_bearer(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(BEARER_SCHEME) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => trimmed,
    }
}
