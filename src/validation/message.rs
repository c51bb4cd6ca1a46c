use crate::error::{AppError, Result};

/// The longest message body accepted, in characters.
pub const MAX_CONTENT_CHARS: usize = 4096;

/// Rejects blank or oversized message bodies.
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Message content cannot be empty".to_string()));
    }

    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Message content must be at most {} characters",
            MAX_CONTENT_CHARS
        )));
    }

    Ok(())
}

/// Rejects an empty recipient name before it reaches the store.
pub fn validate_recipient(recipient: &str) -> Result<()> {
    if recipient.trim().is_empty() {
        return Err(AppError::Validation("Recipient cannot be empty".to_string()));
    }
    Ok(())
}
