//! Username normalisation.
//!
//! ## Summary
//! Usernames are the unique key of a credential record. They are compared in
//! normalised form (trimmed, ASCII-lowercased) so `Alice` and ` alice ` name the
//! same account and can never be registered twice.

use crate::constants::USERNAME_MAX_LENGTH;
use crate::error::{CoreError, CoreResult};

/// Normalise a username for lookup and storage.
///
/// Allowed characters after lowercasing: `a-z`, `0-9`, `.`, `_`, `-`, `@`.
///
/// Examples:
/// - "Alice" -> "alice"
/// - "  j.doe@corp  " -> "j.doe@corp"
///
/// ## Errors
/// Returns `ValidationError` for empty, overlong or disallowed input.
pub fn normalize_username(raw: &str) -> CoreResult<String> {
    let username = raw.trim().to_ascii_lowercase();

    if username.is_empty() {
        return Err(CoreError::ValidationError(
            "username must not be empty".to_string(),
        ));
    }
    if username.len() > USERNAME_MAX_LENGTH {
        return Err(CoreError::ValidationError(format!(
            "username exceeds {USERNAME_MAX_LENGTH} characters"
        )));
    }
    if let Some(bad) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@')))
    {
        return Err(CoreError::ValidationError(format!(
            "username contains disallowed character {bad:?}"
        )));
    }

    Ok(username)
}
