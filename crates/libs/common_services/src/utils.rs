use sha2::{Digest, Sha256};
use std::path::Path;

/// Generate a new opaque identifier for people and media.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Hex encoded SHA-256 of the given bytes.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Converts a relative path to an object key, using forward slashes.
#[must_use]
pub fn to_object_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Keeps at most `max_words` words of `text`, adding a full stop when the text was cut.
#[must_use]
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    let mut truncated = words[..max_words].join(" ");
    let trimmed_len = truncated.trim_end_matches([',', ';', ':', '-']).len();
    truncated.truncate(trimmed_len);
    if !truncated.ends_with(['.', '!', '?']) {
        truncated.push('.');
    }
    truncated
}

/// Logs a warning message with an 'ALERT:' prefix.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        tracing::warn!("ALERT: {}", format_args!($($arg)*));
    };
}
