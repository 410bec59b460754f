//! Project-specific utilities live here.

/// Formats a shared log prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("libris::{module}")
}

/// Whether `value` reads as a person's full name: letters and spaces, allowing
/// apostrophes, hyphens, and periods inside names like "O'Neil" or "J. R.".
pub fn is_full_name(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed.chars().any(char::is_alphabetic)
        && trimmed
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, ' ' | '\'' | '-' | '.'))
}
