//! Phrase normalization.
//!
//! Every registered phrase and every incoming query goes through
//! [`normalize_phrase`]; there is no other normalization in the crate.

use crate::error::{KeywordError, Result};

/// Trim, lowercase and collapse internal whitespace runs to single spaces.
///
/// Fails with [`KeywordError::InvalidInput`] when nothing but whitespace is left.
pub fn normalize_phrase(value: &str) -> Result<String> {
    let lowered = value.to_lowercase();
    let normalized = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(KeywordError::InvalidInput("phrase or query is empty after normalization".to_string()));
    }
    Ok(normalized)
}
