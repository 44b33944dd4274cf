//! Error taxonomy for loading, building and querying a keyword registry.
//!
//! Two families live here:
//!
//! - **Configuration defects**: the declarative source is unreadable or
//!   malformed, or the records break a registry invariant. These must be fixed
//!   at the source; nothing in the crate retries them.
//! - **Caller outcomes**: an empty query, an unknown policy string, or a query
//!   that does not resolve under a policy that forbids that. `UnapprovedKeyword`
//!   in particular is an expected result ("ask the user to clarify").

use crate::Tier;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeywordError>;

#[derive(Debug, Error)]
pub enum KeywordError {
    /// A query or phrase was empty after normalization.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A single declarative record is malformed.
    #[error("invalid keyword entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// The declarative source as a whole cannot produce a registry.
    #[error("invalid keyword registry: {reason}")]
    InvalidRegistry { reason: String },

    #[error(
        "phrase '{phrase}' for '{canonical_id}' already registered as {tier} phrase by '{existing_id}' as '{existing_phrase}'"
    )]
    DuplicatePhrase {
        canonical_id: String,
        phrase: String,
        tier: Tier,
        existing_id: String,
        existing_phrase: String,
    },

    #[error("duplicated keyword id '{0}'")]
    DuplicateId(String),

    #[error("unsupported parser policy '{0}' (expected STRICT or LENIENT)")]
    UnsupportedPolicy(String),

    #[error("unapproved keyword detected: {0:?}")]
    UnapprovedKeyword(String),

    #[error("failed to read keyword source {path:?}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keyword source {path:?}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl KeywordError {
    /// True for errors that point at a broken deployment rather than at the caller.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::InvalidEntry { .. }
                | Self::InvalidRegistry { .. }
                | Self::DuplicatePhrase { .. }
                | Self::DuplicateId(_)
                | Self::Source { .. }
                | Self::Syntax { .. }
        )
    }
}
