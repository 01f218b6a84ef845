// src/error.rs
//! Error type shared by every wallet component.

use thiserror::Error;

/// Errors surfaced to callers of the wallet engine.
///
/// Extraction errors (`UnsupportedFormat`, `MissingRequiredField`) are
/// user-correctable and meant to be shown next to the upload form.
/// Classification and scoring have no error path.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("credential not found: {0}")]
    NotFound(String),

    /// A store mutator refused the change; the previous record is kept.
    #[error("update rejected: {0}")]
    Rejected(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Settings parsed but would break scoring invariants.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WalletError {
    /// True for errors the user can fix by correcting the submission.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            WalletError::UnsupportedFormat(_) | WalletError::MissingRequiredField(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_errors_are_user_correctable() {
        assert!(WalletError::UnsupportedFormat("text/plain".into()).is_user_correctable());
        assert!(WalletError::MissingRequiredField("issuer").is_user_correctable());
        assert!(!WalletError::NotFound("cred-1".into()).is_user_correctable());
    }

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = WalletError::MissingRequiredField("name");
        assert_eq!(err.to_string(), "missing required field: name");
    }
}
