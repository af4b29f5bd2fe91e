//! Error types for credential verification.
//!
//! Authentication has three outcomes and only two of them are errors:
//!
//! 1. **Invalid input**: the proof is malformed (wrong kind, missing
//!    identifier or password). Raised before any collaborator is called.
//!
//! 2. **Collaborator failure**: a lookup, token validation or user resolution
//!    call failed. The collaborator's error is carried unchanged.
//!
//! 3. **No match** is *not* an error. It is `Ok(None)`.

use thiserror::Error;

use crate::types::User;

/// Boxed error returned by collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a single `authenticate` call.
///
/// * `Ok(Some(user))` - the proof identifies `user`
/// * `Ok(None)` - no account matches the proof
/// * `Err(_)` - the proof was malformed or a collaborator failed
pub type AuthResult = Result<Option<User>, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The proof handed to a strategy does not have the required shape.
    #[error("{strategy}: {reason}")]
    InvalidInput {
        strategy: &'static str,
        reason: String,
    },

    /// A collaborator failed; the inner error is passed through untouched.
    #[error(transparent)]
    Collaborator(#[from] BoxError),
}

impl AuthError {
    pub(crate) fn invalid_input(strategy: &'static str, reason: impl Into<String>) -> Self {
        AuthError::InvalidInput {
            strategy,
            reason: reason.into(),
        }
    }

    /// Whether the failure was a rejected proof rather than a backend error.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AuthError::InvalidInput { .. })
    }
}

/// Errors raised by the bundled in-memory collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("token scope has no {0}")]
    MissingScope(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
