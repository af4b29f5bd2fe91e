//! Authentication strategy trait definitions.
//!
//! Defines the interface for authentication strategies, enabling the
//! Strategy pattern for the different kinds of proof a caller may hold.

use async_trait::async_trait;

use crate::error::AuthResult;

use super::proof::{Credentials, Proof};

/// Trait for authentication strategies.
///
/// Implementations must be thread-safe (`Send + Sync`) for use across
/// async tasks. Each strategy accepts one kind of proof; handing it any
/// other kind is an invalid-input error.
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    /// Resolve a proof to the user it identifies.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(user))` - The proof identifies `user`
    /// * `Ok(None)` - No account matches (wrong password, invalid token, ...)
    /// * `Err(error)` - Malformed proof or collaborator failure
    async fn authenticate(&self, proof: Proof) -> AuthResult;

    /// Get the name of this strategy.
    ///
    /// Used for logging and error messages.
    fn name(&self) -> &'static str;
}

/// Capability to match already-prepared credentials against stored users.
///
/// Strategies that only change how a proof arrives (such as form posts)
/// compose with a matcher instead of re-implementing the lookup.
#[async_trait]
pub trait CredentialMatcher: Send + Sync {
    async fn match_credentials(&self, credentials: Credentials) -> AuthResult;
}
