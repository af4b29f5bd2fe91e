//! Bearer token authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::storage::{TokenValidator, UserResolver};

use super::proof::Proof;
use super::traits::AuthenticationStrategy;

/// Token authentication strategy.
///
/// Validates the token with the token service and, if it vouches for a
/// user, loads that user. Tenant and user scoping is a property of the two
/// collaborators, configured once at construction.
pub struct TokenAuthentication {
    tokens: Arc<dyn TokenValidator>,
    users: Arc<dyn UserResolver>,
}

impl TokenAuthentication {
    pub const NAME: &'static str = "token";

    pub fn new(tokens: Arc<dyn TokenValidator>, users: Arc<dyn UserResolver>) -> Self {
        Self { tokens, users }
    }

    /// Resolve a token to its user.
    ///
    /// Invalid, expired or user-less tokens are `Ok(None)`; only collaborator
    /// failures are errors.
    pub async fn authenticate_token(&self, token: &str) -> AuthResult {
        let validation = self.tokens.validate_user_token(token).await?;

        let Some(user_id) = validation.authenticated_user() else {
            debug!("Token rejected (valid: {})", validation.valid);
            return Ok(None);
        };

        debug!("Token accepted for user {}", user_id);
        Ok(self.users.get(user_id).await?)
    }
}

#[async_trait]
impl AuthenticationStrategy for TokenAuthentication {
    async fn authenticate(&self, proof: Proof) -> AuthResult {
        match proof {
            Proof::Token(token) => self.authenticate_token(&token).await,
            other => Err(AuthError::invalid_input(
                Self::NAME,
                format!("expected token, got {}", other.kind()),
            )),
        }
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
