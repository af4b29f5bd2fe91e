//! Collaborator trait definitions.
//!
//! Strategies depend only on these traits. Implementations must be
//! thread-safe (`Send + Sync`) for use across async tasks; the bundled ones
//! use `DashMap` for lock-free concurrent access.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::types::{TenantId, TokenValidation, User, UserId};

use super::filter::{Filter, Pattern};

/// Global (unscoped) lookup of records by predicate.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Load at most one record of `record_type` matching `filter`.
    async fn load_by_predicate(
        &self,
        filter: &Filter,
        record_type: &str,
    ) -> Result<Option<User>, BoxError>;
}

/// Lookup restricted to the records of a single tenant.
#[async_trait]
pub trait TenantUserLookup: Send + Sync {
    /// Load at most one record of `record_type` belonging to `tenant` that
    /// matches `filter`. Records outside the tenant are never returned.
    async fn load_by_predicate(
        &self,
        tenant: &TenantId,
        filter: &Filter,
        record_type: &str,
    ) -> Result<Option<User>, BoxError>;
}

/// One-way transform applied to plaintext passwords.
pub trait PasswordEncryptor: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> String;
}

/// Builds identifier patterns.
pub trait PatternBuilder: Send + Sync {
    /// Pattern matching `value` exactly, ignoring case.
    fn case_insensitive_exact(&self, value: &str) -> Result<Pattern, regex::Error>;
}

/// Validates bearer tokens.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate_user_token(&self, token: &str) -> Result<TokenValidation, BoxError>;
}

/// Resolves a user by id.
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Option<User>, BoxError>;
}
