//! DashMap-based token service.
//!
//! Issues single-use bearer tokens and validates them. A token is valid when
//! it exists, belongs to the service's tenant, has not been used and is
//! younger than the configured TTL. Validation consumes the token.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::config::{MAX_TOKEN_TTL_SECS, resolve_token_ttl};
use crate::error::{BoxError, StoreError};
use crate::types::{TenantId, TokenInfo, TokenValidation, UserId};

use super::traits::TokenValidator;

/// Scope a token service operates in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenScope {
    /// Site whose tokens are visible
    pub tenant: Option<TenantId>,
    /// User new tokens are issued for
    pub user: Option<UserId>,
}

impl TokenScope {
    pub fn new(tenant: Option<TenantId>, user: Option<UserId>) -> Self {
        Self { tenant, user }
    }
}

/// Token service backed by a shared `DashMap` of token -> info.
///
/// Services created with [`DashMapTokenService::with_scope`] share the same
/// token table, like per-request services over one database.
#[derive(Clone)]
pub struct DashMapTokenService {
    scope: TokenScope,
    ttl: Duration,
    tokens: Arc<DashMap<String, TokenInfo>>,
}

impl DashMapTokenService {
    /// Create a service with the TTL resolved from configuration.
    pub fn new(scope: TokenScope) -> Self {
        let ttl_secs = resolve_token_ttl(None);
        Self::with_ttl(scope, Duration::seconds(ttl_secs as i64))
    }

    /// Create a service with an explicit TTL, clamped to `0..=MAX_TOKEN_TTL_SECS`.
    pub fn with_ttl(scope: TokenScope, ttl: Duration) -> Self {
        let max = Duration::seconds(MAX_TOKEN_TTL_SECS as i64);
        Self {
            scope,
            ttl: ttl.clamp(Duration::zero(), max),
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Same token table, different scope.
    pub fn with_scope(&self, scope: TokenScope) -> Self {
        Self {
            scope,
            ttl: self.ttl,
            tokens: Arc::clone(&self.tokens),
        }
    }

    pub fn scope(&self) -> &TokenScope {
        &self.scope
    }

    /// Issue a new token for the scope's user.
    ///
    /// Used and expired tokens are purged first, so the table only holds
    /// tokens that can still be redeemed.
    pub fn issue_user_token(&self) -> Result<TokenInfo, StoreError> {
        let user = self.scope.user.clone().ok_or(StoreError::MissingScope("user"))?;
        let purged = self.purge_expired();
        if purged > 0 {
            debug!("Purged {} stale tokens", purged);
        }
        let info = TokenInfo {
            token: Uuid::new_v4().to_string(),
            user: Some(user),
            tenant: self.scope.tenant.clone(),
            issued_at: Utc::now(),
            used: false,
        };
        self.tokens.insert(info.token.clone(), info.clone());
        debug!("Issued token for user {:?}", info.user);
        Ok(info)
    }

    /// Drop used and expired tokens. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let before = self.tokens.len();
        self.tokens
            .retain(|_, info| !info.used && info.issued_at > cutoff);
        before.saturating_sub(self.tokens.len())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[cfg(test)]
    fn backdate(&self, token: &str, by: Duration) {
        if let Some(mut info) = self.tokens.get_mut(token) {
            info.issued_at -= by;
        }
    }
}

#[async_trait]
impl TokenValidator for DashMapTokenService {
    async fn validate_user_token(&self, token: &str) -> Result<TokenValidation, BoxError> {
        let Some(mut entry) = self.tokens.get_mut(token) else {
            return Ok(TokenValidation::invalid());
        };

        if entry.tenant != self.scope.tenant {
            return Ok(TokenValidation::invalid());
        }

        let expired = entry
            .issued_at
            .checked_add_signed(self.ttl)
            .is_none_or(|deadline| deadline <= Utc::now());
        let valid = !entry.used && !expired;
        entry.used = true;

        Ok(TokenValidation {
            valid,
            token_info: Some(entry.value().clone()),
        })
    }
}
