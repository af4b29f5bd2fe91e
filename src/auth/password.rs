//! Username-or-email and password authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::storage::{
    DashMapUserStore, Filter, OBJECT_TYPE_FIELD, PatternBuilder, RegexPatternBuilder,
    TenantUserLookup, USER_RECORD_TYPE, UserLookup,
};

use super::proof::{Credentials, Proof};
use super::traits::{AuthenticationStrategy, CredentialMatcher};

const USERNAME_FIELD: &str = "username";
const EMAIL_FIELD: &str = "email";
const PASSWORD_FIELD: &str = "password";
const ACCESS_LEVEL_FIELD: &str = "admin";

/// Password authentication strategy.
///
/// Matches the identifier case-insensitively against username or email and
/// the password by exact equality with the stored value. No hashing happens
/// here: the password must already be in its stored form.
pub struct PasswordAuthentication {
    global: Arc<dyn UserLookup>,
    tenant_scoped: Arc<dyn TenantUserLookup>,
    patterns: Arc<dyn PatternBuilder>,
}

impl PasswordAuthentication {
    pub const NAME: &'static str = "password";

    /// Create a strategy over a global and a tenant-scoped lookup.
    pub fn new(global: Arc<dyn UserLookup>, tenant_scoped: Arc<dyn TenantUserLookup>) -> Self {
        Self {
            global,
            tenant_scoped,
            patterns: Arc::new(RegexPatternBuilder),
        }
    }

    /// Use one in-memory store for both global and tenant lookups.
    pub fn from_store(store: Arc<DashMapUserStore>) -> Self {
        Self::new(store.clone(), store)
    }

    pub fn with_pattern_builder(mut self, patterns: Arc<dyn PatternBuilder>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Build the lookup predicate for validated credentials.
    ///
    /// `object_type == "user" AND (username ~ id OR email ~ id) AND password == pw
    /// [AND admin >= level]`
    pub fn build_filter(&self, credentials: &Credentials) -> Result<Filter, AuthError> {
        let (identifier, password) = validate(credentials)?;

        let pattern = self
            .patterns
            .case_insensitive_exact(identifier)
            .map_err(|e| {
                AuthError::invalid_input(Self::NAME, format!("identifier cannot be matched: {e}"))
            })?;

        let mut clauses = vec![
            Filter::equals(OBJECT_TYPE_FIELD, USER_RECORD_TYPE),
            Filter::Or(vec![
                Filter::matches_pattern(USERNAME_FIELD, pattern.clone()),
                Filter::matches_pattern(EMAIL_FIELD, pattern),
            ]),
            Filter::equals(PASSWORD_FIELD, password),
        ];

        if let Some(level) = credentials.min_access_level {
            clauses.push(Filter::gte(ACCESS_LEVEL_FIELD, i64::from(level)));
        }

        Ok(Filter::And(clauses))
    }

    /// Authenticate prepared credentials.
    pub async fn authenticate_credentials(&self, credentials: Credentials) -> AuthResult {
        let filter = self.build_filter(&credentials)?;

        let user = match &credentials.tenant {
            Some(tenant) => {
                debug!("Looking up user in tenant {}", tenant);
                self.tenant_scoped
                    .load_by_predicate(tenant, &filter, USER_RECORD_TYPE)
                    .await?
            }
            None => {
                debug!("Looking up user globally");
                self.global
                    .load_by_predicate(&filter, USER_RECORD_TYPE)
                    .await?
            }
        };

        debug!(
            "Password authentication {}",
            if user.is_some() { "matched" } else { "found no match" }
        );
        Ok(user)
    }
}

/// Both identifier and password must be present, non-empty strings.
fn validate(credentials: &Credentials) -> Result<(&str, &str), AuthError> {
    let identifier = credentials
        .identifier
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AuthError::invalid_input(
                PasswordAuthentication::NAME,
                "identifier must be a non-empty string",
            )
        })?;
    let password = credentials
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AuthError::invalid_input(
                PasswordAuthentication::NAME,
                "password must be a non-empty string",
            )
        })?;
    Ok((identifier, password))
}

#[async_trait]
impl CredentialMatcher for PasswordAuthentication {
    async fn match_credentials(&self, credentials: Credentials) -> AuthResult {
        self.authenticate_credentials(credentials).await
    }
}

#[async_trait]
impl AuthenticationStrategy for PasswordAuthentication {
    async fn authenticate(&self, proof: Proof) -> AuthResult {
        match proof {
            Proof::Credentials(credentials) => self.authenticate_credentials(credentials).await,
            other => Err(AuthError::invalid_input(
                Self::NAME,
                format!("expected credentials, got {}", other.kind()),
            )),
        }
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
