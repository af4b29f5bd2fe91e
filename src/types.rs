//! Record and identifier types shared by strategies and collaborators.
//!
//! `User` is owned by the storage layer. Strategies only forward what a
//! collaborator hands back; they never build or modify one.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier partitioning user records by site in multi-tenant deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform-level user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored user record.
///
/// The document holds whatever fields the store keeps (`username`, `email`,
/// `password`, `admin`, ...). Query filters are evaluated against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub document: Map<String, Value>,
}

impl User {
    /// Read a string field from the document.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.document.get(field).and_then(Value::as_str)
    }

    /// Privilege level stored under `admin`, if any.
    pub fn access_level(&self) -> Option<i64> {
        self.document.get("admin").and_then(Value::as_i64)
    }
}

/// Metadata about an issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub token: String,
    /// User the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    /// Site the token belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantId>,
    pub issued_at: DateTime<Utc>,
    pub used: bool,
}

/// Outcome of asking the token service about a token.
///
/// Only `valid == true` together with `token_info.user` identifies a user.
/// Every other combination means "no user".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_info: Option<TokenInfo>,
}

impl TokenValidation {
    /// A rejected token with no further information.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            token_info: None,
        }
    }

    /// The user this validation vouches for, if it vouches for anyone.
    pub fn authenticated_user(&self) -> Option<&UserId> {
        if !self.valid {
            return None;
        }
        self.token_info.as_ref().and_then(|info| info.user.as_ref())
    }
}
