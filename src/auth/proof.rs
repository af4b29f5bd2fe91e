//! Proof-of-identity inputs.
//!
//! Proofs usually arrive loosely typed (decoded from a form post or a JSON
//! body), so the password-based shapes keep every field optional and leave
//! validation to the strategy that consumes them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::TenantId;

/// Non-string values decode as absent so the consuming strategy rejects them.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Username-or-email plus password, with optional filters.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username or email address
    #[serde(default, alias = "username", deserialize_with = "string_or_none")]
    pub identifier: Option<String>,
    /// Password exactly as stored (already transformed, if the store hashes)
    #[serde(default, deserialize_with = "string_or_none")]
    pub password: Option<String>,
    /// Only accounts with at least this privilege level match
    #[serde(default, alias = "access_level")]
    pub min_access_level: Option<u32>,
    /// Restrict the lookup to this site
    #[serde(default, alias = "site")]
    pub tenant: Option<TenantId>,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn with_min_access_level(mut self, level: u32) -> Self {
        self.min_access_level = Some(level);
        self
    }

    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("min_access_level", &self.min_access_level)
            .field("tenant", &self.tenant)
            .finish()
    }
}

/// Raw form submission. The password, if any, is still plaintext.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(default, alias = "username", deserialize_with = "string_or_none")]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub password: Option<String>,
    #[serde(default, alias = "access_level")]
    pub min_access_level: Option<u32>,
    #[serde(default, alias = "site")]
    pub tenant: Option<TenantId>,
    /// Any other submitted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormInput {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }
}

impl fmt::Debug for FormInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormInput")
            .field("identifier", &self.identifier)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("min_access_level", &self.min_access_level)
            .field("tenant", &self.tenant)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl From<FormInput> for Credentials {
    fn from(form: FormInput) -> Self {
        Self {
            identifier: form.identifier,
            password: form.password,
            min_access_level: form.min_access_level,
            tenant: form.tenant,
        }
    }
}

impl From<Credentials> for FormInput {
    fn from(credentials: Credentials) -> Self {
        Self {
            identifier: credentials.identifier,
            password: credentials.password,
            min_access_level: credentials.min_access_level,
            tenant: credentials.tenant,
            extra: Map::new(),
        }
    }
}

/// Any proof a strategy may be handed.
#[derive(Clone, PartialEq)]
pub enum Proof {
    Credentials(Credentials),
    Form(FormInput),
    Token(String),
}

impl Proof {
    /// Short name of the proof kind, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Proof::Credentials(_) => "credentials",
            Proof::Form(_) => "form",
            Proof::Token(_) => "token",
        }
    }
}

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proof::Credentials(c) => f.debug_tuple("Credentials").field(c).finish(),
            Proof::Form(form) => f.debug_tuple("Form").field(form).finish(),
            Proof::Token(_) => f.write_str("Token(***)"),
        }
    }
}

impl From<Credentials> for Proof {
    fn from(credentials: Credentials) -> Self {
        Proof::Credentials(credentials)
    }
}

impl From<FormInput> for Proof {
    fn from(form: FormInput) -> Self {
        Proof::Form(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("bob", "hunter2");
        let rendered = format!("{:?}", Proof::from(creds));
        assert!(rendered.contains("bob"));
        assert!(!rendered.contains("hunter2"));

        let token = format!("{:?}", Proof::Token("abc123".to_string()));
        assert_eq!(token, "Token(***)");
    }

    #[test]
    fn test_form_accepts_legacy_field_names() {
        let form: FormInput = serde_json::from_value(serde_json::json!({
            "username": "bob",
            "password": "plain",
            "access_level": 2,
            "site": "site-a",
            "remember_me": true
        }))
        .unwrap();
        assert_eq!(form.identifier.as_deref(), Some("bob"));
        assert_eq!(form.min_access_level, Some(2));
        assert_eq!(form.tenant, Some(TenantId::new("site-a")));
        assert_eq!(form.extra.get("remember_me"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_form_to_credentials_keeps_fields() {
        let mut form = FormInput::new("bob", "pw");
        form.min_access_level = Some(1);
        form.tenant = Some(TenantId::new("t"));
        form.extra.insert("csrf".to_string(), Value::from("x"));

        let creds = Credentials::from(form);
        assert_eq!(
            creds,
            Credentials::new("bob", "pw")
                .with_min_access_level(1)
                .with_tenant(TenantId::new("t"))
        );
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let creds: Credentials = serde_json::from_str("{}").unwrap();
        assert_eq!(creds, Credentials::default());
        assert_eq!(Proof::from(creds).kind(), "credentials");
    }

    #[test]
    fn test_non_string_secrets_deserialize_as_none() {
        let creds: Credentials = serde_json::from_value(serde_json::json!({
            "identifier": 42,
            "password": {"nested": true}
        }))
        .unwrap();
        assert_eq!(creds.identifier, None);
        assert_eq!(creds.password, None);

        let form: FormInput = serde_json::from_value(serde_json::json!({
            "username": "bob",
            "password": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(form.identifier.as_deref(), Some("bob"));
        assert_eq!(form.password, None);
    }
}
