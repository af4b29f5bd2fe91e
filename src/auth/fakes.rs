//! Recording collaborators for strategy tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use crate::error::{BoxError, StoreError};
use crate::storage::{
    Filter, PasswordEncryptor, TenantUserLookup, TokenValidator, UserLookup, UserResolver,
};
use crate::types::{TenantId, TokenValidation, User, UserId};

use super::proof::Credentials;
use super::traits::CredentialMatcher;
use crate::error::AuthResult;

pub(crate) fn user(id: &str, username: &str, email: &str, password: &str, admin: i64) -> User {
    let document = json!({
        "object_type": "user",
        "username": username,
        "email": email,
        "password": password,
        "admin": admin,
    });
    match document {
        serde_json::Value::Object(document) => User {
            id: UserId::new(id),
            document,
        },
        _ => unreachable!(),
    }
}

pub(crate) fn unavailable(msg: &str) -> BoxError {
    Box::new(StoreError::Unavailable(msg.to_string()))
}

/// Lookup that evaluates filters over a fixed record set and records calls.
#[derive(Default)]
pub(crate) struct RecordingLookup {
    records: Vec<User>,
    fail_with: Option<String>,
    calls: Mutex<Vec<(Option<TenantId>, Filter, String)>>,
}

impl RecordingLookup {
    pub(crate) fn with_records(records: Vec<User>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub(crate) fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(Option<TenantId>, Filter, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn run(
        &self,
        tenant: Option<&TenantId>,
        filter: &Filter,
        record_type: &str,
    ) -> Result<Option<User>, BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push((tenant.cloned(), filter.clone(), record_type.to_string()));
        if let Some(msg) = &self.fail_with {
            return Err(unavailable(msg));
        }
        Ok(self
            .records
            .iter()
            .find(|u| filter.matches(&u.document))
            .cloned())
    }
}

#[async_trait]
impl UserLookup for RecordingLookup {
    async fn load_by_predicate(
        &self,
        filter: &Filter,
        record_type: &str,
    ) -> Result<Option<User>, BoxError> {
        self.run(None, filter, record_type)
    }
}

#[async_trait]
impl TenantUserLookup for RecordingLookup {
    async fn load_by_predicate(
        &self,
        tenant: &TenantId,
        filter: &Filter,
        record_type: &str,
    ) -> Result<Option<User>, BoxError> {
        self.run(Some(tenant), filter, record_type)
    }
}

/// Encryptor that prefixes `enc:` and records every input.
#[derive(Default)]
pub(crate) struct RecordingEncryptor {
    inputs: Mutex<Vec<String>>,
}

impl RecordingEncryptor {
    pub(crate) fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl PasswordEncryptor for RecordingEncryptor {
    fn encrypt(&self, plaintext: &str) -> String {
        self.inputs.lock().unwrap().push(plaintext.to_string());
        format!("enc:{}", plaintext)
    }
}

/// Matcher that records delegated credentials and returns a fixed outcome.
#[derive(Default)]
pub(crate) struct RecordingMatcher {
    seen: Mutex<Vec<Credentials>>,
    answer: Option<User>,
}

impl RecordingMatcher {
    pub(crate) fn answering(answer: Option<User>) -> Self {
        Self {
            answer,
            ..Default::default()
        }
    }

    pub(crate) fn seen(&self) -> Vec<Credentials> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialMatcher for RecordingMatcher {
    async fn match_credentials(&self, credentials: Credentials) -> AuthResult {
        self.seen.lock().unwrap().push(credentials);
        Ok(self.answer.clone())
    }
}

/// Token validator returning a canned result.
pub(crate) struct StaticTokenValidator {
    result: Result<TokenValidation, String>,
    pub(crate) calls: AtomicUsize,
}

impl StaticTokenValidator {
    pub(crate) fn returning(validation: TokenValidation) -> Self {
        Self {
            result: Ok(validation),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(msg: &str) -> Self {
        Self {
            result: Err(msg.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate_user_token(&self, _token: &str) -> Result<TokenValidation, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(validation) => Ok(validation.clone()),
            Err(msg) => Err(unavailable(msg)),
        }
    }
}

/// Resolver over a fixed record set that records requested ids.
#[derive(Default)]
pub(crate) struct RecordingResolver {
    records: Vec<User>,
    fail_with: Option<String>,
    requested: Mutex<Vec<UserId>>,
}

impl RecordingResolver {
    pub(crate) fn with_records(records: Vec<User>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub(crate) fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn requested(&self) -> Vec<UserId> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserResolver for RecordingResolver {
    async fn get(&self, user_id: &UserId) -> Result<Option<User>, BoxError> {
        self.requested.lock().unwrap().push(user_id.clone());
        if let Some(msg) = &self.fail_with {
            return Err(unavailable(msg));
        }
        Ok(self.records.iter().find(|u| &u.id == user_id).cloned())
    }
}
