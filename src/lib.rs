#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Credential verification for a content management platform.
//!
//! - `auth`: the authentication strategies and their shared contract
//! - `storage`: collaborator traits plus in-memory implementations
//! - `types`: user, tenant and token records
//! - `config`: configuration resolution with environment variable support
//! - `error`: error types

pub mod auth;
pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use auth::{
    AuthenticationStrategy, CredentialMatcher, Credentials, FormAuthentication, FormInput,
    PasswordAuthentication, Proof, TokenAuthentication,
};
pub use error::{AuthError, AuthResult, BoxError, StoreError};
