//! Authentication strategies.
//!
//! This module provides a trait-based authentication system that follows
//! the Strategy pattern: a caller picks the strategy matching the kind of
//! proof it received and calls `authenticate` once.
//!
//! # Available Strategies
//!
//! - [`PasswordAuthentication`]: Username-or-email plus stored password
//! - [`FormAuthentication`]: Form post with a plaintext password, encrypted
//!   once and matched through a [`CredentialMatcher`]
//! - [`TokenAuthentication`]: Bearer token validated by a token service
//!
//! # Example
//!
//! ```ignore
//! use cms_auth::auth::{AuthenticationStrategy, FormAuthentication, FormInput, PasswordAuthentication};
//! use cms_auth::storage::{DashMapUserStore, DigestEncryptor};
//!
//! let password = Arc::new(PasswordAuthentication::from_store(store));
//! let form = FormAuthentication::new(password, Arc::new(DigestEncryptor));
//!
//! let user = form.authenticate(FormInput::new("bob", "secret").into()).await?;
//! ```

#[cfg(test)]
mod fakes;
mod form;
mod password;
mod proof;
mod token;
mod traits;

pub use form::FormAuthentication;
pub use password::PasswordAuthentication;
pub use proof::{Credentials, FormInput, Proof};
pub use token::TokenAuthentication;
pub use traits::{AuthenticationStrategy, CredentialMatcher};
