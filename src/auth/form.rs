//! Form-submitted password authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::storage::PasswordEncryptor;

use super::proof::{Credentials, FormInput, Proof};
use super::traits::{AuthenticationStrategy, CredentialMatcher};

/// Form authentication strategy.
///
/// Encrypts the plaintext password of a form post once, then hands the
/// result to a credential matcher (normally [`PasswordAuthentication`]).
///
/// [`PasswordAuthentication`]: super::PasswordAuthentication
pub struct FormAuthentication {
    matcher: Arc<dyn CredentialMatcher>,
    encryptor: Arc<dyn PasswordEncryptor>,
}

impl FormAuthentication {
    pub const NAME: &'static str = "form";

    pub fn new(
        matcher: Arc<dyn CredentialMatcher>,
        encryptor: Arc<dyn PasswordEncryptor>,
    ) -> Self {
        Self { matcher, encryptor }
    }

    /// Encrypt the password (if any) and delegate to the matcher.
    ///
    /// An absent or empty password is passed on untouched; the matcher then
    /// rejects it as invalid input.
    pub async fn authenticate_form(&self, mut form: FormInput) -> AuthResult {
        if let Some(password) = form.password.as_mut().filter(|p| !p.is_empty()) {
            *password = self.encryptor.encrypt(password.as_str());
        } else {
            debug!("Form submitted without a password");
        }

        self.matcher
            .match_credentials(Credentials::from(form))
            .await
    }
}

#[async_trait]
impl AuthenticationStrategy for FormAuthentication {
    async fn authenticate(&self, proof: Proof) -> AuthResult {
        match proof {
            Proof::Form(form) => self.authenticate_form(form).await,
            Proof::Credentials(credentials) => self.authenticate_form(credentials.into()).await,
            Proof::Token(_) => Err(AuthError::invalid_input(
                Self::NAME,
                "expected form input, got token",
            )),
        }
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
