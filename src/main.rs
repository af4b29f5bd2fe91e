#![deny(warnings)]
#![deny(clippy::unwrap_used)]

//! `authcheck`: run authentication strategies against a seeded user store.
//!
//! Reads one JSON request per stdin line and prints one JSON response per
//! line. Logs go to stderr.
//!
//! ```text
//! {"strategy":"password","identifier":"bob","password":"<stored digest>"}
//! {"strategy":"form","identifier":"bob","password":"secret","site":"site-a"}
//! {"strategy":"issue_token","user":"u1","tenant":"site-a"}
//! {"strategy":"token","token":"...","tenant":"site-a"}
//! ```

use std::sync::Arc;

use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use cms_auth::config::{resolve_encrypt_seeds, resolve_users_file};
use cms_auth::storage::{
    DashMapTokenService, DashMapUserStore, DigestEncryptor, PasswordEncryptor,
    ScopedUserResolver, TokenScope,
};
use cms_auth::types::{TenantId, UserId};
use cms_auth::{
    AuthenticationStrategy, Credentials, FormAuthentication, FormInput, PasswordAuthentication,
    Proof, TokenAuthentication,
};

#[derive(Debug, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
enum Request {
    Password(Credentials),
    Form(FormInput),
    Token {
        token: String,
        #[serde(default)]
        tenant: Option<TenantId>,
    },
    IssueToken {
        user: UserId,
        #[serde(default)]
        tenant: Option<TenantId>,
    },
}

#[derive(Debug, Default, Serialize)]
struct Response {
    strategy: &'static str,
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    fn failed(strategy: &'static str, error: impl Into<String>) -> Self {
        Self {
            strategy,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

struct Checker {
    store: Arc<DashMapUserStore>,
    password: Arc<PasswordAuthentication>,
    form: FormAuthentication,
    tokens: DashMapTokenService,
}

impl Checker {
    fn new(store: Arc<DashMapUserStore>) -> Self {
        let password = Arc::new(PasswordAuthentication::from_store(store.clone()));
        let form = FormAuthentication::new(password.clone(), Arc::new(DigestEncryptor));
        Self {
            store,
            password,
            form,
            tokens: DashMapTokenService::new(TokenScope::default()),
        }
    }

    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Password(credentials) => {
                Self::run(self.password.as_ref(), credentials.into()).await
            }
            Request::Form(form) => Self::run(&self.form, form.into()).await,
            Request::Token { token, tenant } => {
                let scoped = self.tokens.with_scope(TokenScope::new(tenant.clone(), None));
                let users = ScopedUserResolver::new(self.store.clone(), tenant);
                let auth = TokenAuthentication::new(Arc::new(scoped), Arc::new(users));
                Self::run(&auth, Proof::Token(token)).await
            }
            Request::IssueToken { user, tenant } => {
                let issuer = self.tokens.with_scope(TokenScope::new(tenant, Some(user)));
                match issuer.issue_user_token() {
                    Ok(info) => Response {
                        strategy: "issue_token",
                        user: info.user,
                        token: Some(info.token),
                        ..Default::default()
                    },
                    Err(e) => Response::failed("issue_token", e.to_string()),
                }
            }
        }
    }

    async fn run(strategy: &dyn AuthenticationStrategy, proof: Proof) -> Response {
        match strategy.authenticate(proof).await {
            Ok(Some(user)) => {
                info!("{} authentication succeeded for {}", strategy.name(), user.id);
                Response {
                    strategy: strategy.name(),
                    authenticated: true,
                    user: Some(user.id),
                    ..Default::default()
                }
            }
            Ok(None) => {
                info!("{} authentication found no match", strategy.name());
                Response {
                    strategy: strategy.name(),
                    ..Default::default()
                }
            }
            Err(e) => {
                warn!("{} authentication failed: {}", strategy.name(), e);
                Response::failed(strategy.name(), e.to_string())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Logs on stderr keep stdout parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let users_file = resolve_users_file(None);
    let digest = DigestEncryptor;
    let encryptor: Option<&dyn PasswordEncryptor> = if resolve_encrypt_seeds(None) {
        Some(&digest)
    } else {
        None
    };
    let store = Arc::new(DashMapUserStore::load_seed_file(&users_file, encryptor)?);
    info!("Loaded {} users from {}", store.len(), users_file.display());

    let checker = Checker::new(store);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => checker.handle(request).await,
            Err(e) => Response::failed("unknown", format!("invalid request: {}", e)),
        };
        println!("{}", serde_json::to_string(&response)?);
    }

    Ok(())
}
