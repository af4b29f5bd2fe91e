//! Collaborators used by the authentication strategies.
//!
//! This module provides trait-based abstractions that enable:
//! - Dependency injection of lookups, token services and password transforms
//! - Lock-free concurrent access via the bundled DashMap implementations
//! - A small query model (`Filter`) shared by every lookup backend

mod digest;
mod filter;
mod pattern;
mod tokens;
mod traits;
mod users;

pub use digest::DigestEncryptor;
pub use filter::{Filter, Pattern};
pub use pattern::RegexPatternBuilder;
pub use tokens::{DashMapTokenService, TokenScope};
pub use traits::{
    PasswordEncryptor, PatternBuilder, TenantUserLookup, TokenValidator, UserLookup, UserResolver,
};
pub use users::{
    DashMapUserStore, OBJECT_TYPE_FIELD, ScopedUserResolver, StoredUser, USER_RECORD_TYPE,
    UserSeed,
};
