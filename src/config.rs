//! Configuration resolution.
//!
//! Values follow a three-tier priority system:
//!
//! 1. **Parameter** - Explicitly provided function parameter (highest priority)
//! 2. **Environment Variable** - Value from environment variable
//! 3. **Default** - Built-in default value (lowest priority)
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AUTH_TOKEN_TTL_SECS` | 300s | Lifetime of issued tokens, capped at 30 days |
//! | `AUTH_USERS_FILE` | `users.json` | User seed file read by `authcheck` |
//! | `AUTH_ENCRYPT_SEEDS` | true | Digest seed passwords on load |

use std::env;
use std::path::PathBuf;

/// Default token lifetime in seconds
pub(crate) const DEFAULT_TOKEN_TTL_SECS: u64 = 300;

/// Upper bound for the token lifetime (30 days)
pub(crate) const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Default user seed file
pub(crate) const DEFAULT_USERS_FILE: &str = "users.json";

/// Environment variable name for the token lifetime
pub(crate) const TOKEN_TTL_ENV_VAR: &str = "AUTH_TOKEN_TTL_SECS";

/// Environment variable name for the user seed file
pub(crate) const USERS_FILE_ENV_VAR: &str = "AUTH_USERS_FILE";

/// Environment variable name for seed password digesting
pub(crate) const ENCRYPT_SEEDS_ENV_VAR: &str = "AUTH_ENCRYPT_SEEDS";

/// Resolve the token lifetime with priority: parameter -> env var -> default
pub fn resolve_token_ttl(ttl_param: Option<u64>) -> u64 {
    // Priority 1: Use parameter if provided
    if let Some(ttl) = ttl_param {
        return ttl.min(MAX_TOKEN_TTL_SECS);
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_ttl) = env::var(TOKEN_TTL_ENV_VAR)
        && let Ok(ttl) = env_ttl.parse::<u64>()
    {
        return ttl.min(MAX_TOKEN_TTL_SECS);
    }

    // Priority 3: Default value
    DEFAULT_TOKEN_TTL_SECS
}

/// Resolve the user seed file with priority: parameter -> env var -> default
pub fn resolve_users_file(path_param: Option<PathBuf>) -> PathBuf {
    if let Some(path) = path_param {
        return path;
    }

    if let Ok(env_path) = env::var(USERS_FILE_ENV_VAR)
        && !env_path.is_empty()
    {
        return PathBuf::from(env_path);
    }

    PathBuf::from(DEFAULT_USERS_FILE)
}

/// Resolve seed digesting with priority: parameter -> env var -> default (true)
pub fn resolve_encrypt_seeds(encrypt_param: Option<bool>) -> bool {
    if let Some(encrypt) = encrypt_param {
        return encrypt;
    }

    if let Ok(env_encrypt) = env::var(ENCRYPT_SEEDS_ENV_VAR) {
        return env_encrypt.eq_ignore_ascii_case("true") || env_encrypt == "1";
    }

    true
}
