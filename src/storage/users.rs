//! DashMap-based user store.
//!
//! Provides lock-free concurrent access to user records using `DashMap`.
//! Includes a secondary index for O(1) tenant-to-users lookups so that
//! tenant-scoped queries only ever see that tenant's records.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BoxError, StoreError};
use crate::types::{TenantId, User, UserId};

use super::filter::Filter;
use super::traits::{PasswordEncryptor, TenantUserLookup, UserLookup, UserResolver};

/// Record type of user documents.
pub const USER_RECORD_TYPE: &str = "user";

/// Document field carrying the record type.
pub const OBJECT_TYPE_FIELD: &str = "object_type";

/// Stored record combining the user with its owning tenant.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub tenant: Option<TenantId>,
    pub user: User,
}

/// Seed entry used to populate a store from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    pub id: UserId,
    #[serde(default)]
    pub tenant: Option<TenantId>,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub admin: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSeed {
    fn into_stored(self, encryptor: Option<&dyn PasswordEncryptor>) -> StoredUser {
        let password = match encryptor {
            Some(enc) => enc.encrypt(&self.password),
            None => self.password,
        };

        let mut document = self.extra;
        document.insert("username".to_string(), Value::String(self.username));
        document.insert("email".to_string(), Value::String(self.email));
        document.insert("password".to_string(), Value::String(password));
        document.insert("admin".to_string(), Value::from(self.admin));
        if let Some(tenant) = &self.tenant {
            document.insert("site".to_string(), Value::String(tenant.to_string()));
        }

        StoredUser {
            tenant: self.tenant,
            user: User {
                id: self.id,
                document,
            },
        }
    }
}

/// DashMap-based user collection.
///
/// Uses two `DashMap` instances:
/// - Primary storage: user_id -> StoredUser
/// - Secondary index: tenant_id -> HashSet<user_id>
pub struct DashMapUserStore {
    users: DashMap<UserId, StoredUser>,
    users_by_tenant: DashMap<TenantId, HashSet<UserId>>,
}

impl DashMapUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            users_by_tenant: DashMap::new(),
        }
    }

    /// Build a store from seed entries, optionally digesting their passwords.
    pub fn from_seeds(
        seeds: impl IntoIterator<Item = UserSeed>,
        encryptor: Option<&dyn PasswordEncryptor>,
    ) -> Self {
        let store = Self::new();
        for seed in seeds {
            let stored = seed.into_stored(encryptor);
            store.insert(stored.tenant, stored.user);
        }
        store
    }

    /// Read a JSON array of [`UserSeed`] from `path`.
    pub fn load_seed_file(
        path: impl AsRef<Path>,
        encryptor: Option<&dyn PasswordEncryptor>,
    ) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let seeds: Vec<UserSeed> = serde_json::from_str(&raw)?;
        debug!("Loaded {} user seeds from {:?}", seeds.len(), path.as_ref());
        Ok(Self::from_seeds(seeds, encryptor))
    }

    /// Insert or replace a user, stamping its record type.
    pub fn insert(&self, tenant: Option<TenantId>, mut user: User) {
        user.document.insert(
            OBJECT_TYPE_FIELD.to_string(),
            Value::String(USER_RECORD_TYPE.to_string()),
        );

        if let Some(previous) = self.users.get(&user.id).and_then(|s| s.tenant.clone()) {
            self.unindex(&previous, &user.id);
        }
        if let Some(tenant) = &tenant {
            self.users_by_tenant
                .entry(tenant.clone())
                .or_default()
                .insert(user.id.clone());
        }
        self.users
            .insert(user.id.clone(), StoredUser { tenant, user });
    }

    /// Remove a user, returning it if it existed.
    pub fn remove(&self, user_id: &UserId) -> Option<StoredUser> {
        let (_, stored) = self.users.remove(user_id)?;
        if let Some(tenant) = &stored.tenant {
            self.unindex(tenant, user_id);
        }
        Some(stored)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// User ids registered under a tenant.
    pub fn tenant_users(&self, tenant: &TenantId) -> Vec<UserId> {
        self.users_by_tenant
            .get(tenant)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn unindex(&self, tenant: &TenantId, user_id: &UserId) {
        if let Some(mut ids) = self.users_by_tenant.get_mut(tenant) {
            ids.remove(user_id);
            if ids.is_empty() {
                drop(ids);
                self.users_by_tenant.remove(tenant);
            }
        }
    }

    fn check_record_type(record_type: &str) -> Result<(), BoxError> {
        if record_type == USER_RECORD_TYPE {
            Ok(())
        } else {
            Err(Box::new(StoreError::UnknownRecordType(record_type.to_string())))
        }
    }
}

impl Default for DashMapUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserLookup for DashMapUserStore {
    async fn load_by_predicate(
        &self,
        filter: &Filter,
        record_type: &str,
    ) -> Result<Option<User>, BoxError> {
        Self::check_record_type(record_type)?;
        Ok(self
            .users
            .iter()
            .find(|entry| filter.matches(&entry.user.document))
            .map(|entry| entry.user.clone()))
    }
}

#[async_trait]
impl TenantUserLookup for DashMapUserStore {
    async fn load_by_predicate(
        &self,
        tenant: &TenantId,
        filter: &Filter,
        record_type: &str,
    ) -> Result<Option<User>, BoxError> {
        Self::check_record_type(record_type)?;
        let found = self.tenant_users(tenant).into_iter().find_map(|id| {
            self.users
                .get(&id)
                .filter(|stored| filter.matches(&stored.user.document))
                .map(|stored| stored.user.clone())
        });
        Ok(found)
    }
}

#[async_trait]
impl UserResolver for DashMapUserStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<User>, BoxError> {
        Ok(self.users.get(user_id).map(|stored| stored.user.clone()))
    }
}

/// Resolver view over a shared store restricted to one tenant.
///
/// With a tenant, only users indexed under it resolve. Without one, the
/// view is global and resolves any user.
#[derive(Clone)]
pub struct ScopedUserResolver {
    store: Arc<DashMapUserStore>,
    tenant: Option<TenantId>,
}

impl ScopedUserResolver {
    pub fn new(store: Arc<DashMapUserStore>, tenant: Option<TenantId>) -> Self {
        Self { store, tenant }
    }

    pub fn tenant(&self) -> Option<&TenantId> {
        self.tenant.as_ref()
    }
}

#[async_trait]
impl UserResolver for ScopedUserResolver {
    async fn get(&self, user_id: &UserId) -> Result<Option<User>, BoxError> {
        let Some(tenant) = &self.tenant else {
            return self.store.get(user_id).await;
        };
        let found = self
            .store
            .users
            .get(user_id)
            .filter(|stored| stored.tenant.as_ref() == Some(tenant))
            .map(|stored| stored.user.clone());
        if found.is_none() {
            debug!("User {} not resolvable in tenant {}", user_id, tenant);
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DigestEncryptor;

    fn seed(id: &str, tenant: Option<&str>, username: &str) -> UserSeed {
        UserSeed {
            id: UserId::new(id),
            tenant: tenant.map(TenantId::new),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "pw".to_string(),
            admin: 0,
            extra: Map::new(),
        }
    }

    fn username_is(name: &str) -> Filter {
        Filter::equals("username", name)
    }

    #[test]
    fn test_insert_stamps_object_type() {
        let store = DashMapUserStore::from_seeds([seed("u1", None, "bob")], None);
        let stored = store.users.get(&UserId::new("u1")).unwrap();
        assert_eq!(
            stored.user.str_field(OBJECT_TYPE_FIELD),
            Some(USER_RECORD_TYPE)
        );
    }

    #[test]
    fn test_seed_password_digest() {
        let store = DashMapUserStore::from_seeds([seed("u1", None, "bob")], Some(&DigestEncryptor));
        let stored = store.users.get(&UserId::new("u1")).unwrap();
        assert_eq!(
            stored.user.str_field("password"),
            Some(DigestEncryptor.encrypt("pw").as_str())
        );
    }

    #[test]
    fn test_tenant_index_tracks_moves_and_removal() {
        let store = DashMapUserStore::from_seeds([seed("u1", Some("a"), "bob")], None);
        assert_eq!(store.tenant_users(&TenantId::new("a")).len(), 1);

        let moved = seed("u1", Some("b"), "bob").into_stored(None);
        store.insert(moved.tenant, moved.user);
        assert!(store.tenant_users(&TenantId::new("a")).is_empty());
        assert_eq!(store.tenant_users(&TenantId::new("b")).len(), 1);

        assert!(store.remove(&UserId::new("u1")).is_some());
        assert!(store.tenant_users(&TenantId::new("b")).is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_global_lookup_sees_every_tenant() {
        let store = DashMapUserStore::from_seeds(
            [seed("u1", Some("a"), "bob"), seed("u2", None, "carol")],
            None,
        );
        let found = UserLookup::load_by_predicate(&store, &username_is("bob"), USER_RECORD_TYPE)
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(UserId::new("u1")));
    }

    #[tokio::test]
    async fn test_tenant_lookup_is_restricted() {
        let store = DashMapUserStore::from_seeds(
            [seed("u1", Some("a"), "bob"), seed("u2", None, "carol")],
            None,
        );
        let tenant_b = TenantId::new("b");
        let found = TenantUserLookup::load_by_predicate(
            &store,
            &tenant_b,
            &username_is("bob"),
            USER_RECORD_TYPE,
        )
        .await
        .unwrap();
        assert!(found.is_none());

        let global_user = TenantUserLookup::load_by_predicate(
            &store,
            &TenantId::new("a"),
            &username_is("carol"),
            USER_RECORD_TYPE,
        )
        .await
        .unwrap();
        assert!(global_user.is_none());
    }

    #[tokio::test]
    async fn test_unknown_record_type_is_error() {
        let store = DashMapUserStore::new();
        let err = UserLookup::load_by_predicate(&store, &username_is("bob"), "page")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown record type: page");
    }

    #[tokio::test]
    async fn test_resolver_get() {
        let store = DashMapUserStore::from_seeds([seed("u1", None, "bob")], None);
        assert!(store.get(&UserId::new("u1")).await.unwrap().is_some());
        assert!(store.get(&UserId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scoped_resolver_stays_in_tenant() {
        let store = Arc::new(DashMapUserStore::from_seeds(
            [
                seed("u1", Some("site-a"), "bob"),
                seed("u2", Some("site-b"), "carol"),
                seed("u3", None, "dana"),
            ],
            None,
        ));

        let site_a = ScopedUserResolver::new(store.clone(), Some(TenantId::new("site-a")));
        assert!(site_a.get(&UserId::new("u1")).await.unwrap().is_some());
        assert!(site_a.get(&UserId::new("u2")).await.unwrap().is_none());
        assert!(site_a.get(&UserId::new("u3")).await.unwrap().is_none());

        let global = ScopedUserResolver::new(store, None);
        assert!(global.get(&UserId::new("u2")).await.unwrap().is_some());
        assert!(global.get(&UserId::new("u3")).await.unwrap().is_some());
    }

    #[test]
    fn test_load_seed_file_missing_is_io_error() {
        let err = DashMapUserStore::load_seed_file("/nonexistent/users.json", None)
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
