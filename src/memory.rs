//! In-process backend for both stores, used for local runs without Postgres
//! and by the test suite.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::profiles::repo::ProfileStore;
use crate::profiles::repo_types::{Profile, ProfileChanges, ProfileWithUser, UserSummary};
use crate::users::repo::UserStore;
use crate::users::repo_types::{User, UserChanges};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // keyed by owner, which makes "one profile per user" structural
    profiles: HashMap<Uuid, Profile>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn joined(&self, profile: &Profile) -> Option<ProfileWithUser> {
        let owner = self.users.get(&profile.user_id)?;
        Some(ProfileWithUser {
            profile: profile.clone(),
            user: UserSummary {
                id: owner.id,
                name: owner.name.clone(),
                avatar: owner.avatar.clone(),
            },
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        if t.email_taken(email, None) {
            return Err(StoreError::DuplicateKey { field: "email" });
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            avatar: None,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        let mut t = self.tables.write().await;
        if let Some(email) = &changes.email {
            if t.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateKey { field: "email" });
            }
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(avatar) = &changes.avatar {
            user.avatar = Some(avatar.clone());
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn upsert(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<Profile, StoreError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(StoreError::MissingOwner);
        }
        let now = OffsetDateTime::now_utc();
        let profile = t.profiles.entry(user_id).or_insert_with(|| Profile {
            id: Uuid::new_v4(),
            user_id,
            company: None,
            website: None,
            location: None,
            status: String::new(),
            skills: Vec::new(),
            bio: None,
            github_username: None,
            created_at: now,
            updated_at: now,
        });

        fn merge(slot: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        merge(&mut profile.company, &changes.company);
        merge(&mut profile.website, &changes.website);
        merge(&mut profile.location, &changes.location);
        merge(&mut profile.bio, &changes.bio);
        merge(&mut profile.github_username, &changes.github_username);
        profile.status = changes.status.clone();
        profile.skills = changes.skills.clone();
        profile.updated_at = now;

        Ok(profile.clone())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileWithUser>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.profiles.get(&user_id).and_then(|p| t.joined(p)))
    }

    async fn list(&self) -> Result<Vec<ProfileWithUser>, StoreError> {
        let t = self.tables.read().await;
        let mut out: Vec<ProfileWithUser> =
            t.profiles.values().filter_map(|p| t.joined(p)).collect();
        out.sort_by_key(|p| p.profile.created_at);
        Ok(out)
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.profiles.remove(&user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(status: &str, skills: &[&str]) -> ProfileChanges {
        ProfileChanges {
            status: status.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create("Ann", "ann@example.com", "h").await.unwrap();
        let err = store.create("Ann 2", "ann@example.com", "h").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "email" }));
    }

    #[tokio::test]
    async fn update_keeps_unset_fields_and_guards_email() {
        let store = MemoryStore::new();
        let ann = store.create("Ann", "ann@example.com", "h").await.unwrap();
        store.create("Bob", "bob@example.com", "h").await.unwrap();

        let updated = store
            .update(ann.id, &UserChanges { name: Some("Annie".into()), ..Default::default() })
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(updated.name, "Annie");
        assert_eq!(updated.email, "ann@example.com");

        let err = store
            .update(ann.id, &UserChanges { email: Some("bob@example.com".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        let missing = store.update(Uuid::new_v4(), &UserChanges::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn upsert_creates_once_then_updates_in_place() {
        let store = MemoryStore::new();
        let user = store.create("Ann", "ann@example.com", "h").await.unwrap();

        let mut first = changes("Developer", &["rust"]);
        first.company = Some("Acme".into());
        let created = store.upsert(user.id, &first).await.unwrap();

        let second = changes("Lead", &["rust", "sql"]);
        let updated = store.upsert(user.id, &second).await.unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.status, "Lead");
        assert_eq!(updated.skills, vec!["rust", "sql"]);
        assert_eq!(updated.company.as_deref(), Some("Acme"));
        assert_eq!(ProfileStore::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_upserts_leave_one_profile() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let user = store.create("Ann", "ann@example.com", "h").await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.upsert(user.id, &changes(&format!("s{i}"), &["x"])).await
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        assert_eq!(ProfileStore::list(store.as_ref()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_for_unknown_user_fails() {
        let store = MemoryStore::new();
        let err = store.upsert(Uuid::new_v4(), &changes("x", &[])).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingOwner));
    }

    #[tokio::test]
    async fn reads_join_owner_summary() {
        let store = MemoryStore::new();
        let user = store.create("Ann", "ann@example.com", "h").await.unwrap();
        store.upsert(user.id, &changes("Dev", &[])).await.unwrap();

        let found = store.find_by_user_id(user.id).await.unwrap().expect("profile");
        assert_eq!(found.user.name, "Ann");
        assert_eq!(found.user.id, user.id);

        assert!(store.delete_by_user_id(user.id).await.unwrap());
        assert!(store.find_by_user_id(user.id).await.unwrap().is_none());
        assert!(!store.delete_by_user_id(user.id).await.unwrap());
    }
}
