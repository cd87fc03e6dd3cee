use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::profiles::repo_types::{Profile, ProfileChanges, ProfileWithUser, ProfileWithUserRow};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Create the user's profile or merge `changes` into the existing one,
    /// as a single atomic operation.
    async fn upsert(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<Profile, StoreError>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileWithUser>, StoreError>;
    async fn list(&self) -> Result<Vec<ProfileWithUser>, StoreError>;
    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const JOINED_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.company, p.website, p.location, p.status, p.skills,
           p.bio, p.github_username, p.created_at, p.updated_at,
           u.name AS user_name, u.avatar AS user_avatar
      FROM profiles p
      JOIN users u ON u.id = p.user_id
"#;

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn upsert(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<Profile, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles
                (user_id, company, website, location, status, skills, bio, github_username)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                company         = COALESCE(EXCLUDED.company, profiles.company),
                website         = COALESCE(EXCLUDED.website, profiles.website),
                location        = COALESCE(EXCLUDED.location, profiles.location),
                status          = EXCLUDED.status,
                skills          = EXCLUDED.skills,
                bio             = COALESCE(EXCLUDED.bio, profiles.bio),
                github_username = COALESCE(EXCLUDED.github_username, profiles.github_username),
                updated_at      = now()
            RETURNING id, user_id, company, website, location, status, skills,
                      bio, github_username, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(changes.company.as_deref())
        .bind(changes.website.as_deref())
        .bind(changes.location.as_deref())
        .bind(&changes.status)
        .bind(&changes.skills)
        .bind(changes.bio.as_deref())
        .bind(changes.github_username.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(profile)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileWithUser>, StoreError> {
        let sql = format!("{JOINED_SELECT} WHERE p.user_id = $1");
        let row = sqlx::query_as::<_, ProfileWithUserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<ProfileWithUser>, StoreError> {
        let sql = format!("{JOINED_SELECT} ORDER BY p.created_at ASC");
        let rows = sqlx::query_as::<_, ProfileWithUserRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
