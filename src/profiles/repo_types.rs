use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields written by an upsert. Optional fields left as `None` keep
/// whatever the stored profile already has.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
}

/// Owner fields joined onto profile reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileWithUser {
    #[serde(flatten)]
    pub profile: Profile,
    pub user: UserSummary,
}

/// Flat row produced by the profile/user join.
#[derive(Debug, FromRow)]
pub struct ProfileWithUserRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub user_name: String,
    pub user_avatar: Option<String>,
}

impl From<ProfileWithUserRow> for ProfileWithUser {
    fn from(r: ProfileWithUserRow) -> Self {
        Self {
            user: UserSummary {
                id: r.user_id,
                name: r.user_name,
                avatar: r.user_avatar,
            },
            profile: Profile {
                id: r.id,
                user_id: r.user_id,
                company: r.company,
                website: r.website,
                location: r.location,
                status: r.status,
                skills: r.skills,
                bio: r.bio,
                github_username: r.github_username,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}
