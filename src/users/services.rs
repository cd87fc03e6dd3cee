use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::services::{is_valid_email, normalize_email},
    error::{ApiError, FieldError},
    state::AppState,
    users::{
        dto::UpdateUserRequest,
        repo_types::{User, UserChanges},
    },
};

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Blank fields are ignored; a present email must be well formed.
pub fn changes_from_request(req: UpdateUserRequest) -> Result<UserChanges, ApiError> {
    let email = non_blank(req.email).map(|e| normalize_email(&e));
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(ApiError::Validation(vec![FieldError::new(
                "email",
                "Please include a valid email",
            )]));
        }
    }
    Ok(UserChanges {
        name: non_blank(req.name),
        email,
        avatar: non_blank(req.avatar),
    })
}

pub async fn get_user(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(FieldError::general("User not found")))
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    changes: UserChanges,
) -> Result<User, ApiError> {
    if changes.is_empty() {
        return get_user(state, id).await;
    }
    let user = state
        .users
        .update(id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(FieldError::general("User not found")))?;
    info!(user_id = %id, "user updated");
    Ok(user)
}

/// Removes the user's profile, then the user. The two steps are separate
/// store calls; a failure after the first leaves the user in place.
pub async fn delete_user_cascade(state: &AppState, id: Uuid) -> Result<bool, ApiError> {
    let had_profile = state.profiles.delete_by_user_id(id).await?;
    let removed = state.users.delete(id).await?;
    if removed {
        info!(user_id = %id, had_profile, "user deleted");
    } else {
        warn!(user_id = %id, "delete requested for unknown user");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::repo_types::ProfileChanges;

    #[test]
    fn blank_fields_are_ignored() {
        let changes = changes_from_request(UpdateUserRequest {
            name: Some("  ".into()),
            email: Some(" Ann@Example.com ".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(changes.name.is_none());
        assert_eq!(changes.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let err = changes_from_request(UpdateUserRequest {
            email: Some("nope".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn deleting_user_removes_profile() {
        let state = AppState::fake();
        let user = state.users.create("Ann", "ann@example.com", "h").await.unwrap();
        state
            .profiles
            .upsert(
                user.id,
                &ProfileChanges {
                    status: "Dev".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(delete_user_cascade(&state, user.id).await.unwrap());
        assert!(state.users.find_by_id(user.id).await.unwrap().is_none());
        assert!(state.profiles.find_by_user_id(user.id).await.unwrap().is_none());
        assert!(state.profiles.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn updating_missing_user_is_not_found() {
        let state = AppState::fake();
        let err = update_user(&state, Uuid::new_v4(), UserChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
