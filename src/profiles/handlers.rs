use axum::{extract::State, routing::get, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    extract::{Json, Path},
    profiles::{
        dto::{DeletedResponse, ProfileRequest},
        repo_types::{Profile, ProfileWithUser},
        services,
    },
    state::AppState,
    users,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(list_profiles).post(upsert_profile).delete(delete_own_account),
        )
        .route("/profile/me", get(my_profile))
        .route("/profile/user/:user_id", get(profile_by_user))
}

#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileWithUser>, ApiError> {
    state
        .profiles
        .find_by_user_id(auth.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NoRecord("There is no profile for this user".into()))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let changes = services::changes_from_request(payload)?;
    let profile = state.profiles.upsert(auth.id, &changes).await?;
    info!(user_id = %auth.id, user = %auth.name, profile_id = %profile.id, "profile saved");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileWithUser>>, ApiError> {
    Ok(Json(state.profiles.list().await?))
}

#[instrument(skip(state))]
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileWithUser>, ApiError> {
    state
        .profiles
        .find_by_user_id(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NoRecord("There is no profile".into()))
}

/// Deletes the caller's profile and account.
#[instrument(skip(state))]
pub async fn delete_own_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DeletedResponse>, ApiError> {
    users::services::delete_user_cascade(&state, auth.id).await?;
    Ok(Json(DeletedResponse { msg: "User deleted" }))
}
