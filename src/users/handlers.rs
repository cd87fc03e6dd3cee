use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth,
    error::{ApiError, FieldError},
    extract::{Json, Path},
    state::AppState,
    users::{dto::UpdateUserRequest, repo_types::User, services},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(auth::handlers::register_with_token)
                .put(update_user_by_body),
        )
        .route("/users/register", post(auth::handlers::register))
        .route("/users/login", post(auth::handlers::login))
        .route("/users/current", get(auth::handlers::current))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(services::get_user(&state, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let changes = services::changes_from_request(payload)?;
    Ok(Json(services::update_user(&state, id, changes).await?))
}

/// PUT /api/users with the target id carried in the body.
#[instrument(skip(state, payload))]
pub async fn update_user_by_body(
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let id = payload
        .id
        .ok_or_else(|| ApiError::Validation(vec![FieldError::new("id", "User id is required")]))?;
    let changes = services::changes_from_request(payload)?;
    Ok(Json(services::update_user(&state, id, changes).await?))
}

/// Deletes the user (and profile) and answers with the remaining users so
/// list views can re-render from the response.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<User>>, ApiError> {
    if !services::delete_user_cascade(&state, id).await? {
        return Err(ApiError::NotFound(FieldError::general("User not found")));
    }
    Ok(Json(state.users.list().await?))
}
