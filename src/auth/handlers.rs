use axum::{
    extract::{FromRef, State},
    routing::get,
    Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{CurrentUser, LoginRequest, LoginResponse, Message, RegisterRequest, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        services,
    },
    error::{ApiError, FieldError},
    extract::Json,
    state::AppState,
    users::repo_types::User,
};

pub fn probe_routes() -> Router<AppState> {
    Router::new().route("/auth", get(probe))
}

pub async fn probe() -> Json<Message> {
    Json(Message { msg: "Auth Works" })
}

/// POST /api/users/register: returns the stored user.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<User>, ApiError> {
    let user = services::register(&state, payload).await?;
    Ok(Json(user))
}

/// POST /api/users: registers and signs the new user in.
#[instrument(skip(state, payload))]
pub async fn register_with_token(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = services::register(&state, payload).await.map_err(|e| match e {
        ApiError::DuplicateKey(_) => {
            ApiError::DuplicateKey(FieldError::new("email", "User already exists"))
        }
        other => other,
    })?;
    let token = JwtKeys::from_ref(&state).sign(&user).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (_, token) = services::login(&state, payload).await?;
    Ok(Json(LoginResponse {
        success: true,
        token: format!("Bearer {token}"),
    }))
}

#[instrument(skip(state))]
pub async fn current(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CurrentUser>, ApiError> {
    // a valid token for a deleted account is treated as unauthenticated
    let user = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".into()))?;

    Ok(Json(CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}
