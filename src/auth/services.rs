use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{ApiError, FieldError},
    state::AppState,
    users::repo_types::User,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Collects every violation instead of stopping at the first one.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "Please enter a password with 6 or more characters",
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Email is invalid"));
    }
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password field is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn register(state: &AppState, mut req: RegisterRequest) -> Result<User, ApiError> {
    req.email = normalize_email(&req.email);
    validate_registration(&req)?;

    // cheap pre-check; the store's uniqueness constraint is authoritative
    if state.users.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(ApiError::DuplicateKey(FieldError::new(
            "email",
            "Email already exists",
        )));
    }

    let hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(req.name.trim(), &req.email, &hash)
        .await
        .map_err(|e| {
            warn!(email = %req.email, error = %e, "create user failed");
            ApiError::from(e)
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn login(state: &AppState, mut req: LoginRequest) -> Result<(User, String), ApiError> {
    req.email = normalize_email(&req.email);
    validate_login(&req)?;

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %req.email, "login unknown email");
            ApiError::NotFound(FieldError::new("email", "User not found"))
        })?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from(&state.config.jwt).sign(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn registration_reports_all_violations() {
        let err = validate_registration(&reg("", "nope", "123")).unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }

    #[test]
    fn registration_accepts_six_char_password() {
        assert!(validate_registration(&reg("Ann", "ann@example.com", "123456")).is_ok());
    }

    #[tokio::test]
    async fn second_registration_with_same_email_is_duplicate() {
        let state = AppState::fake();
        register(&state, reg("Ann", "ann@example.com", "secret1"))
            .await
            .expect("first registration");
        let err = register(&state, reg("Ann", " ANN@example.com ", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn login_token_carries_authenticated_identity() {
        let state = AppState::fake();
        let user = register(&state, reg("Ann", "ann@example.com", "secret1"))
            .await
            .unwrap();
        let (_, token) = login(
            &state,
            LoginRequest {
                email: "ann@example.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap();
        let claims = JwtKeys::from(&state.config.jwt).verify(&token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let state = AppState::fake();
        register(&state, reg("Ann", "ann@example.com", "secret1"))
            .await
            .unwrap();
        let err = login(
            &state,
            LoginRequest {
                email: "ann@example.com".into(),
                password: "secret2".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_unknown_email_is_not_found() {
        let state = AppState::fake();
        let err = login(
            &state,
            LoginRequest {
                email: "ghost@example.com".into(),
                password: "whatever".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
