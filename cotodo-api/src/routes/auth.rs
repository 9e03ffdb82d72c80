/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Signup
/// - Login
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - Register a new account
/// - `POST /api/auth/login` - Login and get a token

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use cotodo_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, PublicUser, User},
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Username handle, used for @mentions
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional avatar URL; a generated placeholder is used when absent
    pub avatar_url: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Placeholder avatar for accounts created without one
fn default_avatar_url(name: &str) -> String {
    let encoded: String = name
        .chars()
        .map(|c| if c == ' ' { '+' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '+')
        .collect();

    format!("https://ui-avatars.com/api/?name={}&background=random", encoded)
}

/// Register a new account
///
/// Creates the account, hashes the password with Argon2id, and returns a
/// session token alongside the public profile.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/signup
/// Content-Type: application/json
///
/// {
///   "name": "Alice Smith",
///   "email": "alice@example.com",
///   "username": "alice",
///   "password": "correct horse battery"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or email/username already in use
/// - `500 Internal Server Error`: Server error
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate().map_err(|e| validation_error(&e))?;

    let password_hash = password::hash_password(&req.password)?;

    let avatar_url = req
        .avatar_url
        .unwrap_or_else(|| default_avatar_url(&req.name));

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            username: req.username,
            password_hash,
            avatar_url: Some(avatar_url),
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "new account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "token": token,
            "data": { "user": PublicUser::from(user) },
        })),
    ))
}

/// Login endpoint
///
/// Authenticates by email and password and returns a session token.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "correct horse battery"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password; the message is
///   identical in both cases so the endpoint cannot be used to probe which
///   emails have accounts
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    req.validate().map_err(|e| validation_error(&e))?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(json!({
        "status": "success",
        "token": token,
        "data": { "user": PublicUser::from(user) },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_avatar_encodes_name() {
        let url = default_avatar_url("Alice Smith");
        assert_eq!(
            url,
            "https://ui-avatars.com/api/?name=Alice+Smith&background=random"
        );
    }

    #[test]
    fn test_default_avatar_strips_url_unsafe_chars() {
        let url = default_avatar_url("O'Brien & Co?");
        assert!(!url.contains('\''));
        assert!(!url.contains('&') || url.contains("&background="));
        assert!(!url.contains('?') || url.starts_with("https://ui-avatars.com/api/?"));
    }

    #[test]
    fn test_signup_validation_rejects_short_password() {
        let req = SignupRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            password: "short".to_string(),
            avatar_url: None,
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_validation_rejects_bad_email() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        };

        assert!(req.validate().is_err());
    }
}
