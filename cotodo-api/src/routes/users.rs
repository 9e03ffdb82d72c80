/// User directory endpoints
///
/// All endpoints expose public profiles only; password hashes never leave
/// the database layer. Single-user responses include the ids of todos the
/// user created and the ids of todos they are mentioned on (their assigned
/// set), both derived from the mention links so they can never disagree
/// with the todos themselves.
///
/// # Endpoints
///
/// - `GET /api/users` - List all users
/// - `GET /api/users/me` - Authenticated user's own profile
/// - `GET /api/users/:id` - A user's profile

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
    response::{success, success_with_results},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cotodo_shared::models::user::{PublicUser, User};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Public profile with the user's todo back-references
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: PublicUser,

    /// Ids of todos this user created, newest first
    pub todo_ids: Vec<Uuid>,

    /// Ids of todos this user is mentioned on, newest first
    pub assigned_todo_ids: Vec<Uuid>,
}

async fn load_profile(state: &AppState, user: User) -> ApiResult<UserProfile> {
    let todo_ids = User::created_todo_ids(&state.db, user.id).await?;
    let assigned_todo_ids = User::assigned_todo_ids(&state.db, user.id).await?;

    Ok(UserProfile {
        user: PublicUser::from(user),
        todo_ids,
        assigned_todo_ids,
    })
}

/// List all users as public profiles, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Extension(CurrentUser(_current)): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let users = User::list_public(&state.db).await?;
    Ok(success_with_results("users", users))
}

/// The authenticated user's own profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let profile = load_profile(&state, current).await?;
    Ok(success("user", profile))
}

/// A user's profile by id
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(CurrentUser(_current)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let profile = load_profile(&state, user).await?;
    Ok(success("user", profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_profile_wire_format_flattens_user() {
        let profile = UserProfile {
            user: PublicUser {
                id: Uuid::new_v4(),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                username: "alice".to_string(),
                avatar_url: None,
                created_at: Utc::now(),
            },
            todo_ids: vec![],
            assigned_todo_ids: vec![Uuid::new_v4()],
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json["todoIds"].as_array().unwrap().is_empty());
        assert_eq!(json["assignedTodoIds"].as_array().unwrap().len(), 1);
    }
}
