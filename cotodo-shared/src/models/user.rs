/// User model and database operations
///
/// Users own the todos they create and gain read access to todos they are
/// mentioned on. The "assigned todos" of a user are derived from the
/// `todo_mentions` join table rather than stored on the user row, so the
/// back-reference can never drift out of sync with the mentions themselves.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL UNIQUE,
///     username CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Error type for mention resolution
#[derive(Debug, thiserror::Error)]
pub enum MentionError {
    /// A mention identifier matched no user id and no username
    #[error("Unknown user reference: {0}")]
    Unresolved(String),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the hash
/// is never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (case-insensitive via CITEXT), unique
    pub email: String,

    /// Username handle (case-insensitive via CITEXT), unique
    ///
    /// Used for `@username` mentions
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never logged in)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Username handle
    pub username: String,

    /// Argon2id password hash (NOT the plaintext password!)
    pub password_hash: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

/// Public profile of a user, safe to embed in any API response
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Username handle
    pub username: String,

    /// Avatar URL
    pub avatar_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email or username is already taken (unique
    /// constraint violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, username, password_hash, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, username, password_hash, avatar_url,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, username, password_hash, avatar_url,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive via CITEXT)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, username, password_hash, avatar_url,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates the last login timestamp, called after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users as public profiles, newest first
    pub async fn list_public(pool: &PgPool) -> Result<Vec<PublicUser>, sqlx::Error> {
        let users = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, username, avatar_url, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Resolves mention identifiers to user ids
    ///
    /// Each entry may be a user id string or an `@username` handle (the `@`
    /// prefix is optional). Order is preserved and duplicates are collapsed.
    ///
    /// # Errors
    ///
    /// Returns `MentionError::Unresolved` naming the first identifier that
    /// matches no user. Mentions are an access grant, so a typo must fail the
    /// request instead of silently dropping the grant.
    pub async fn resolve_mentions(
        pool: &PgPool,
        mentions: &[String],
    ) -> Result<Vec<Uuid>, MentionError> {
        let mut resolved = Vec::with_capacity(mentions.len());

        for raw in mentions {
            let user = match raw.parse::<Uuid>() {
                Ok(id) => User::find_by_id(pool, id).await?,
                Err(_) => {
                    let handle = raw.strip_prefix('@').unwrap_or(raw);
                    sqlx::query_as::<_, User>(
                        r#"
                        SELECT id, name, email, username, password_hash, avatar_url,
                               created_at, updated_at, last_login_at
                        FROM users
                        WHERE username = $1
                        "#,
                    )
                    .bind(handle)
                    .fetch_optional(pool)
                    .await?
                }
            };

            let user = user.ok_or_else(|| MentionError::Unresolved(raw.clone()))?;
            if !resolved.contains(&user.id) {
                resolved.push(user.id);
            }
        }

        Ok(resolved)
    }

    /// Ids of todos created by this user, newest first
    pub async fn created_todo_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM todos WHERE created_by = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Ids of todos this user is mentioned on (their assigned todos)
    pub async fn assigned_todo_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT m.todo_id
            FROM todo_mentions m
            JOIN todos t ON t.id = m.todo_id
            WHERE m.user_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Deletes a user by ID
    ///
    /// Cascades to created todos and mention rows. Not exposed via the API;
    /// used by the test harness for cleanup.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            username: "testuser".to_string(),
            password_hash: "hash".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let public = PublicUser::from(user.clone());
        assert_eq!(public.id, user.id);
        assert_eq!(public.username, "testuser");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            username: "testuser".to_string(),
            password_hash: "super-secret-hash".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_public_user_wire_format_is_camel_case() {
        let public = PublicUser {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            username: "t".to_string(),
            avatar_url: Some("https://example.com/a.png".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("avatarUrl"));
        assert!(json.contains("createdAt"));
    }

    // Integration tests for database operations are in cotodo-api/tests/
}
