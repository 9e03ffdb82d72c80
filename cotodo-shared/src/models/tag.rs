/// Tag model and database operations
///
/// Tags are a global namespace: every authenticated user sees every tag, but
/// only the creator may update or delete one. Tags whose creator row was
/// removed (`created_by` NULL) are mutable by anyone.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name CITEXT NOT NULL UNIQUE,
///     color VARCHAR(32) NOT NULL DEFAULT '#e0e0e0',
///     text_color VARCHAR(32) NOT NULL DEFAULT '#000000',
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Tag model representing a named, colored label
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique tag ID
    pub id: Uuid,

    /// Tag name, unique across all users
    pub name: String,

    /// Background color (CSS value)
    pub color: String,

    /// Text color (CSS value)
    pub text_color: String,

    /// User who created the tag (None if that account was removed)
    pub created_by: Option<Uuid>,

    /// When the tag was created
    pub created_at: DateTime<Utc>,

    /// When the tag was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    /// Tag name (must be unique)
    pub name: String,

    /// Background color, defaults to '#e0e0e0'
    pub color: Option<String>,

    /// Text color, defaults to '#000000'
    pub text_color: Option<String>,
}

/// Input for updating an existing tag
///
/// Only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTag {
    /// New tag name
    pub name: Option<String>,

    /// New background color
    pub color: Option<String>,

    /// New text color
    pub text_color: Option<String>,
}

impl Tag {
    /// True if `user_id` may mutate this tag
    ///
    /// Creator-only, except legacy tags with no creator which anyone may edit.
    pub fn is_editable_by(&self, user_id: Uuid) -> bool {
        match self.created_by {
            Some(creator) => creator == user_id,
            None => true,
        }
    }

    /// Creates a new tag
    ///
    /// # Errors
    ///
    /// Returns a unique-violation error if a tag with the same name exists.
    pub async fn create(
        pool: &PgPool,
        data: CreateTag,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, color, text_color, created_by)
            VALUES ($1, COALESCE($2, '#e0e0e0'), COALESCE($3, '#000000'), $4)
            RETURNING id, name, color, text_color, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.color)
        .bind(data.text_color)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    /// Finds a tag by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, color, text_color, created_by, created_at, updated_at
            FROM tags
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Lists all tags, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, color, text_color, created_by, created_at, updated_at
            FROM tags
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Updates an existing tag
    ///
    /// Only non-None fields in `data` are written; `updated_at` is bumped.
    /// Returns None if the tag doesn't exist. Permission checks are the
    /// caller's responsibility (see [`Tag::is_editable_by`]).
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTag,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tags SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }
        if data.text_color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", text_color = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, color, text_color, created_by, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Tag>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }
        if let Some(text_color) = data.text_color {
            q = q.bind(text_color);
        }

        let tag = q.fetch_optional(pool).await?;

        Ok(tag)
    }

    /// Deletes a tag by ID
    ///
    /// Cascades removal of its `todo_tags` links. Returns true if a row was
    /// deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
