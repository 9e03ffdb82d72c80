/// Note model — append-only comments attached to a todo
///
/// Notes are immutable once appended; there is no update or delete. Ordering
/// is append order, realized as `(created_at, id)` ascending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::PublicUser;

/// Note row as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    /// Unique note ID
    pub id: Uuid,

    /// Todo this note belongs to
    pub todo_id: Uuid,

    /// Free-text content
    pub content: String,

    /// Author (None if that account was removed)
    pub created_by: Option<Uuid>,

    /// When the note was appended
    pub created_at: DateTime<Utc>,
}

/// Note with its author's profile resolved, as embedded in todo responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    /// Note ID
    pub id: Uuid,

    /// Free-text content
    pub content: String,

    /// Author profile (None if that account was removed)
    pub created_by: Option<PublicUser>,

    /// When the note was appended
    pub date: DateTime<Utc>,
}

impl Note {
    /// Appends a note to a todo
    pub async fn append(
        pool: &PgPool,
        todo_id: Uuid,
        content: &str,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (todo_id, content, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, todo_id, content, created_by, created_at
            "#,
        )
        .bind(todo_id)
        .bind(content)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }
}
