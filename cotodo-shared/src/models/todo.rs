/// Todo model, authorized query builder, and hydrated views
///
/// A todo is visible to its creator and to every user mentioned on it; only
/// the creator may mutate or delete it. Mentions live in the `todo_mentions`
/// join table, which is also each user's assigned-todo set, so the
/// back-reference invariant holds by construction. Todo writes and their link
/// rows go through one transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_priority AS ENUM ('low', 'medium', 'high');
/// CREATE TYPE todo_status AS ENUM ('pending', 'in_progress', 'completed');
///
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100) NOT NULL,
///     description TEXT,
///     priority todo_priority NOT NULL DEFAULT 'medium',
///     status todo_status NOT NULL DEFAULT 'pending',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date TIMESTAMPTZ,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use cotodo_shared::models::todo::{Todo, TodoFilter, Priority};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, me: Uuid) -> Result<(), sqlx::Error> {
/// let filter = TodoFilter {
///     acting_user: me,
///     priorities: vec![Priority::High],
///     search: Some("deploy".to_string()),
///     ..TodoFilter::for_user(me)
/// };
///
/// let todos = Todo::list(&pool, filter).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use super::note::NoteView;
use super::tag::Tag;
use super::user::PublicUser;

/// Todo priority level
///
/// Wire values keep the product's original casing ("Low", "Medium", "High");
/// database values are lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Database enum value
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("Invalid priority: {}", other)),
        }
    }
}

/// Todo workflow status
///
/// Freely settable by the creator; there are no enforced transitions. The
/// `completed` boolean is tracked independently and is not derived from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_status", rename_all = "snake_case")]
pub enum Status {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Status {
    /// Database enum value
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "in progress" | "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

/// Todo row as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique todo ID
    pub id: Uuid,

    /// Short title (max 100 chars, enforced at the API boundary and schema)
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Priority level
    pub priority: Priority,

    /// Workflow status
    pub status: Status,

    /// Completion flag, independent of `status`
    pub completed: bool,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Creator; immutable after creation, sole holder of write rights
    pub created_by: Uuid,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new todo
///
/// Mention identifiers must already be resolved to user ids (see
/// `User::resolve_mentions`).
#[derive(Debug, Clone)]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub tag_ids: Vec<Uuid>,
    pub mention_ids: Vec<Uuid>,
}

/// Input for updating a todo
///
/// Only present fields are written. `description` and `due_date` use a double
/// Option so a JSON `null` clears the field while absence leaves it alone.
/// There is deliberately no `created_by` here: the creator is immutable.
#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// Replaces the todo's tag set wholesale when present
    pub tag_ids: Option<Vec<Uuid>>,

    /// Replaces the mention set wholesale when present; removed users lose
    /// the todo from their assigned set by construction
    pub mention_ids: Option<Vec<Uuid>>,
}

/// Filter for the authorized list query
///
/// The base predicate is always "created by the acting user OR the acting
/// user is mentioned"; every supplied predicate is AND-combined on top.
#[derive(Debug, Clone)]
pub struct TodoFilter {
    /// User whose view of the todo set this is
    pub acting_user: Uuid,

    /// Match any of these priorities (empty = no priority filter)
    pub priorities: Vec<Priority>,

    /// Todo's tag set must intersect these ids (empty = no tag filter)
    pub tag_ids: Vec<Uuid>,

    /// Exact status match
    pub status: Option<Status>,

    /// Case-insensitive substring over title and description
    pub search: Option<String>,
}

impl TodoFilter {
    /// Bare filter: everything the user can see
    pub fn for_user(acting_user: Uuid) -> Self {
        Self {
            acting_user,
            priorities: Vec::new(),
            tag_ids: Vec::new(),
            status: None,
            search: None,
        }
    }
}

const TODO_COLUMNS: &str = "id, title, description, priority, status, completed, due_date, \
                            created_by, created_at, updated_at";

/// Builds the SQL for the authorized list query
///
/// Kept separate from binding so the predicate construction is testable
/// without a database. Placeholder order: acting user is always $1, then
/// priorities, tag ids, status, search, in that order, for whichever are
/// present.
fn build_list_sql(filter: &TodoFilter) -> String {
    let mut sql = format!(
        "SELECT {} FROM todos WHERE (created_by = $1 OR EXISTS \
         (SELECT 1 FROM todo_mentions m WHERE m.todo_id = todos.id AND m.user_id = $1))",
        TODO_COLUMNS
    );
    let mut bind_count = 1;

    if !filter.priorities.is_empty() {
        bind_count += 1;
        sql.push_str(&format!(
            " AND priority = ANY(${}::todo_priority[])",
            bind_count
        ));
    }
    if !filter.tag_ids.is_empty() {
        bind_count += 1;
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM todo_tags t WHERE t.todo_id = todos.id AND t.tag_id = ANY(${}))",
            bind_count
        ));
    }
    if filter.status.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND status = ${}::todo_status", bind_count));
    }
    if filter.search.is_some() {
        bind_count += 1;
        sql.push_str(&format!(
            " AND (title ILIKE ${n} OR description ILIKE ${n})",
            n = bind_count
        ));
    }

    sql.push_str(" ORDER BY created_at DESC");
    sql
}

/// Escapes LIKE metacharacters so user input matches literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl Todo {
    /// True if `user_id` created this todo
    pub fn is_created_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    /// Creates a todo along with its tag and mention links, atomically
    ///
    /// `created_by` comes from the authenticated identity, never from input.
    pub async fn create(
        pool: &PgPool,
        data: CreateTodo,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let todo = sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (title, description, priority, status, completed, due_date, created_by) \
             VALUES ($1, $2, $3::todo_priority, $4::todo_status, $5, $6, $7) \
             RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority.as_db_str())
        .bind(data.status.as_db_str())
        .bind(data.completed)
        .bind(data.due_date)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        replace_tag_links(&mut tx, todo.id, &data.tag_ids).await?;
        replace_mention_links(&mut tx, todo.id, &data.mention_ids).await?;

        tx.commit().await?;
        Ok(todo)
    }

    /// Finds a todo by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(todo)
    }

    /// Lists todos visible to the acting user, AND-filtered, newest first
    pub async fn list(pool: &PgPool, filter: TodoFilter) -> Result<Vec<Self>, sqlx::Error> {
        let sql = build_list_sql(&filter);

        let mut q = sqlx::query_as::<_, Todo>(&sql).bind(filter.acting_user);

        if !filter.priorities.is_empty() {
            let values: Vec<String> = filter
                .priorities
                .iter()
                .map(|p| p.as_db_str().to_string())
                .collect();
            q = q.bind(values);
        }
        if !filter.tag_ids.is_empty() {
            q = q.bind(filter.tag_ids);
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_db_str());
        }
        if let Some(search) = filter.search {
            q = q.bind(format!("%{}%", escape_like(&search)));
        }

        q.fetch_all(pool).await
    }

    /// Updates a todo and, when requested, replaces its tag/mention links,
    /// all in one transaction
    ///
    /// Returns None if the todo doesn't exist. Permission checks (creator
    /// only) are the caller's responsibility.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTodo,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE todos SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}::todo_priority", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}::todo_status", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", TODO_COLUMNS));

        let mut q = sqlx::query_as::<_, Todo>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority.as_db_str());
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_db_str());
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let todo = q.fetch_optional(&mut *tx).await?;

        let Some(todo) = todo else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(tag_ids) = data.tag_ids {
            replace_tag_links(&mut tx, id, &tag_ids).await?;
        }
        if let Some(mention_ids) = data.mention_ids {
            replace_mention_links(&mut tx, id, &mention_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(todo))
    }

    /// Deletes a todo
    ///
    /// Mention links, tag links, and notes cascade, so every previously
    /// mentioned user loses the todo from their assigned set.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// True if `user_id` is mentioned on this todo
    pub async fn is_mentioned(
        pool: &PgPool,
        todo_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM todo_mentions WHERE todo_id = $1 AND user_id = $2)",
        )
        .bind(todo_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// True if `user_id` may read this todo (creator or mentioned)
    pub async fn is_accessible_by(&self, pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        if self.is_created_by(user_id) {
            return Ok(true);
        }
        Todo::is_mentioned(pool, self.id, user_id).await
    }
}

async fn replace_tag_links(
    conn: &mut PgConnection,
    todo_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM todo_tags WHERE todo_id = $1")
        .bind(todo_id)
        .execute(&mut *conn)
        .await?;

    for tag_id in tag_ids {
        sqlx::query(
            "INSERT INTO todo_tags (todo_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(todo_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn replace_mention_links(
    conn: &mut PgConnection,
    todo_id: Uuid,
    user_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM todo_mentions WHERE todo_id = $1")
        .bind(todo_id)
        .execute(&mut *conn)
        .await?;

    for user_id in user_ids {
        sqlx::query(
            "INSERT INTO todo_mentions (todo_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(todo_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Todo with all relations resolved for API responses: tags, mention
/// profiles, notes with authors, and the creator profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
    pub mentions: Vec<PublicUser>,
    pub notes: Vec<NoteView>,
    pub created_by: PublicUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TagLinkRow {
    todo_id: Uuid,
    id: Uuid,
    name: String,
    color: String,
    text_color: String,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct MentionRow {
    todo_id: Uuid,
    id: Uuid,
    name: String,
    email: String,
    username: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct NoteRow {
    todo_id: Uuid,
    id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    author_id: Option<Uuid>,
    author_name: Option<String>,
    author_email: Option<String>,
    author_username: Option<String>,
    author_avatar_url: Option<String>,
    author_created_at: Option<DateTime<Utc>>,
}

impl TodoView {
    /// Hydrates a single todo
    pub async fn load(pool: &PgPool, todo: Todo) -> Result<Self, sqlx::Error> {
        let mut views = Self::load_many(pool, vec![todo]).await?;
        views.pop().ok_or(sqlx::Error::RowNotFound)
    }

    /// Hydrates a batch of todos with four queries total, preserving order
    pub async fn load_many(pool: &PgPool, todos: Vec<Todo>) -> Result<Vec<Self>, sqlx::Error> {
        if todos.is_empty() {
            return Ok(Vec::new());
        }

        let todo_ids: Vec<Uuid> = todos.iter().map(|t| t.id).collect();

        let mut creator_ids: Vec<Uuid> = todos.iter().map(|t| t.created_by).collect();
        creator_ids.sort();
        creator_ids.dedup();

        let creators: HashMap<Uuid, PublicUser> = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, username, avatar_url, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(&creator_ids)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

        let tag_rows = sqlx::query_as::<_, TagLinkRow>(
            r#"
            SELECT tt.todo_id, t.id, t.name, t.color, t.text_color,
                   t.created_by, t.created_at, t.updated_at
            FROM todo_tags tt
            JOIN tags t ON t.id = tt.tag_id
            WHERE tt.todo_id = ANY($1)
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(&todo_ids)
        .fetch_all(pool)
        .await?;

        let mention_rows = sqlx::query_as::<_, MentionRow>(
            r#"
            SELECT tm.todo_id, u.id, u.name, u.email, u.username,
                   u.avatar_url, u.created_at
            FROM todo_mentions tm
            JOIN users u ON u.id = tm.user_id
            WHERE tm.todo_id = ANY($1)
            ORDER BY u.name ASC
            "#,
        )
        .bind(&todo_ids)
        .fetch_all(pool)
        .await?;

        let note_rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT n.todo_id, n.id, n.content, n.created_at,
                   u.id AS author_id, u.name AS author_name, u.email AS author_email,
                   u.username AS author_username, u.avatar_url AS author_avatar_url,
                   u.created_at AS author_created_at
            FROM notes n
            LEFT JOIN users u ON u.id = n.created_by
            WHERE n.todo_id = ANY($1)
            ORDER BY n.created_at ASC, n.id ASC
            "#,
        )
        .bind(&todo_ids)
        .fetch_all(pool)
        .await?;

        let mut tags_by_todo: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags_by_todo.entry(row.todo_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                color: row.color,
                text_color: row.text_color,
                created_by: row.created_by,
                created_at: row.created_at,
                updated_at: row.updated_at,
            });
        }

        let mut mentions_by_todo: HashMap<Uuid, Vec<PublicUser>> = HashMap::new();
        for row in mention_rows {
            mentions_by_todo
                .entry(row.todo_id)
                .or_default()
                .push(PublicUser {
                    id: row.id,
                    name: row.name,
                    email: row.email,
                    username: row.username,
                    avatar_url: row.avatar_url,
                    created_at: row.created_at,
                });
        }

        let mut notes_by_todo: HashMap<Uuid, Vec<NoteView>> = HashMap::new();
        for row in note_rows {
            let author = match (
                row.author_id,
                row.author_name,
                row.author_email,
                row.author_username,
                row.author_created_at,
            ) {
                (Some(id), Some(name), Some(email), Some(username), Some(created_at)) => {
                    Some(PublicUser {
                        id,
                        name,
                        email,
                        username,
                        avatar_url: row.author_avatar_url,
                        created_at,
                    })
                }
                _ => None,
            };

            notes_by_todo.entry(row.todo_id).or_default().push(NoteView {
                id: row.id,
                content: row.content,
                created_by: author,
                date: row.created_at,
            });
        }

        let mut views = Vec::with_capacity(todos.len());
        for todo in todos {
            let created_by = creators
                .get(&todo.created_by)
                .cloned()
                .ok_or(sqlx::Error::RowNotFound)?;

            views.push(TodoView {
                id: todo.id,
                title: todo.title,
                description: todo.description,
                priority: todo.priority,
                status: todo.status,
                completed: todo.completed,
                due_date: todo.due_date,
                tags: tags_by_todo.remove(&todo.id).unwrap_or_default(),
                mentions: mentions_by_todo.remove(&todo.id).unwrap_or_default(),
                notes: notes_by_todo.remove(&todo.id).unwrap_or_default(),
                created_by,
                created_at: todo.created_at,
                updated_at: todo.updated_at,
            });
        }

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_db_values() {
        assert_eq!(Priority::Low.as_db_str(), "low");
        assert_eq!(Priority::Medium.as_db_str(), "medium");
        assert_eq!(Priority::High.as_db_str(), "high");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Pending".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!("In Progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("in_progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("Completed".parse::<Status>().unwrap(), Status::Completed);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        // The product's original wire value for in-progress contains a space
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(serde_json::to_string(&Status::Pending).unwrap(), "\"Pending\"");

        let parsed: Status = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, Status::InProgress);
    }

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        let parsed: Priority = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(parsed, Priority::Medium);
    }

    #[test]
    fn test_base_list_sql_has_only_visibility_predicate() {
        let filter = TodoFilter::for_user(Uuid::new_v4());
        let sql = build_list_sql(&filter);

        assert!(sql.contains("created_by = $1"));
        assert!(sql.contains("m.user_id = $1"));
        assert!(!sql.contains("$2"));
        assert!(sql.ends_with("ORDER BY created_at DESC"));
    }

    #[test]
    fn test_list_sql_and_combines_all_filters() {
        let mut filter = TodoFilter::for_user(Uuid::new_v4());
        filter.priorities = vec![Priority::High, Priority::Low];
        filter.tag_ids = vec![Uuid::new_v4()];
        filter.status = Some(Status::Pending);
        filter.search = Some("deploy".to_string());

        let sql = build_list_sql(&filter);

        assert!(sql.contains("priority = ANY($2::todo_priority[])"));
        assert!(sql.contains("t.tag_id = ANY($3)"));
        assert!(sql.contains("status = $4::todo_status"));
        assert!(sql.contains("title ILIKE $5 OR description ILIKE $5"));

        // Every predicate is AND-combined on top of the visibility base
        assert_eq!(sql.matches(" AND ").count(), 6); // 2 inside subqueries, 4 top-level
    }

    #[test]
    fn test_list_sql_placeholder_order_with_gaps() {
        // Only status and search supplied: they take $2 and $3
        let mut filter = TodoFilter::for_user(Uuid::new_v4());
        filter.status = Some(Status::Completed);
        filter.search = Some("x".to_string());

        let sql = build_list_sql(&filter);

        assert!(sql.contains("status = $2::todo_status"));
        assert!(sql.contains("title ILIKE $3"));
        assert!(!sql.contains("$4"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_update_todo_has_no_creator_field() {
        // Compile-time guarantee that a patch cannot touch created_by; this
        // just documents the default shape.
        let update = UpdateTodo::default();
        assert!(update.title.is_none());
        assert!(update.mention_ids.is_none());
    }
}
