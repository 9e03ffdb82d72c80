/// Todo endpoints
///
/// The todo collection is permissioned per user: reads are allowed for the
/// creator and for anyone mentioned on the todo; writes and deletes are
/// creator-only; notes may be appended by anyone with read access.
///
/// Read endpoints accept an optional `userId` query parameter that evaluates
/// the request as that user instead (view-as). The override applies to reads
/// only; mutations always act as the authenticated user.
///
/// # Endpoints
///
/// - `GET    /api/todos` - List visible todos, filterable
/// - `POST   /api/todos` - Create a todo
/// - `GET    /api/todos/:id` - Fetch one todo
/// - `PATCH  /api/todos/:id` - Update a todo (creator only)
/// - `DELETE /api/todos/:id` - Delete a todo (creator only)
/// - `POST   /api/todos/:id/notes` - Append a note
///
/// # Filtering
///
/// `GET /api/todos?priority=High,Medium&tags=<uuid>,<uuid>&status=Pending&search=deploy`
///
/// Multi-value parameters are comma-separated. All supplied filters are
/// AND-combined on top of the visibility predicate.

use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult},
    response::{success, success_with_results},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use cotodo_shared::models::{
    note::Note,
    todo::{CreateTodo, Priority, Status, Todo, TodoFilter, TodoView, UpdateTodo},
    user::User,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for the list endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosQuery {
    /// Evaluate the request as this user (read-only override)
    pub user_id: Option<Uuid>,

    /// Comma-separated priorities, e.g. `High,Medium`
    pub priority: Option<String>,

    /// Comma-separated tag ids
    pub tags: Option<String>,

    /// Exact status, e.g. `In Progress`
    pub status: Option<String>,

    /// Case-insensitive substring over title and description
    pub search: Option<String>,
}

/// Query parameters for single-todo reads
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAsQuery {
    /// Evaluate the request as this user (read-only override)
    pub user_id: Option<Uuid>,
}

/// Body for creating a todo
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    /// Short title
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Priority, defaults to Medium
    pub priority: Option<Priority>,

    /// Status, defaults to Pending
    pub status: Option<Status>,

    /// Completion flag, defaults to false
    #[serde(default)]
    pub completed: bool,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Tag ids to attach
    #[serde(default)]
    pub tags: Vec<Uuid>,

    /// Users to mention: user ids or `@username` handles
    #[serde(default)]
    pub mentions: Vec<String>,
}

/// Body for updating a todo
///
/// Absent fields are untouched. `description` and `dueDate` distinguish
/// absent from explicit `null`: null clears the field. The creator is not
/// accepted here at all, so it cannot be reassigned.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub priority: Option<Priority>,

    pub status: Option<Status>,

    pub completed: Option<bool>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// Replaces the tag set wholesale when present
    pub tags: Option<Vec<Uuid>>,

    /// Replaces the mention set wholesale when present
    pub mentions: Option<Vec<String>>,
}

/// Body for appending a note
#[derive(Debug, Deserialize, Validate)]
pub struct AddNoteRequest {
    /// Free-text content
    #[validate(length(min = 1, message = "Note content is required"))]
    pub content: String,
}

/// Wraps a present value in Some so `null` and absent stay distinguishable
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Resolves the effective user for a read: the `userId` override when
/// supplied, otherwise the authenticated user
///
/// # Errors
///
/// Returns 404 if the override names a user that does not exist.
async fn resolve_viewer(
    state: &AppState,
    current: &User,
    override_id: Option<Uuid>,
) -> ApiResult<Uuid> {
    match override_id {
        Some(id) if id != current.id => {
            User::find_by_id(&state.db, id)
                .await?
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
            Ok(id)
        }
        _ => Ok(current.id),
    }
}

fn parse_priorities(raw: &str) -> ApiResult<Vec<Priority>> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<Priority>()
                .map_err(ApiError::BadRequest)
        })
        .collect()
}

fn parse_tag_ids(raw: &str) -> ApiResult<Vec<Uuid>> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<Uuid>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid tag id: {}", s.trim())))
        })
        .collect()
}

/// List todos visible to the effective user, newest first
///
/// # Errors
///
/// - `400 Bad Request`: Malformed filter value
/// - `404 Not Found`: `userId` override names an unknown user
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Query(query): Query<ListTodosQuery>,
) -> ApiResult<Json<Value>> {
    let viewer = resolve_viewer(&state, &current, query.user_id).await?;

    let mut filter = TodoFilter::for_user(viewer);

    if let Some(raw) = &query.priority {
        filter.priorities = parse_priorities(raw)?;
    }
    if let Some(raw) = &query.tags {
        filter.tag_ids = parse_tag_ids(raw)?;
    }
    if let Some(raw) = &query.status {
        filter.status = Some(raw.parse::<Status>().map_err(ApiError::BadRequest)?);
    }
    if let Some(search) = &query.search {
        let trimmed = search.trim();
        if !trimmed.is_empty() {
            filter.search = Some(trimmed.to_string());
        }
    }

    let todos = Todo::list(&state.db, filter).await?;
    let views = TodoView::load_many(&state.db, todos).await?;

    Ok(success_with_results("todos", views))
}

/// Fetch a single todo
///
/// # Errors
///
/// - `404 Not Found`: No such todo
/// - `403 Forbidden`: The effective user is neither creator nor mentioned
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<ViewAsQuery>,
) -> ApiResult<Json<Value>> {
    let viewer = resolve_viewer(&state, &current, query.user_id).await?;

    let todo = Todo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;

    if !todo.is_accessible_by(&state.db, viewer).await? {
        return Err(ApiError::Forbidden(
            "You do not have access to this todo".to_string(),
        ));
    }

    let view = TodoView::load(&state.db, todo).await?;
    Ok(success("todo", view))
}

/// Create a todo
///
/// The creator is always the authenticated user. Mention entries may be user
/// ids or `@username` handles; an entry that resolves to no user fails the
/// whole request.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, unknown mention, or unknown tag id
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate().map_err(|e| validation_error(&e))?;

    let mention_ids = User::resolve_mentions(&state.db, &req.mentions).await?;

    let todo = Todo::create(
        &state.db,
        CreateTodo {
            title: req.title,
            description: req.description,
            priority: req.priority.unwrap_or(Priority::Medium),
            status: req.status.unwrap_or(Status::Pending),
            completed: req.completed,
            due_date: req.due_date,
            tag_ids: req.tags,
            mention_ids,
        },
        current.id,
    )
    .await?;

    tracing::debug!(todo_id = %todo.id, user_id = %current.id, "todo created");

    let view = TodoView::load(&state.db, todo).await?;
    Ok((StatusCode::CREATED, success("todo", view)))
}

/// Update a todo (creator only)
///
/// Replacing `mentions` replaces read grants: users removed from the list
/// immediately lose access and the todo leaves their assigned set.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown mention
/// - `404 Not Found`: No such todo
/// - `403 Forbidden`: Authenticated user is not the creator
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> ApiResult<Json<Value>> {
    req.validate().map_err(|e| validation_error(&e))?;

    let todo = Todo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;

    if !todo.is_created_by(current.id) {
        return Err(ApiError::Forbidden(
            "Only the creator may update a todo".to_string(),
        ));
    }

    let mention_ids = match &req.mentions {
        Some(mentions) => Some(User::resolve_mentions(&state.db, mentions).await?),
        None => None,
    };

    let updated = Todo::update(
        &state.db,
        id,
        UpdateTodo {
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            completed: req.completed,
            due_date: req.due_date,
            tag_ids: req.tags,
            mention_ids,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;

    let view = TodoView::load(&state.db, updated).await?;
    Ok(success("todo", view))
}

/// Delete a todo (creator only)
///
/// # Errors
///
/// - `404 Not Found`: No such todo
/// - `403 Forbidden`: Authenticated user is not the creator
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let todo = Todo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;

    if !todo.is_created_by(current.id) {
        return Err(ApiError::Forbidden(
            "Only the creator may delete a todo".to_string(),
        ));
    }

    Todo::delete(&state.db, id).await?;

    tracing::debug!(todo_id = %id, user_id = %current.id, "todo deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Append a note to a todo
///
/// Anyone with read access (creator or mentioned) may append. Notes are
/// immutable once written. Returns the hydrated todo with the new note in
/// place.
///
/// # Errors
///
/// - `400 Bad Request`: Empty content
/// - `404 Not Found`: No such todo
/// - `403 Forbidden`: Authenticated user has no access to the todo
pub async fn add_note(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddNoteRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate().map_err(|e| validation_error(&e))?;

    let todo = Todo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;

    if !todo.is_accessible_by(&state.db, current.id).await? {
        return Err(ApiError::Forbidden(
            "You do not have access to this todo".to_string(),
        ));
    }

    Note::append(&state.db, id, &req.content, current.id).await?;

    let view = TodoView::load(&state.db, todo).await?;
    Ok((StatusCode::CREATED, success("todo", view)))
}
