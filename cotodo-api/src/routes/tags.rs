/// Tag endpoints
///
/// Tags are a single global registry: every authenticated user sees every
/// tag, and tag names are unique case-insensitively. Update and delete are
/// restricted to the tag's creator; tags whose creator account was removed
/// may be edited by anyone.
///
/// # Endpoints
///
/// - `GET    /api/tags` - List all tags
/// - `POST   /api/tags` - Create a tag
/// - `PATCH  /api/tags/:id` - Update a tag (creator only)
/// - `DELETE /api/tags/:id` - Delete a tag (creator only)

use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult},
    response::{success, success_with_results},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use cotodo_shared::models::tag::{CreateTag, Tag, UpdateTag};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Body for creating a tag
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    /// Tag name, unique case-insensitively
    #[validate(length(min = 1, max = 64, message = "Tag name must be 1-64 characters"))]
    pub name: String,

    /// Background color, defaults server-side
    pub color: Option<String>,

    /// Text color, defaults server-side
    pub text_color: Option<String>,
}

/// Body for updating a tag
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagRequest {
    #[validate(length(min = 1, max = 64, message = "Tag name must be 1-64 characters"))]
    pub name: Option<String>,

    pub color: Option<String>,

    pub text_color: Option<String>,
}

/// List all tags, oldest first
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(CurrentUser(_current)): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let tags = Tag::list(&state.db).await?;
    Ok(success_with_results("tags", tags))
}

/// Create a tag
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: A tag with this name already exists
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(req): Json<CreateTagRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate().map_err(|e| validation_error(&e))?;

    let tag = Tag::create(
        &state.db,
        CreateTag {
            name: req.name,
            color: req.color,
            text_color: req.text_color,
        },
        current.id,
    )
    .await?;

    Ok((StatusCode::CREATED, success("tag", tag)))
}

/// Update a tag (creator only)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: No such tag
/// - `403 Forbidden`: Authenticated user is not the creator
/// - `409 Conflict`: The new name collides with an existing tag
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTagRequest>,
) -> ApiResult<Json<Value>> {
    req.validate().map_err(|e| validation_error(&e))?;

    let tag = Tag::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    if !tag.is_editable_by(current.id) {
        return Err(ApiError::Forbidden(
            "Only the creator may update a tag".to_string(),
        ));
    }

    let updated = Tag::update(
        &state.db,
        id,
        UpdateTag {
            name: req.name,
            color: req.color,
            text_color: req.text_color,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(success("tag", updated))
}

/// Delete a tag (creator only)
///
/// Removes the tag from every todo that carries it; the todos themselves are
/// untouched.
///
/// # Errors
///
/// - `404 Not Found`: No such tag
/// - `403 Forbidden`: Authenticated user is not the creator
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let tag = Tag::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    if !tag.is_editable_by(current.id) {
        return Err(ApiError::Forbidden(
            "Only the creator may delete a tag".to_string(),
        ));
    }

    Tag::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tag_request_rejects_empty_name() {
        let req = CreateTagRequest {
            name: String::new(),
            color: None,
            text_color: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_tag_request_allows_partial_body() {
        let req: UpdateTagRequest = serde_json::from_str(r##"{"color": "#ff0000"}"##).unwrap();
        assert!(req.name.is_none());
        assert_eq!(req.color.as_deref(), Some("#ff0000"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_tag_request_uses_camel_case() {
        let req: UpdateTagRequest =
            serde_json::from_str(r##"{"textColor": "#ffffff"}"##).unwrap();
        assert_eq!(req.text_color.as_deref(), Some("#ffffff"));
    }
}
