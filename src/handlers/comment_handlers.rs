use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    models::PostStatus,
    repositories::{
        comment_repository::{self, CreateCommentData},
        post_repository,
    },
    utils::CommentListParams,
    AppState,
};

use super::ensure_can_modify;

const MAX_COMMENT_LENGTH: usize = 5_000;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    pub content: String,
    pub parent_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateCommentPayload {
    pub content: String,
}

fn validate_comment_content(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("Content cannot be empty"));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Content exceeds maximum length of {} characters",
            MAX_COMMENT_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Handler to list a post's comments with whitelisted sorting.
pub async fn list_comments_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(params): Query<CommentListParams>,
) -> Result<Response, ApiError> {
    if post_repository::get_post_author_status(&state.db_pool, post_id)
        .await?
        .is_none()
    {
        return Err(ApiError::bad_request("Post not found"));
    }
    let comments =
        comment_repository::get_comments_by_post(&state.db_pool, post_id, &params).await?;
    Ok((StatusCode::OK, Json(comments)).into_response())
}

/// Handler to create a comment, optionally as a reply to another comment of
/// the same post. Inactive posts reject new comments.
pub async fn create_comment_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCommentPayload>,
) -> Result<Response, ApiError> {
    let (_author_id, status) = post_repository::get_post_author_status(&state.db_pool, post_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Post not found"))?;
    if status == PostStatus::Inactive {
        return Err(ApiError::bad_request("Cannot comment on an inactive post"));
    }

    let content = validate_comment_content(&payload.content)?;

    if let Some(parent_id) = payload.parent_id {
        match comment_repository::get_comment_by_id(&state.db_pool, parent_id).await? {
            Some(parent) if parent.post_id == post_id => {}
            _ => return Err(ApiError::bad_request("Parent comment not found")),
        }
    }

    let comment = comment_repository::create_comment(
        &state.db_pool,
        post_id,
        CreateCommentData {
            author_id: user.id,
            content,
            parent_id: payload.parent_id,
        },
    )
    .await?;

    info!(comment_id = comment.id, post_id, author_id = user.id, "successfully created comment");
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

/// Handler to get a single comment.
pub async fn get_comment_handler(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<Response, ApiError> {
    match comment_repository::get_comment_by_id(&state.db_pool, comment_id).await? {
        Some(comment) => Ok((StatusCode::OK, Json(comment)).into_response()),
        None => Err(ApiError::bad_request("Comment not found")),
    }
}

/// Handler to update a comment's content.
pub async fn update_comment_handler(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateCommentPayload>,
) -> Result<Response, ApiError> {
    let existing = comment_repository::get_comment_by_id(&state.db_pool, comment_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Comment not found"))?;
    ensure_can_modify(&user, existing.author_id)?;

    let content = validate_comment_content(&payload.content)?;
    match comment_repository::update_comment(&state.db_pool, comment_id, &content).await? {
        Some(comment) => {
            info!(comment_id, updated_by = user.id, "successfully updated comment");
            Ok((StatusCode::OK, Json(comment)).into_response())
        }
        None => Err(ApiError::bad_request("Comment not found")),
    }
}

/// Handler to delete a comment.
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let existing = comment_repository::get_comment_by_id(&state.db_pool, comment_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Comment not found"))?;
    ensure_can_modify(&user, existing.author_id)?;

    let rows_affected = comment_repository::delete_comment(&state.db_pool, comment_id).await?;
    if rows_affected == 0 {
        return Err(ApiError::bad_request("Comment not found"));
    }
    info!(comment_id, deleted_by = user.id, "successfully deleted comment");
    Ok(StatusCode::NO_CONTENT.into_response())
}
