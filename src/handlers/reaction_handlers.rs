use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    repositories::{
        post_repository,
        reaction_repository::{self, ReactionKind},
    },
    AppState,
};

async fn ensure_post_exists(state: &AppState, post_id: i64) -> Result<(), ApiError> {
    match post_repository::get_post_author_status(&state.db_pool, post_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::bad_request("Post not found")),
    }
}

async fn list_reactions(
    state: &AppState,
    post_id: i64,
    kind: ReactionKind,
) -> Result<Response, ApiError> {
    ensure_post_exists(state, post_id).await?;
    let entries = reaction_repository::list_for_post(&state.db_pool, kind, post_id).await?;
    Ok((StatusCode::OK, Json(entries)).into_response())
}

async fn create_reaction(
    state: &AppState,
    post_id: i64,
    user: &AuthenticatedUser,
    kind: ReactionKind,
) -> Result<Response, ApiError> {
    ensure_post_exists(state, post_id).await?;
    if reaction_repository::exists(&state.db_pool, kind, post_id, user.id).await? {
        return Err(ApiError::bad_request(format!(
            "{} already exists",
            kind.noun()
        )));
    }
    reaction_repository::insert(&state.db_pool, kind, post_id, user.id).await?;
    info!(post_id, user_id = user.id, kind = kind.noun(), "reaction created");
    Ok(StatusCode::CREATED.into_response())
}

async fn delete_reaction(
    state: &AppState,
    post_id: i64,
    user: &AuthenticatedUser,
    kind: ReactionKind,
) -> Result<Response, ApiError> {
    ensure_post_exists(state, post_id).await?;
    let rows_affected =
        reaction_repository::delete(&state.db_pool, kind, post_id, user.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::bad_request(format!("{} not found", kind.noun())));
    }
    info!(post_id, user_id = user.id, kind = kind.noun(), "reaction removed");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn list_likes_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Response, ApiError> {
    list_reactions(&state, post_id, ReactionKind::Like).await
}

pub async fn create_like_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    create_reaction(&state, post_id, &user, ReactionKind::Like).await
}

pub async fn delete_like_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    delete_reaction(&state, post_id, &user, ReactionKind::Like).await
}

pub async fn list_reposts_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Response, ApiError> {
    list_reactions(&state, post_id, ReactionKind::Repost).await
}

pub async fn create_repost_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    create_reaction(&state, post_id, &user, ReactionKind::Repost).await
}

pub async fn delete_repost_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    delete_reaction(&state, post_id, &user, ReactionKind::Repost).await
}
