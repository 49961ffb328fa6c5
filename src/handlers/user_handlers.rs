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
    repositories::{subscription_repository, user_repository},
    AppState,
};

/// Handler to fetch a user profile with follower/following counts.
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, ApiError> {
    match user_repository::get_profile(&state.db_pool, user_id).await? {
        Some(profile) => Ok((StatusCode::OK, Json(profile)).into_response()),
        None => Err(ApiError::bad_request("User not found")),
    }
}

pub async fn list_following_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, ApiError> {
    if !user_repository::user_exists(&state.db_pool, user_id).await? {
        return Err(ApiError::bad_request("User not found"));
    }
    let following = subscription_repository::get_following(&state.db_pool, user_id).await?;
    Ok((StatusCode::OK, Json(following)).into_response())
}

pub async fn list_followers_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, ApiError> {
    if !user_repository::user_exists(&state.db_pool, user_id).await? {
        return Err(ApiError::bad_request("User not found"));
    }
    let followers = subscription_repository::get_followers(&state.db_pool, user_id).await?;
    Ok((StatusCode::OK, Json(followers)).into_response())
}

/// Handler to follow another user.
pub async fn subscribe_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    if user_id == user.id {
        return Err(ApiError::bad_request("Cannot subscribe to yourself"));
    }
    if !user_repository::user_exists(&state.db_pool, user_id).await? {
        return Err(ApiError::bad_request("User not found"));
    }
    if subscription_repository::is_subscribed(&state.db_pool, user.id, user_id).await? {
        return Err(ApiError::bad_request("Already subscribed"));
    }
    subscription_repository::subscribe(&state.db_pool, user.id, user_id).await?;
    info!(follower_id = user.id, following_id = user_id, "subscription created");
    Ok(StatusCode::CREATED.into_response())
}

/// Handler to unfollow a user.
pub async fn unsubscribe_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let rows_affected =
        subscription_repository::unsubscribe(&state.db_pool, user.id, user_id).await?;
    if rows_affected == 0 {
        return Err(ApiError::bad_request("Subscription not found"));
    }
    info!(follower_id = user.id, following_id = user_id, "subscription removed");
    Ok(StatusCode::NO_CONTENT.into_response())
}
