use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::{
    auth::AdminUser,
    error::{is_unique_violation, ApiError},
    repositories::{
        category_repository::{self, CreateCategoryData, UpdateCategoryData},
        post_repository::{self, FeedScope},
    },
    utils::{PageParams, Paginated},
    AppState,
};

pub async fn create_category_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<CreateCategoryData>,
) -> Result<Response, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    match category_repository::create_category(&state.db_pool, payload).await {
        Ok(new_category) => {
            info!(category_id = new_category.id, created_by = admin.0.id, "successfully created category");
            Ok((StatusCode::CREATED, Json(new_category)).into_response())
        }
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::bad_request("Category title already exists"))
        }
        Err(e) => {
            error!(error = %e, "failed to create category");
            Err(e.into())
        }
    }
}

pub async fn get_category_handler(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Response, ApiError> {
    match category_repository::get_category_by_id(&state.db_pool, category_id).await? {
        Some(category) => Ok((StatusCode::OK, Json(category)).into_response()),
        None => Err(ApiError::bad_request("Category not found")),
    }
}

pub async fn list_categories_handler(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    let total = category_repository::count_categories(&state.db_pool).await?;
    let categories = category_repository::get_all_categories(&state.db_pool, &params).await?;
    let envelope = Paginated::new(params.page(), params.limit(), total as u64, categories);
    Ok((StatusCode::OK, Json(envelope)).into_response())
}

/// Handler for the feed scoped to one category.
pub async fn list_category_posts_handler(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    if category_repository::get_category_by_id(&state.db_pool, category_id)
        .await?
        .is_none()
    {
        return Err(ApiError::bad_request("Category not found"));
    }
    let scope = FeedScope::Category(category_id);
    let total = post_repository::count_feed(&state.db_pool, &scope).await?;
    let posts = post_repository::get_feed_page(&state.db_pool, &scope, &params).await?;
    let envelope = Paginated::new(params.page(), params.limit(), total as u64, posts);
    Ok((StatusCode::OK, Json(envelope)).into_response())
}

pub async fn update_category_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(category_id): Path<i64>,
    Json(payload): Json<UpdateCategoryData>,
) -> Result<Response, ApiError> {
    if category_repository::get_category_by_id(&state.db_pool, category_id)
        .await?
        .is_none()
    {
        warn!(category_id, "attempted to update non-existent category");
        return Err(ApiError::bad_request("Category not found"));
    }
    match category_repository::update_category(&state.db_pool, category_id, payload).await {
        Ok(Some(updated)) => {
            info!(category_id, updated_by = admin.0.id, "successfully updated category");
            Ok((StatusCode::OK, Json(updated)).into_response())
        }
        Ok(None) => Err(ApiError::bad_request("Category not found")),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::bad_request("Category title already exists"))
        }
        Err(e) => {
            error!(error = %e, category_id, "failed to update category");
            Err(e.into())
        }
    }
}

pub async fn delete_category_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(category_id): Path<i64>,
) -> Result<Response, ApiError> {
    let rows_affected = category_repository::delete_category(&state.db_pool, category_id).await?;
    if rows_affected == 0 {
        warn!(category_id, "attempted to delete non-existent category");
        return Err(ApiError::bad_request("Category not found"));
    }
    info!(category_id, deleted_by = admin.0.id, "successfully deleted category");
    Ok(StatusCode::NO_CONTENT.into_response())
}
