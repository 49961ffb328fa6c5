use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mime::Mime;
use tracing::{error, info, warn};

use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    models::PostStatus,
    repositories::{
        category_repository,
        post_repository::{self, CreatePostData, FeedScope, UpdatePostData},
    },
    utils::{normalize_category_ids, PageParams, Paginated},
    AppState,
};

use super::ensure_can_modify;

// --- Constants ---
const MAX_IMAGES_PER_POST: usize = 5;
const MAX_IMAGE_SIZE_MB: u64 = 10;
const MAX_IMAGE_SIZE_BYTES: u64 = MAX_IMAGE_SIZE_MB * 1024 * 1024;
const MAX_TITLE_LENGTH: usize = 255;
const MAX_CONTENT_LENGTH: usize = 20_000;

// Holds an uploaded image until validation is done and it can be written out.
#[derive(Debug)]
struct TempImageField {
    filename: Option<String>,
    #[allow(dead_code)]
    content_type: Option<Mime>,
    data: Vec<u8>,
}

// Everything a post create/update multipart form may carry. Collection is
// shape-tolerant; validation happens after the form is fully read.
#[derive(Default)]
struct CollectedPostForm {
    title: Option<String>,
    content: Option<String>,
    location: Option<String>,
    status: Option<String>,
    categories_raw: Vec<String>,
    images: Vec<TempImageField>,
    remove_images: Vec<String>,
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read {} field: {}", name, e)))
}

async fn collect_post_form(mut multipart: Multipart) -> Result<CollectedPostForm, ApiError> {
    let mut form = CollectedPostForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "multipart processing error");
                return Err(ApiError::bad_request(format!(
                    "Multipart processing error: {}",
                    e
                )));
            }
        };
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };

        match name.as_str() {
            "title" => form.title = Some(read_text_field(field, "title").await?),
            "content" => form.content = Some(read_text_field(field, "content").await?),
            "location" => form.location = Some(read_text_field(field, "location").await?),
            "status" => form.status = Some(read_text_field(field, "status").await?),
            "categories" | "categories[]" => {
                form.categories_raw
                    .push(read_text_field(field, "categories").await?);
            }
            "image" | "image[]" => {
                if form.images.len() >= MAX_IMAGES_PER_POST {
                    return Err(ApiError::bad_request(format!(
                        "Exceeded maximum number of images ({})",
                        MAX_IMAGES_PER_POST
                    )));
                }
                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().and_then(|s| s.parse::<Mime>().ok());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read image data: {}", e)))?;
                if data.len() as u64 > MAX_IMAGE_SIZE_BYTES {
                    return Err(ApiError::bad_request(format!(
                        "Image size exceeds limit ({} MB)",
                        MAX_IMAGE_SIZE_MB
                    )));
                }
                form.images.push(TempImageField {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            "remove_image" | "remove_image[]" => {
                form.remove_images
                    .push(read_text_field(field, "remove_image").await?);
            }
            _ => { /* Ignore other fields */ }
        }
    }

    Ok(form)
}

fn validate_title(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_content(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("Content cannot be empty"));
    }
    if trimmed.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Content exceeds maximum length of {} characters",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalizes the categories value and checks every id against the
/// categories table.
async fn resolve_category_ids(
    state: &AppState,
    raw: &[String],
) -> Result<Vec<i64>, ApiError> {
    let ids = normalize_category_ids(raw)?;
    let missing = category_repository::find_missing_ids(&state.db_pool, &ids).await?;
    if let Some(id) = missing.first() {
        return Err(ApiError::bad_request(format!("Unknown category id: {}", id)));
    }
    Ok(ids)
}

/// Writes the collected uploads to disk and returns their generated
/// filenames. Files written here are orphaned if a later insert fails;
/// that is logged and tolerated.
async fn save_images(
    state: &AppState,
    images: Vec<TempImageField>,
) -> Result<Vec<String>, ApiError> {
    let mut filenames = Vec::with_capacity(images.len());
    for image in images {
        let original = image.filename.clone();
        match state
            .image_storage
            .save_image(image.data.into(), image.filename)
            .await
        {
            Ok(filename) => filenames.push(filename),
            Err(e) => {
                error!(error = %e, filename = ?original, "failed to save image");
                return Err(ApiError::Internal(e.into()));
            }
        }
    }
    Ok(filenames)
}

/// Handler for the main paginated feed.
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    let scope = FeedScope::All;
    let total = post_repository::count_feed(&state.db_pool, &scope).await?;
    let posts = post_repository::get_feed_page(&state.db_pool, &scope, &params).await?;
    let envelope = Paginated::new(params.page(), params.limit(), total as u64, posts);
    Ok((StatusCode::OK, Json(envelope)).into_response())
}

/// Handler for the feed restricted to authors the requester follows.
pub async fn list_following_posts_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    let scope = FeedScope::Following(user.id);
    let total = post_repository::count_feed(&state.db_pool, &scope).await?;
    let posts = post_repository::get_feed_page(&state.db_pool, &scope, &params).await?;
    let envelope = Paginated::new(params.page(), params.limit(), total as u64, posts);
    Ok((StatusCode::OK, Json(envelope)).into_response())
}

/// Handler to get a single post with its aggregates.
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Response, ApiError> {
    match post_repository::get_post_by_id(&state.db_pool, post_id).await? {
        Some(post) => Ok((StatusCode::OK, Json(post)).into_response()),
        None => Err(ApiError::bad_request("Post not found")),
    }
}

/// Handler to list the categories associated with a post.
pub async fn list_post_categories_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Response, ApiError> {
    if post_repository::get_post_author_status(&state.db_pool, post_id)
        .await?
        .is_none()
    {
        return Err(ApiError::bad_request("Post not found"));
    }
    let categories = category_repository::get_categories_for_post(&state.db_pool, post_id).await?;
    Ok((StatusCode::OK, Json(categories)).into_response())
}

/// Handler to create a new post from a multipart form with optional image
/// uploads.
pub async fn create_post_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = collect_post_form(multipart).await?;

    let title = validate_title(
        form.title
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("Missing required field: title"))?,
    )?;
    let content = validate_content(
        form.content
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("Missing required field: content"))?,
    )?;
    let category_ids = resolve_category_ids(&state, &form.categories_raw).await?;
    let image_filenames = save_images(&state, form.images).await?;

    let data = CreatePostData {
        author_id: user.id,
        title,
        content,
        location: form.location.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
        category_ids,
        image_filenames,
    };

    match post_repository::create_post(&state.db_pool, data).await {
        Ok(post) => {
            info!(post_id = post.id, author_id = user.id, "successfully created post");
            Ok((StatusCode::CREATED, Json(post)).into_response())
        }
        Err(e) => {
            error!(error = %e, author_id = user.id, "failed to create post");
            Err(e.into())
        }
    }
}

/// Handler to update a post. Scalar fields are optional; categories carry
/// replace-all semantics; images can be added and removed in the same
/// request.
pub async fn update_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (author_id, _status) = post_repository::get_post_author_status(&state.db_pool, post_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Post not found"))?;
    ensure_can_modify(&user, author_id)?;

    let form = collect_post_form(multipart).await?;

    let title = form.title.as_deref().map(validate_title).transpose()?;
    let content = form.content.as_deref().map(validate_content).transpose()?;
    let status = form
        .status
        .as_deref()
        .map(|raw| {
            PostStatus::parse(raw.trim())
                .ok_or_else(|| ApiError::bad_request("Invalid status value"))
        })
        .transpose()?;
    let category_ids = if form.categories_raw.is_empty() {
        None
    } else {
        Some(resolve_category_ids(&state, &form.categories_raw).await?)
    };
    let add_image_filenames = save_images(&state, form.images).await?;

    let data = UpdatePostData {
        title,
        content,
        location: form.location.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
        status,
        category_ids,
        add_image_filenames,
        remove_image_filenames: form.remove_images,
    };

    let removed = post_repository::update_post(&state.db_pool, post_id, data).await?;
    for filename in &removed {
        if let Err(e) = state.image_storage.delete_image(filename).await {
            warn!(error = %e, filename = %filename, "failed to unlink removed image");
        }
    }

    match post_repository::get_post_by_id(&state.db_pool, post_id).await? {
        Some(post) => {
            info!(post_id, updated_by = user.id, "successfully updated post");
            Ok((StatusCode::OK, Json(post)).into_response())
        }
        None => Err(ApiError::bad_request("Post not found")),
    }
}

/// Handler to delete a post together with its owned image files.
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let (author_id, _status) = post_repository::get_post_author_status(&state.db_pool, post_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Post not found"))?;
    ensure_can_modify(&user, author_id)?;

    let (rows_affected, filenames) =
        post_repository::delete_post(&state.db_pool, post_id).await?;
    if rows_affected == 0 {
        warn!(post_id, deleted_by = user.id, "post vanished during delete");
        return Err(ApiError::bad_request("Post not found"));
    }

    for filename in &filenames {
        if let Err(e) = state.image_storage.delete_image(filename).await {
            warn!(error = %e, filename = %filename, "failed to unlink image of deleted post");
        }
    }

    info!(post_id, deleted_by = user.id, "successfully deleted post");
    Ok(StatusCode::NO_CONTENT.into_response())
}
