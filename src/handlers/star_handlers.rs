use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    repositories::{
        post_repository,
        star_repository::{self, TransferOutcome},
    },
    AppState,
};

#[derive(Deserialize)]
pub struct GiveStarsPayload {
    pub stars: i64,
}

/// Handler to transfer stars from the requester to a post's author. The
/// debit, ledger insert, and credit are one atomic unit.
pub async fn give_stars_handler(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: AuthenticatedUser,
    Json(payload): Json<GiveStarsPayload>,
) -> Result<Response, ApiError> {
    if payload.stars <= 0 {
        return Err(ApiError::bad_request("Stars amount must be positive"));
    }

    let (author_id, _status) = post_repository::get_post_author_status(&state.db_pool, post_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Post not found"))?;

    if author_id == user.id {
        return Err(ApiError::bad_request("Cannot send stars to your own post"));
    }

    if star_repository::has_starred(&state.db_pool, post_id, user.id).await? {
        return Err(ApiError::bad_request("Stars already sent for this post"));
    }

    match star_repository::transfer_stars(&state.db_pool, post_id, user.id, author_id, payload.stars)
        .await?
    {
        TransferOutcome::Applied(entry) => {
            info!(
                post_id,
                giver_id = user.id,
                author_id,
                stars = payload.stars,
                "stars transferred"
            );
            Ok((StatusCode::CREATED, Json(entry)).into_response())
        }
        TransferOutcome::InsufficientBalance => {
            Err(ApiError::bad_request("Insufficient stars"))
        }
    }
}
