use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{models::Role, repositories::user_repository, AppState};

// Session handling lives in an upstream gateway; requests arrive with the
// resolved identity in this header. The extractor only checks that the id
// maps to a real account and loads its role.
const HEADER_USER_ID: &str = "x-user-id";

/// The verified identity of the requester.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Error, Clone)]
pub enum AuthError {
    #[error("Missing or invalid identity header")]
    MissingOrInvalidHeader,

    #[error("Unknown user")]
    UnknownUser,

    #[error("Admin access required")]
    NotAdmin,

    #[error("Internal server error during authentication")]
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingOrInvalidHeader => StatusCode::UNAUTHORIZED,
            AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::NotAdmin => StatusCode::FORBIDDEN,
            AuthError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let raw = parts
            .headers
            .get(HEADER_USER_ID)
            .ok_or(AuthError::MissingOrInvalidHeader)?
            .to_str()
            .map_err(|_| AuthError::MissingOrInvalidHeader)?;

        let user_id: i64 = raw
            .trim()
            .parse()
            .map_err(|_| AuthError::MissingOrInvalidHeader)?;

        let user = user_repository::get_auth_user(&app_state.db_pool, user_id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id, "failed to resolve identity header");
                AuthError::InternalError
            })?;

        user.ok_or(AuthError::UnknownUser)
    }
}

/// Wrapper extractor admitting only users with the ADMIN role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(AdminUser(user))
        } else {
            Err(AuthError::NotAdmin)
        }
    }
}
