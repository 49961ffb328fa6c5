pub mod category_handlers;
pub mod comment_handlers;
pub mod post_handlers;
pub mod reaction_handlers;
pub mod star_handlers;
pub mod user_handlers;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;

/// Ownership gate applied to post and comment mutation: the author may
/// modify their own resource, an admin may modify anything.
pub(crate) fn ensure_can_modify(
    user: &AuthenticatedUser,
    author_id: i64,
) -> Result<(), ApiError> {
    if user.id == author_id || user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Permission denied"))
    }
}
