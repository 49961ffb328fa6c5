use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeder;
pub mod storage;
pub mod utils;

use handlers::{
    category_handlers::{
        create_category_handler, delete_category_handler, get_category_handler,
        list_categories_handler, list_category_posts_handler, update_category_handler,
    },
    comment_handlers::{
        create_comment_handler, delete_comment_handler, get_comment_handler,
        list_comments_handler, update_comment_handler,
    },
    post_handlers::{
        create_post_handler, delete_post_handler, get_post_handler,
        list_following_posts_handler, list_post_categories_handler, list_posts_handler,
        update_post_handler,
    },
    reaction_handlers::{
        create_like_handler, create_repost_handler, delete_like_handler, delete_repost_handler,
        list_likes_handler, list_reposts_handler,
    },
    star_handlers::give_stars_handler,
    user_handlers::{
        get_user_handler, list_followers_handler, list_following_handler, subscribe_handler,
        unsubscribe_handler,
    },
};

use storage::LocalImageStorage;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub image_storage: LocalImageStorage,
}

/// Builds the application router over the given pool and upload directory.
pub fn create_router(db_pool: SqlitePool, upload_dir: String, upload_base_url: String) -> Router {
    let image_storage = LocalImageStorage::new(upload_dir.clone(), upload_base_url);

    let app_state = AppState {
        db_pool,
        image_storage,
    };

    let static_service = ServeDir::new(PathBuf::from(&upload_dir));

    // Request body cap covering the largest allowed multipart upload.
    const MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

    Router::new()
        .route("/posts", get(list_posts_handler).post(create_post_handler))
        .route("/posts/following", get(list_following_posts_handler))
        .route(
            "/posts/:post_id",
            get(get_post_handler)
                .patch(update_post_handler)
                .delete(delete_post_handler),
        )
        .route(
            "/posts/:post_id/like",
            get(list_likes_handler)
                .post(create_like_handler)
                .delete(delete_like_handler),
        )
        .route(
            "/posts/:post_id/repost",
            get(list_reposts_handler)
                .post(create_repost_handler)
                .delete(delete_repost_handler),
        )
        .route("/posts/:post_id/star", post(give_stars_handler))
        .route(
            "/posts/:post_id/comments",
            get(list_comments_handler).post(create_comment_handler),
        )
        .route("/posts/:post_id/categories", get(list_post_categories_handler))
        .route(
            "/comments/:comment_id",
            get(get_comment_handler)
                .patch(update_comment_handler)
                .delete(delete_comment_handler),
        )
        .route(
            "/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/categories/:category_id",
            get(get_category_handler)
                .patch(update_category_handler)
                .delete(delete_category_handler),
        )
        .route("/categories/:category_id/posts", get(list_category_posts_handler))
        .route("/users/:user_id", get(get_user_handler))
        .route("/users/:user_id/following", get(list_following_handler))
        .route("/users/:user_id/followers", get(list_followers_handler))
        .route(
            "/users/:user_id/subscribe",
            post(subscribe_handler).delete(unsubscribe_handler),
        )
        .nest_service(&app_state.image_storage.base_url, static_service)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
}
