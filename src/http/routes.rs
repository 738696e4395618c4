use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        create_comment_handler, delete_comment_handler, get_all_comments_handler,
        get_guestbook_handler, get_media_comments_handler, get_rating_handler, health_handler,
        sign_guestbook_handler, submit_rating_handler,
    },
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/ratings", post(submit_rating_handler))
        .route("/api/ratings/{item_id}", get(get_rating_handler))
        .route(
            "/api/comments",
            get(get_all_comments_handler).post(create_comment_handler),
        )
        // GET takes a media title, DELETE a comment id.
        .route(
            "/api/comments/{key}",
            get(get_media_comments_handler).delete(delete_comment_handler),
        )
        .route(
            "/api/guestbook",
            get(get_guestbook_handler).post(sign_guestbook_handler),
        )
        .with_state(state)
}
