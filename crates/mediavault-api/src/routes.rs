//! Router wiring.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, media_delete, media_get, media_upload, users};
use crate::state::AppState;

async fn root() -> Json<Value> {
    Json(json!({ "message": "mediavault API" }))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // The multipart body has to fit the largest accepted upload plus
    // form-field overhead.
    let body_limit = state.config.max_video_size_bytes + 1024 * 1024;

    Router::new()
        .route("/", get(root))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/media", get(media_get::list_media))
        .route("/media/images", post(media_upload::upload_image))
        .route("/media/videos", post(media_upload::upload_video))
        .route("/media/audio", post(media_upload::upload_audio))
        .route(
            "/media/{id}",
            get(media_get::get_media).delete(media_delete::delete_media),
        )
        .route("/media/{id}/url", get(media_get::media_url))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
