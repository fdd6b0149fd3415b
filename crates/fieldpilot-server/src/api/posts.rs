use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use fieldpilot_store::Post;
use serde::Deserialize;

use crate::http::POSTS_PATH;
use crate::service::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route(POSTS_PATH, get(list_posts).post(create_post))
}

#[derive(Debug, Deserialize)]
struct CreatePostRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

async fn list_posts(State(st): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(st.store.list_posts().await?))
}

async fn create_post(
    State(st): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    }
    let post = st.store.create_post(req.title, req.content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}
