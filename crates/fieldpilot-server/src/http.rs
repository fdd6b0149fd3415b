use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::api;
pub use crate::service::AppState;

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";
/// Chat turn orchestration endpoint path.
pub const CHAT_TURN_PATH: &str = "/chat-turn";
/// Field collection path.
pub const FIELDS_PATH: &str = "/fields";
/// Single field path.
pub const FIELD_PATH: &str = "/fields/:id";
/// Field action log path.
pub const FIELD_ACTIONS_PATH: &str = "/fields/:id/actions";
/// Field chat history path.
pub const FIELD_MESSAGES_PATH: &str = "/fields/:id/messages";
/// Goal collection path.
pub const GOALS_PATH: &str = "/goals";
/// Post collection path.
pub const POSTS_PATH: &str = "/posts";

/// Build health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health))
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(api::chat::routes())
        .merge(api::fields::routes())
        .merge(api::goals::routes())
        .merge(api::posts::routes())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}
