use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use fieldpilot_assistant::{run_chat_turn, AssistantError, RunStatus};
use serde::{Deserialize, Serialize};

use crate::http::CHAT_TURN_PATH;
use crate::service::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    thread_id: String,
    status: RunStatus,
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route(CHAT_TURN_PATH, post(chat_turn))
}

/// One conversational turn: resolve the thread, post the message, run the
/// assistant, poll to a terminal state, extract the reply.
///
/// A run that terminates without completing answers 502 and still names
/// the resolved thread, so the caller can persist the id and retry on the
/// same conversation.
async fn chat_turn(State(st): State<AppState>, Json(req): Json<ChatTurnRequest>) -> Response {
    // Turns against an existing thread are serialized; a fresh turn has
    // no thread to contend on until the remote service assigns one.
    let _guard = match req.thread_id.as_deref() {
        Some(id) if !id.trim().is_empty() => {
            Some(st.thread_locks.lock_for(id).await.lock_owned().await)
        }
        _ => None,
    };

    let outcome = run_chat_turn(
        st.assistant.as_ref(),
        &st.config.chat_assistant_id,
        req.thread_id.as_deref(),
        &req.message,
        &st.wait,
    )
    .await;

    match outcome {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ChatTurnResponse {
                thread_id: outcome.thread_id,
                status: outcome.status,
                answer: outcome.answer,
                error: None,
            }),
        )
            .into_response(),
        Err(AssistantError::RunIncomplete {
            thread_id,
            status,
            message,
        }) => (
            StatusCode::BAD_GATEWAY,
            Json(ChatTurnResponse {
                thread_id,
                status,
                answer: String::new(),
                error: Some(message),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
