use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fieldpilot_assistant::{AssistantApi, AssistantConfig, AssistantError, WaitPolicy};
use fieldpilot_store::{RecordStore, StoreError};
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub assistant: Arc<dyn AssistantApi>,
    pub config: Arc<AssistantConfig>,
    pub wait: WaitPolicy,
    pub thread_locks: Arc<ThreadLockRegistry>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    /// The assistant run terminated without completing.
    #[error("{0}")]
    Upstream(String),

    /// Anything unexpected. The detail is logged, never echoed.
    #[error("an internal server error occurred")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (code, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound("Field".to_string()),
            StoreError::InvalidId(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(e: AssistantError) -> Self {
        match e {
            AssistantError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            AssistantError::RunIncomplete { message, .. } => ApiError::Upstream(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Serializes chat turns per conversation thread.
///
/// Two concurrent turns against the same thread would otherwise
/// interleave their message/run pairs at the remote service, leaving the
/// reply order undefined. Distinct threads never contend.
#[derive(Default)]
pub struct ThreadLockRegistry {
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl ThreadLockRegistry {
    pub async fn lock_for(&self, thread_id: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(thread_id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(thread_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
