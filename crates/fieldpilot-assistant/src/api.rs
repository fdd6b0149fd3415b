use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AssistantError;

/// Lifecycle status reported by the assistant service for a run.
///
/// Any status string this client does not recognize lands in `Other` and
/// is treated as non-terminal: polling stops only on the four states the
/// service documents as final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Expired,
    #[serde(other)]
    Other,
}

impl RunStatus {
    /// Whether polling should stop at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Other => "other",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure detail attached to a run by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLastError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// A single assistant invocation against a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunLastError>,
}

/// Author of a thread message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Text payload of a `text`-kind content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
}

/// One content block of a thread message.
///
/// Parsed structurally rather than as a tagged enum: only `text` blocks
/// are ever consumed, everything else keeps its kind string and nothing
/// more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(TextContent {
                value: value.into(),
            }),
        }
    }

    /// A block of some non-text kind, e.g. `image_file`.
    pub fn other(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: None,
        }
    }
}

/// A role-tagged message belonging to a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl ThreadMessage {
    pub fn text(id: impl Into<String>, role: MessageRole, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: vec![ContentBlock::text(value)],
        }
    }
}

/// The primitive remote calls this crate orchestrates.
///
/// Implemented over HTTP by [`crate::http::HttpAssistantClient`] and by
/// the scripted mock in [`crate::mock`]. Every call is a distinct network
/// round trip; nothing is cached locally.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Request a new conversation thread and return its id.
    async fn create_thread(&self) -> Result<String, AssistantError>;

    /// Append a message to a thread. Blank content is rejected locally.
    async fn post_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantError>;

    /// Start a run against a thread using the given assistant identity.
    async fn start_run(&self, thread_id: &str, assistant_id: &str)
        -> Result<Run, AssistantError>;

    /// Fetch the current state of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    /// Fetch at most `limit` messages from a thread, newest first.
    async fn list_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<ThreadMessage>, AssistantError>;
}

/// Reuse an existing thread id untouched, or create a new thread remotely.
///
/// An existing id is returned as-is with no validation round trip; the
/// service is only contacted when no usable id is supplied.
pub async fn ensure_thread(
    api: &dyn AssistantApi,
    existing: Option<&str>,
) -> Result<String, AssistantError> {
    match existing {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => api.create_thread().await,
    }
}
