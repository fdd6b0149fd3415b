//! Client-side orchestration of the remote assistant service.
//!
//! The workflow is always the same: ensure a conversation thread exists,
//! append the user message, start a run, poll the run until it reaches a
//! terminal state, then read the newest assistant reply back out of the
//! thread. [`turn::run_chat_turn`] ties those steps together; the pieces
//! are exposed individually for callers that need only part of the flow.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod poll;
pub mod reply;
pub mod turn;

pub use api::{ensure_thread, AssistantApi, MessageRole, Run, RunStatus};
pub use config::{AssistantConfig, ConfigError};
pub use error::AssistantError;
pub use http::HttpAssistantClient;
pub use poll::{wait_for_run, WaitPolicy};
pub use reply::latest_assistant_text;
pub use turn::{run_chat_turn, ChatTurnOutcome};
