use serde::Serialize;

use crate::api::{ensure_thread, AssistantApi, MessageRole, RunStatus};
use crate::error::AssistantError;
use crate::poll::{wait_for_run, WaitPolicy};
use crate::reply::latest_assistant_text;

/// Result of a chat turn whose run completed.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurnOutcome {
    pub thread_id: String,
    pub status: RunStatus,
    pub answer: String,
}

/// Execute one full chat turn against the assistant service.
///
/// Resolves the thread (reusing `thread_id` when given), posts the user
/// message, starts a run with the given assistant identity, polls it to a
/// terminal state under `policy`, and extracts the newest assistant
/// reply. A run that terminates in any state other than `completed`
/// becomes [`AssistantError::RunIncomplete`], carrying the resolved
/// thread id and the run's failure detail when the service provided one.
pub async fn run_chat_turn(
    api: &dyn AssistantApi,
    assistant_id: &str,
    thread_id: Option<&str>,
    message: &str,
    policy: &WaitPolicy,
) -> Result<ChatTurnOutcome, AssistantError> {
    if message.trim().is_empty() {
        return Err(AssistantError::InvalidRequest(
            "message is required".to_string(),
        ));
    }

    let thread_id = ensure_thread(api, thread_id).await?;
    api.post_message(&thread_id, MessageRole::User, message)
        .await?;
    let run = api.start_run(&thread_id, assistant_id).await?;
    let finished = wait_for_run(api, &thread_id, &run.id, policy).await?;

    if finished.status != RunStatus::Completed {
        let message = finished
            .last_error
            .map(|e| e.message)
            .unwrap_or_else(|| "run did not complete".to_string());
        tracing::warn!(
            thread_id = %thread_id,
            status = %finished.status,
            error = %message,
            "assistant run ended without completing"
        );
        return Err(AssistantError::RunIncomplete {
            thread_id,
            status: finished.status,
            message,
        });
    }

    let answer = latest_assistant_text(api, &thread_id).await?;
    Ok(ChatTurnOutcome {
        thread_id,
        status: finished.status,
        answer,
    })
}
