use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::{AssistantApi, Run};
use crate::error::AssistantError;

/// How long and how often [`wait_for_run`] polls a run.
///
/// The default reproduces the service's documented behavior: query once a
/// second until the run reaches a terminal state, with no upper bound.
/// Callers that cannot wait forever set `max_wait` or hold the
/// cancellation token.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    /// Pause between consecutive status queries.
    pub interval: Duration,
    /// Stop waiting after this much wall-clock time.
    pub max_wait: Option<Duration>,
    /// External cancellation hook; polling stops when triggered.
    pub cancel: CancellationToken,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Poll a run until it reaches a terminal state.
///
/// Each iteration is one status query; a transport error on any query is
/// fatal and propagates immediately. There is no retry between failed
/// queries, only the pause between successful non-terminal ones.
pub async fn wait_for_run(
    api: &dyn AssistantApi,
    thread_id: &str,
    run_id: &str,
    policy: &WaitPolicy,
) -> Result<Run, AssistantError> {
    let deadline = policy.max_wait.map(|d| tokio::time::Instant::now() + d);

    loop {
        let run = api.get_run(thread_id, run_id).await?;
        if run.status.is_terminal() {
            tracing::debug!(run_id = %run.id, status = %run.status, "run finished");
            return Ok(run);
        }
        tracing::debug!(run_id = %run.id, status = %run.status, "waiting for run");

        if policy.cancel.is_cancelled() {
            return Err(AssistantError::WaitAborted(format!(
                "cancelled while run {run_id} was {}",
                run.status
            )));
        }
        if let Some(deadline) = deadline {
            if tokio::time::Instant::now() >= deadline {
                return Err(AssistantError::WaitAborted(format!(
                    "run {run_id} still {} after {:?}",
                    run.status,
                    policy.max_wait.unwrap_or_default()
                )));
            }
        }

        tokio::select! {
            _ = policy.cancel.cancelled() => {
                return Err(AssistantError::WaitAborted(format!(
                    "cancelled while run {run_id} was {}",
                    run.status
                )));
            }
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
}
