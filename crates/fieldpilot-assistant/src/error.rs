use crate::api::RunStatus;

/// Errors surfaced by the assistant orchestration core.
///
/// Nothing in this crate retries: a transport failure on any single call
/// aborts the whole turn, and the caller decides what to do with it.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Caller-supplied input was rejected before any remote call was made.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The remote assistant service could not be reached, rejected the
    /// call, or returned a body of an unexpected shape.
    #[error("assistant service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The run reached a terminal state other than `completed`.
    ///
    /// Carries the resolved thread id so a caller that triggered thread
    /// creation still learns which thread it now owns.
    #[error("run on thread {thread_id} ended {status}: {message}")]
    RunIncomplete {
        thread_id: String,
        status: RunStatus,
        message: String,
    },

    /// The caller's wait policy stopped polling before a terminal state.
    #[error("stopped waiting for run: {0}")]
    WaitAborted(String),
}
