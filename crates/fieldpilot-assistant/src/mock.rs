//! A scripted in-memory assistant for tests.
//!
//! No network, no timing: run statuses are played back from a script and
//! every remote-call primitive is counted so tests can assert exactly how
//! many round trips an operation performed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{AssistantApi, MessageRole, Run, RunLastError, RunStatus, ThreadMessage};
use crate::error::AssistantError;

/// Counters for each remote-call primitive.
#[derive(Debug, Default)]
pub struct CallLog {
    threads_created: AtomicUsize,
    messages_posted: AtomicUsize,
    runs_started: AtomicUsize,
    status_queries: AtomicUsize,
    pages_listed: AtomicUsize,
}

impl CallLog {
    pub fn threads_created(&self) -> usize {
        self.threads_created.load(Ordering::SeqCst)
    }

    pub fn messages_posted(&self) -> usize {
        self.messages_posted.load(Ordering::SeqCst)
    }

    pub fn runs_started(&self) -> usize {
        self.runs_started.load(Ordering::SeqCst)
    }

    pub fn status_queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    pub fn pages_listed(&self) -> usize {
        self.pages_listed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.threads_created()
            + self.messages_posted()
            + self.runs_started()
            + self.status_queries()
            + self.pages_listed()
    }

    fn bump(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted [`AssistantApi`] implementation.
///
/// Status queries pop from the script; once only one status remains it
/// repeats forever, so a script ending in a non-terminal status models a
/// run that never finishes.
#[derive(Default)]
pub struct ScriptedAssistant {
    statuses: Mutex<VecDeque<RunStatus>>,
    run_error: Mutex<Option<String>>,
    reply_page: Mutex<Vec<ThreadMessage>>,
    fail_get_run: Mutex<Option<String>>,
    posted: Mutex<Vec<(String, String)>>,
    pub calls: CallLog,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the sequence of statuses returned by `get_run`.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    /// Attach failure detail to terminal runs, like the service's
    /// `last_error` payload.
    pub fn with_run_error(self, message: impl Into<String>) -> Self {
        *self.run_error.lock().unwrap() = Some(message.into());
        self
    }

    /// Script the newest-first message page returned by `list_messages`.
    pub fn with_page(self, page: Vec<ThreadMessage>) -> Self {
        *self.reply_page.lock().unwrap() = page;
        self
    }

    /// Convenience: a page holding a single assistant text reply.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.with_page(vec![ThreadMessage::text(
            "msg_reply",
            MessageRole::Assistant,
            text,
        )])
    }

    /// Make every `get_run` call fail with a transport error.
    pub fn failing_get_run(self, message: impl Into<String>) -> Self {
        *self.fail_get_run.lock().unwrap() = Some(message.into());
        self
    }

    /// Messages recorded by `post_message`, as `(thread_id, content)`.
    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    fn next_status(&self) -> RunStatus {
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.len() {
            0 => RunStatus::Completed,
            1 => statuses[0],
            _ => statuses.pop_front().unwrap_or(RunStatus::Completed),
        }
    }

    fn run_with_status(&self, thread_id: &str, run_id: &str, status: RunStatus) -> Run {
        let last_error = if status.is_terminal() && status != RunStatus::Completed {
            self.run_error
                .lock()
                .unwrap()
                .clone()
                .map(|message| RunLastError {
                    code: Some("server_error".to_string()),
                    message,
                })
        } else {
            None
        };
        Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            status,
            last_error,
        }
    }
}

#[async_trait]
impl AssistantApi for ScriptedAssistant {
    async fn create_thread(&self) -> Result<String, AssistantError> {
        self.calls.bump(&self.calls.threads_created);
        Ok(format!("thread_{}", self.calls.threads_created()))
    }

    async fn post_message(
        &self,
        thread_id: &str,
        _role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantError> {
        self.calls.bump(&self.calls.messages_posted);
        self.posted
            .lock()
            .unwrap()
            .push((thread_id.to_string(), content.to_string()));
        Ok(())
    }

    async fn start_run(
        &self,
        thread_id: &str,
        _assistant_id: &str,
    ) -> Result<Run, AssistantError> {
        self.calls.bump(&self.calls.runs_started);
        Ok(self.run_with_status(thread_id, "run_1", RunStatus::Queued))
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        self.calls.bump(&self.calls.status_queries);
        if let Some(message) = self.fail_get_run.lock().unwrap().clone() {
            return Err(AssistantError::UpstreamUnavailable(message));
        }
        Ok(self.run_with_status(thread_id, run_id, self.next_status()))
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        limit: usize,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        self.calls.bump(&self.calls.pages_listed);
        let page = self.reply_page.lock().unwrap();
        Ok(page.iter().take(limit).cloned().collect())
    }
}
