use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::api::{AssistantApi, MessageRole, Run, ThreadMessage};
use crate::config::AssistantConfig;
use crate::error::AssistantError;

const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "assistants=v2";
const ERROR_BODY_PREVIEW: usize = 500;

/// HTTP client for the hosted assistant service.
///
/// Response bodies are parsed into typed shapes right here at the
/// boundary; a transport error, a non-2xx status, or a body that does not
/// match the expected shape all surface as
/// [`AssistantError::UpstreamUnavailable`].
pub struct HttpAssistantClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CreatedThread {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    #[allow(dead_code)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    data: Vec<ThreadMessage>,
}

impl HttpAssistantClient {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request with auth headers applied and decode the JSON body.
    async fn decode<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, AssistantError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VALUE)
            .send()
            .await
            .map_err(|e| AssistantError::UpstreamUnavailable(format!("{what}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::UpstreamUnavailable(format!(
                "{what}: status {status}: {}",
                preview(&body)
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AssistantError::UpstreamUnavailable(format!("{what}: unexpected response shape: {e}"))
        })
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl AssistantApi for HttpAssistantClient {
    async fn create_thread(&self) -> Result<String, AssistantError> {
        let thread: CreatedThread = self
            .decode(self.http.post(self.url("threads")), "create thread")
            .await?;
        tracing::debug!(thread_id = %thread.id, "thread created");
        Ok(thread.id)
    }

    async fn post_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantError> {
        if content.trim().is_empty() {
            return Err(AssistantError::InvalidRequest(
                "message content cannot be empty".to_string(),
            ));
        }
        let _: CreatedMessage = self
            .decode(
                self.http
                    .post(self.url(&format!("threads/{thread_id}/messages")))
                    .json(&json!({ "role": role, "content": content })),
                "post message",
            )
            .await?;
        Ok(())
    }

    async fn start_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<Run, AssistantError> {
        let run: Run = self
            .decode(
                self.http
                    .post(self.url(&format!("threads/{thread_id}/runs")))
                    .json(&json!({ "assistant_id": assistant_id })),
                "start run",
            )
            .await?;
        tracing::debug!(run_id = %run.id, thread_id = %thread_id, "run started");
        Ok(run)
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        self.decode(
            self.http
                .get(self.url(&format!("threads/{thread_id}/runs/{run_id}"))),
            "poll run status",
        )
        .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        let page: MessagePage = self
            .decode(
                self.http
                    .get(self.url(&format!("threads/{thread_id}/messages")))
                    .query(&[("order", "desc"), ("limit", &limit.to_string())]),
                "list messages",
            )
            .await?;
        Ok(page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config =
            AssistantConfig::new("sk-test", "asst_x").with_base_url("http://localhost:9999/");
        let client = HttpAssistantClient::new(&config);
        assert_eq!(client.url("threads"), "http://localhost:9999/threads");
    }

    #[test]
    fn preview_caps_long_bodies() {
        let long = "x".repeat(2_000);
        assert_eq!(preview(&long).len(), ERROR_BODY_PREVIEW);
        assert_eq!(preview("short"), "short");
    }
}
