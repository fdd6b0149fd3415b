/// Base URL of the hosted assistant service.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Credentials and assistant identities, resolved once at process start.
///
/// Handlers receive this by reference instead of reading the process
/// environment themselves, so tests can inject fake credentials and point
/// the client at a local mock server.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    /// Assistant persona used for per-field chat turns.
    pub chat_assistant_id: String,
    /// Assistant persona used for one-shot goal checklist generation.
    pub goal_assistant_id: String,
    pub base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>, chat_assistant_id: impl Into<String>) -> Self {
        let chat_assistant_id = chat_assistant_id.into();
        Self {
            api_key: api_key.into(),
            goal_assistant_id: chat_assistant_id.clone(),
            chat_assistant_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_goal_assistant_id(mut self, id: impl Into<String>) -> Self {
        self.goal_assistant_id = id.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Resolve the configuration from the process environment.
    ///
    /// `OPENAI_API_KEY` and `FIELDPILOT_CHAT_ASSISTANT_ID` are required;
    /// a missing one is a boot-time error rather than a deferred failure
    /// on the first request. `FIELDPILOT_GOAL_ASSISTANT_ID` falls back to
    /// the chat assistant, `OPENAI_BASE_URL` to the hosted endpoint.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_env("OPENAI_API_KEY")?;
        let chat_assistant_id = require_env("FIELDPILOT_CHAT_ASSISTANT_ID")?;
        let mut config = Self::new(api_key, chat_assistant_id);
        if let Some(goal_id) = optional_env("FIELDPILOT_GOAL_ASSISTANT_ID") {
            config.goal_assistant_id = goal_id;
        }
        if let Some(base_url) = optional_env("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}
