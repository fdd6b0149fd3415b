use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generate a record id that sorts by creation time.
pub fn new_record_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

/// A cultivated field tracked by the assistant.
///
/// `thread_id` is the field's conversation slot at the remote assistant
/// service: empty until the first chat turn assigns one, then reused for
/// every later turn of that field's conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    pub crop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Field {
    pub fn new(name: impl Into<String>, crop: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            name: name.into(),
            crop: crop.into(),
            latitude: None,
            longitude: None,
            location_name: None,
            thread_id: None,
            created_at: Utc::now(),
        }
    }
}

/// A dated agronomic action logged against a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAction {
    pub id: String,
    pub field_id: String,
    pub action: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Author of a persisted chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            "system" => Some(ChatRole::System),
            _ => None,
        }
    }
}

/// One turn of a field's persisted conversation. Append-only; display
/// order is creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub field_id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A checklist entry generated for a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    /// Free-form priority label as produced by the assistant
    /// (conventionally `low`/`medium`/`high`, but not enforced).
    pub priority: String,
    pub completed: bool,
}

/// A user goal with its generated checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub color: String,
    pub is_generating: bool,
    pub is_generated: bool,
    pub checklist: Vec<ChecklistItem>,
    pub created_at: DateTime<Utc>,
}

/// A free-standing journal post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_serializes_camel_case() {
        let mut field = Field::new("north paddock", "barley");
        field.location_name = Some("North Paddock".to_string());
        let value = serde_json::to_value(&field).unwrap();
        assert!(value.get("locationName").is_some());
        assert!(value.get("createdAt").is_some());
        // Unset optional slots are omitted entirely.
        assert!(value.get("threadId").is_none());
    }

    #[test]
    fn chat_role_parses_known_values_only() {
        assert_eq!(ChatRole::parse("user"), Some(ChatRole::User));
        assert_eq!(ChatRole::parse("assistant"), Some(ChatRole::Assistant));
        assert_eq!(ChatRole::parse("system"), Some(ChatRole::System));
        assert_eq!(ChatRole::parse("moderator"), None);
        assert_eq!(ChatRole::parse(""), None);
    }

    #[test]
    fn record_ids_sort_by_creation() {
        let a = new_record_id();
        // Ordering is only guaranteed across millisecond ticks.
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_record_id();
        assert!(a < b);
    }
}
