use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{ChatMessage, ChatRole, ChecklistItem, Field, FieldAction, Goal, Post};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("invalid record id: {0}")]
    InvalidId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("corrupt record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Patch applied to an existing field. `None` leaves a slot untouched.
#[derive(Debug, Default, Clone)]
pub struct FieldUpdate {
    pub lat_lng: Option<(f64, f64)>,
    pub location_name: Option<String>,
    pub thread_id: Option<String>,
}

/// Persistence contract for the assistant's records.
///
/// List orderings are part of the contract: fields and goals newest
/// first, actions by action date newest first, chat messages oldest
/// first (display order).
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_fields(&self) -> Result<Vec<Field>, StoreError>;
    async fn create_field(&self, name: String, crop: String) -> Result<Field, StoreError>;
    async fn update_field(&self, id: &str, update: FieldUpdate) -> Result<Field, StoreError>;
    async fn delete_field(&self, id: &str) -> Result<(), StoreError>;

    async fn list_actions(&self, field_id: &str) -> Result<Vec<FieldAction>, StoreError>;
    async fn create_action(
        &self,
        field_id: &str,
        action: String,
        date: DateTime<Utc>,
    ) -> Result<FieldAction, StoreError>;

    async fn list_messages(&self, field_id: &str) -> Result<Vec<ChatMessage>, StoreError>;
    async fn create_message(
        &self,
        field_id: &str,
        role: ChatRole,
        content: String,
    ) -> Result<ChatMessage, StoreError>;

    async fn list_goals(&self) -> Result<Vec<Goal>, StoreError>;
    async fn create_goal(
        &self,
        title: String,
        color: String,
        checklist: Vec<ChecklistItem>,
    ) -> Result<Goal, StoreError>;

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn create_post(&self, title: String, content: String) -> Result<Post, StoreError>;
}

impl FieldUpdate {
    /// Apply the patch to a field record in place.
    pub fn apply_to(&self, field: &mut Field) {
        if let Some((lat, lng)) = self.lat_lng {
            field.latitude = Some(lat);
            field.longitude = Some(lng);
        }
        if let Some(ref name) = self.location_name {
            field.location_name = Some(name.clone());
        }
        if let Some(ref thread_id) = self.thread_id {
            field.thread_id = Some(thread_id.clone());
        }
    }
}
