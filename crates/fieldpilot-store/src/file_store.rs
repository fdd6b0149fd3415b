use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::store::{FieldUpdate, RecordStore, StoreError};
use crate::types::{
    new_record_id, ChatMessage, ChatRole, ChecklistItem, Field, FieldAction, Goal, Post,
};

const FIELDS_DIR: &str = "fields";
const GOALS_DIR: &str = "goals";
const POSTS_DIR: &str = "posts";

/// One file per record under `fields/`, `goals/` and `posts/`.
///
/// A field's actions and chat messages live inside its record file, so a
/// field delete removes its whole history in one unlink.
pub struct FileStore {
    base_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct FieldRecord {
    field: Field,
    #[serde(default)]
    actions: Vec<FieldAction>,
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

impl FileStore {
    /// Create a new file storage with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Validate that a record id is safe for use as a filename.
    /// Rejects path separators, `..`, and control characters.
    fn validate_record_id(id: &str) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(StoreError::InvalidId("record id cannot be empty".to_string()));
        }
        if id.contains('/') || id.contains('\\') || id.contains("..") || id.contains('\0') {
            return Err(StoreError::InvalidId(format!(
                "record id contains invalid characters: {id:?}"
            )));
        }
        if id.chars().any(|c| c.is_control()) {
            return Err(StoreError::InvalidId(format!(
                "record id contains control characters: {id:?}"
            )));
        }
        Ok(())
    }

    fn record_path(&self, dir: &str, id: &str) -> Result<PathBuf, StoreError> {
        Self::validate_record_id(id)?;
        Ok(self.base_path.join(dir).join(format!("{id}.json")))
    }

    async fn load_json<T: DeserializeOwned>(
        &self,
        dir: &str,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        let path = self.record_path(dir, id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write a record file atomically via a temp file and rename.
    async fn save_json<T: Serialize>(
        &self,
        dir: &str,
        id: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.record_path(dir, id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(value)?;
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        file.flush().await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn load_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>, StoreError> {
        let dir_path = self.base_path.join(dir);
        if !dir_path.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = tokio::fs::read_to_string(&path).await?;
                records.push(serde_json::from_str(&content)?);
            }
        }
        Ok(records)
    }

    async fn load_field_record(&self, id: &str) -> Result<FieldRecord, StoreError> {
        self.load_json(FIELDS_DIR, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn list_fields(&self) -> Result<Vec<Field>, StoreError> {
        let records: Vec<FieldRecord> = self.load_all(FIELDS_DIR).await?;
        let mut fields: Vec<Field> = records.into_iter().map(|r| r.field).collect();
        fields.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(fields)
    }

    async fn create_field(&self, name: String, crop: String) -> Result<Field, StoreError> {
        let field = Field::new(name, crop);
        let record = FieldRecord {
            field: field.clone(),
            actions: Vec::new(),
            messages: Vec::new(),
        };
        self.save_json(FIELDS_DIR, &field.id, &record).await?;
        Ok(field)
    }

    async fn update_field(&self, id: &str, update: FieldUpdate) -> Result<Field, StoreError> {
        let mut record = self.load_field_record(id).await?;
        update.apply_to(&mut record.field);
        self.save_json(FIELDS_DIR, id, &record).await?;
        Ok(record.field)
    }

    async fn delete_field(&self, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(FIELDS_DIR, id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tokio::fs::remove_file(&path).await?;
        Ok(())
    }

    async fn list_actions(&self, field_id: &str) -> Result<Vec<FieldAction>, StoreError> {
        let record = self.load_field_record(field_id).await?;
        let mut actions = record.actions;
        actions.sort_by(|a, b| (b.date, &b.id).cmp(&(a.date, &a.id)));
        Ok(actions)
    }

    async fn create_action(
        &self,
        field_id: &str,
        action: String,
        date: DateTime<Utc>,
    ) -> Result<FieldAction, StoreError> {
        let mut record = self.load_field_record(field_id).await?;
        let new_action = FieldAction {
            id: new_record_id(),
            field_id: field_id.to_string(),
            action,
            date,
            created_at: Utc::now(),
        };
        record.actions.push(new_action.clone());
        self.save_json(FIELDS_DIR, field_id, &record).await?;
        Ok(new_action)
    }

    async fn list_messages(&self, field_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let record = self.load_field_record(field_id).await?;
        Ok(record.messages)
    }

    async fn create_message(
        &self,
        field_id: &str,
        role: ChatRole,
        content: String,
    ) -> Result<ChatMessage, StoreError> {
        let mut record = self.load_field_record(field_id).await?;
        let message = ChatMessage {
            id: new_record_id(),
            field_id: field_id.to_string(),
            role,
            content,
            created_at: Utc::now(),
        };
        record.messages.push(message.clone());
        self.save_json(FIELDS_DIR, field_id, &record).await?;
        Ok(message)
    }

    async fn list_goals(&self) -> Result<Vec<Goal>, StoreError> {
        let mut goals: Vec<Goal> = self.load_all(GOALS_DIR).await?;
        goals.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(goals)
    }

    async fn create_goal(
        &self,
        title: String,
        color: String,
        checklist: Vec<ChecklistItem>,
    ) -> Result<Goal, StoreError> {
        let goal = Goal {
            id: new_record_id(),
            title,
            color,
            is_generating: false,
            is_generated: true,
            checklist,
            created_at: Utc::now(),
        };
        self.save_json(GOALS_DIR, &goal.id, &goal).await?;
        Ok(goal)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self.load_all(POSTS_DIR).await?;
        posts.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(posts)
    }

    async fn create_post(&self, title: String, content: String) -> Result<Post, StoreError> {
        let post = Post {
            id: new_record_id(),
            title,
            content,
            created_at: Utc::now(),
        };
        self.save_json(POSTS_DIR, &post.id, &post).await?;
        Ok(post)
    }
}
