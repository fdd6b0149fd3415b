use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::store::{FieldUpdate, RecordStore, StoreError};
use crate::types::{
    new_record_id, ChatMessage, ChatRole, ChecklistItem, Field, FieldAction, Goal, Post,
};

struct FieldEntry {
    field: Field,
    actions: Vec<FieldAction>,
    messages: Vec<ChatMessage>,
}

/// In-memory storage for testing and local development.
#[derive(Default)]
pub struct MemoryStore {
    fields: tokio::sync::RwLock<HashMap<String, FieldEntry>>,
    goals: tokio::sync::RwLock<HashMap<String, Goal>>,
    posts: tokio::sync::RwLock<HashMap<String, Post>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(mut records: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    records.sort_by_key(|r| std::cmp::Reverse(key(r)));
    records
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_fields(&self) -> Result<Vec<Field>, StoreError> {
        let fields = self.fields.read().await;
        Ok(newest_first(
            fields.values().map(|e| e.field.clone()).collect(),
            |f: &Field| (f.created_at, f.id.clone()),
        ))
    }

    async fn create_field(&self, name: String, crop: String) -> Result<Field, StoreError> {
        let field = Field::new(name, crop);
        let mut fields = self.fields.write().await;
        fields.insert(
            field.id.clone(),
            FieldEntry {
                field: field.clone(),
                actions: Vec::new(),
                messages: Vec::new(),
            },
        );
        Ok(field)
    }

    async fn update_field(&self, id: &str, update: FieldUpdate) -> Result<Field, StoreError> {
        let mut fields = self.fields.write().await;
        let entry = fields
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        update.apply_to(&mut entry.field);
        Ok(entry.field.clone())
    }

    async fn delete_field(&self, id: &str) -> Result<(), StoreError> {
        let mut fields = self.fields.write().await;
        fields
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_actions(&self, field_id: &str) -> Result<Vec<FieldAction>, StoreError> {
        let fields = self.fields.read().await;
        let entry = fields
            .get(field_id)
            .ok_or_else(|| StoreError::NotFound(field_id.to_string()))?;
        Ok(newest_first(entry.actions.clone(), |a: &FieldAction| {
            (a.date, a.id.clone())
        }))
    }

    async fn create_action(
        &self,
        field_id: &str,
        action: String,
        date: DateTime<Utc>,
    ) -> Result<FieldAction, StoreError> {
        let mut fields = self.fields.write().await;
        let entry = fields
            .get_mut(field_id)
            .ok_or_else(|| StoreError::NotFound(field_id.to_string()))?;
        let record = FieldAction {
            id: new_record_id(),
            field_id: field_id.to_string(),
            action,
            date,
            created_at: Utc::now(),
        };
        entry.actions.push(record.clone());
        Ok(record)
    }

    async fn list_messages(&self, field_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let fields = self.fields.read().await;
        let entry = fields
            .get(field_id)
            .ok_or_else(|| StoreError::NotFound(field_id.to_string()))?;
        // Stored append-only, so insertion order is already display order.
        Ok(entry.messages.clone())
    }

    async fn create_message(
        &self,
        field_id: &str,
        role: ChatRole,
        content: String,
    ) -> Result<ChatMessage, StoreError> {
        let mut fields = self.fields.write().await;
        let entry = fields
            .get_mut(field_id)
            .ok_or_else(|| StoreError::NotFound(field_id.to_string()))?;
        let record = ChatMessage {
            id: new_record_id(),
            field_id: field_id.to_string(),
            role,
            content,
            created_at: Utc::now(),
        };
        entry.messages.push(record.clone());
        Ok(record)
    }

    async fn list_goals(&self) -> Result<Vec<Goal>, StoreError> {
        let goals = self.goals.read().await;
        Ok(newest_first(goals.values().cloned().collect(), |g: &Goal| {
            (g.created_at, g.id.clone())
        }))
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
        let mut goals = self.goals.write().await;
        goals.insert(goal.id.clone(), goal.clone());
        Ok(goal)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.values().cloned().collect(), |p: &Post| {
            (p.created_at, p.id.clone())
        }))
    }

    async fn create_post(&self, title: String, content: String) -> Result<Post, StoreError> {
        let post = Post {
            id: new_record_id(),
            title,
            content,
            created_at: Utc::now(),
        };
        let mut posts = self.posts.write().await;
        posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }
}
