//! Record persistence for the field assistant.
//!
//! One trait, two adapters: [`MemoryStore`] for tests and local
//! development, [`FileStore`] for a durable single-node deployment.

pub mod file_store;
pub mod memory_store;
pub mod store;
pub mod types;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use store::{FieldUpdate, RecordStore, StoreError};
pub use types::{ChatMessage, ChatRole, ChecklistItem, Field, FieldAction, Goal, Post};
