pub mod chat;
pub mod fields;
pub mod goals;
pub mod posts;
