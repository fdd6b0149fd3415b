use crate::api::{AssistantApi, MessageRole};
use crate::error::AssistantError;

/// The extractor never looks past the newest page of this size.
pub const REPLY_PAGE_LIMIT: usize = 10;

/// Fetch the newest page of thread messages and return the text of the
/// most recent assistant reply.
///
/// Only the first content block of that message is inspected, and only
/// when it is a `text` block; a non-text first block, a message with no
/// content, or a page without any assistant entry all yield an empty
/// string. Deliberately lossy: multi-block replies are not concatenated
/// and nothing beyond the fetched page is searched.
pub async fn latest_assistant_text(
    api: &dyn AssistantApi,
    thread_id: &str,
) -> Result<String, AssistantError> {
    let messages = api.list_messages(thread_id, REPLY_PAGE_LIMIT).await?;

    let Some(reply) = messages.iter().find(|m| m.role == MessageRole::Assistant) else {
        return Ok(String::new());
    };

    let text = reply
        .content
        .first()
        .filter(|block| block.kind == "text")
        .and_then(|block| block.text.as_ref())
        .map(|t| t.value.clone())
        .unwrap_or_default();
    Ok(text)
}
