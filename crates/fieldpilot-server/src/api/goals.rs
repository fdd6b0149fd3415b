use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use fieldpilot_assistant::{run_chat_turn, AssistantError};
use fieldpilot_store::types::new_record_id;
use fieldpilot_store::{ChecklistItem, Goal};
use serde::Deserialize;

use crate::http::GOALS_PATH;
use crate::service::{ApiError, AppState};

const GOAL_COLOR: &str = "blue";

pub fn routes() -> Router<AppState> {
    Router::new().route(GOALS_PATH, get(list_goals).post(create_goal))
}

#[derive(Debug, Deserialize)]
struct CreateGoalRequest {
    #[serde(default)]
    title: String,
}

/// Checklist entry as produced by the assistant, before ids are assigned.
#[derive(Debug, Deserialize)]
struct ChecklistItemDraft {
    text: String,
    priority: String,
    #[serde(default)]
    completed: bool,
}

async fn list_goals(State(st): State<AppState>) -> Result<Json<Vec<Goal>>, ApiError> {
    Ok(Json(st.store.list_goals().await?))
}

/// Create a goal with an assistant-generated checklist.
///
/// Runs a one-shot turn on a fresh thread, then digs the checklist out
/// of the raw reply: the assistant tends to wrap the JSON array in
/// prose, so everything from the first `[` to the last `]` is treated as
/// the payload.
async fn create_goal(
    State(st): State<AppState>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<Json<Goal>, ApiError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let prompt = format!("Generate a checklist for the goal: \"{title}\" .");
    let outcome = run_chat_turn(
        st.assistant.as_ref(),
        &st.config.goal_assistant_id,
        None,
        &prompt,
        &st.wait,
    )
    .await
    .map_err(|e| match e {
        AssistantError::RunIncomplete { message, .. } => ApiError::Upstream(message),
        other => ApiError::from(other),
    })?;

    if outcome.answer.trim().is_empty() {
        return Err(ApiError::Internal(
            "assistant returned no checklist response".to_string(),
        ));
    }

    let Some(raw_array) = extract_json_array(&outcome.answer) else {
        return Err(ApiError::Internal(format!(
            "no checklist array in assistant reply: {}",
            outcome.answer
        )));
    };
    let drafts: Vec<ChecklistItemDraft> = serde_json::from_str(raw_array)
        .map_err(|_| ApiError::BadRequest("Invalid checklist format".to_string()))?;

    let checklist = drafts
        .into_iter()
        .map(|draft| ChecklistItem {
            id: new_record_id(),
            text: draft.text,
            priority: draft.priority,
            completed: draft.completed,
        })
        .collect();

    let goal = st
        .store
        .create_goal(title.to_string(), GOAL_COLOR.to_string(), checklist)
        .await?;
    tracing::info!(goal_id = %goal.id, items = goal.checklist.len(), "goal created");
    Ok(Json(goal))
}

/// Slice out the outermost JSON array of a prose-wrapped reply.
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_array_from_prose_wrapped_reply() {
        let raw = "Sure! Here is the checklist:\n[{\"text\":\"a\"}]\nGood luck!";
        assert_eq!(extract_json_array(raw), Some("[{\"text\":\"a\"}]"));
    }

    #[test]
    fn bare_array_passes_through() {
        assert_eq!(extract_json_array("[1, 2]"), Some("[1, 2]"));
    }

    #[test]
    fn reply_without_array_yields_none() {
        assert_eq!(extract_json_array("no checklist here"), None);
        assert_eq!(extract_json_array("] reversed ["), None);
        assert_eq!(extract_json_array(""), None);
    }

    #[test]
    fn draft_requires_text_and_priority() {
        let ok: Vec<ChecklistItemDraft> =
            serde_json::from_str(r#"[{"text":"sow","priority":"high"}]"#).unwrap();
        assert_eq!(ok.len(), 1);
        assert!(!ok[0].completed);

        let missing_priority: Result<Vec<ChecklistItemDraft>, _> =
            serde_json::from_str(r#"[{"text":"sow"}]"#);
        assert!(missing_priority.is_err());
    }
}
