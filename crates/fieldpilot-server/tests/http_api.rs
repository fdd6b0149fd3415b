use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use fieldpilot_assistant::mock::ScriptedAssistant;
use fieldpilot_assistant::{AssistantConfig, RunStatus, WaitPolicy};
use fieldpilot_server::http;
use fieldpilot_server::service::{AppState, ThreadLockRegistry};
use fieldpilot_store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(assistant: Arc<ScriptedAssistant>) -> Router {
    http::router(AppState {
        store: Arc::new(MemoryStore::new()),
        assistant,
        config: Arc::new(
            AssistantConfig::new("sk-test", "asst_chat").with_goal_assistant_id("asst_goal"),
        ),
        wait: WaitPolicy {
            interval: Duration::from_millis(1),
            ..Default::default()
        },
        thread_locks: Arc::new(ThreadLockRegistry::default()),
    })
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_answers_ok() {
    let router = app(Arc::new(ScriptedAssistant::new()));
    let (status, _) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn chat_turn_completes_and_names_the_new_thread() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::InProgress, RunStatus::Completed])
            .with_reply("rotate to legumes next season"),
    );
    let router = app(assistant.clone());

    let (status, body) = send(
        &router,
        "POST",
        "/chat-turn",
        Some(json!({ "message": "what should I plant?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["thread_id"], "thread_1");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["answer"], "rotate to legumes next season");
    assert!(body.get("error").is_none());
    assert_eq!(assistant.calls.threads_created(), 1);
    assert_eq!(assistant.calls.messages_posted(), 1);
    assert_eq!(assistant.calls.runs_started(), 1);
}

#[tokio::test]
async fn chat_turn_reuses_the_supplied_thread() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::Completed])
            .with_reply("ok"),
    );
    let router = app(assistant.clone());

    let (status, body) = send(
        &router,
        "POST",
        "/chat-turn",
        Some(json!({ "thread_id": "thread_keep", "message": "hello again" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["thread_id"], "thread_keep");
    assert_eq!(assistant.calls.threads_created(), 0);
}

#[tokio::test]
async fn chat_turn_missing_message_is_400_without_remote_calls() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let router = app(assistant.clone());

    for body in [json!({}), json!({ "message": "" }), json!({ "message": "   " })] {
        let (status, response) = send(&router, "POST", "/chat-turn", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "message is required");
    }
    assert_eq!(assistant.calls.total(), 0);
}

#[tokio::test]
async fn chat_turn_failed_run_is_502_with_failure_detail() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::InProgress, RunStatus::Failed])
            .with_run_error("model overloaded"),
    );
    let router = app(assistant);

    let (status, body) = send(
        &router,
        "POST",
        "/chat-turn",
        Some(json!({ "message": "hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["thread_id"], "thread_1");
    assert_eq!(body["status"], "failed");
    assert_eq!(body["answer"], "");
    assert_eq!(body["error"], "model overloaded");
}

#[tokio::test]
async fn chat_turn_transport_failure_is_generic_500() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::InProgress])
            .failing_get_run("connection reset"),
    );
    let router = app(assistant);

    let (status, body) = send(
        &router,
        "POST",
        "/chat-turn",
        Some(json!({ "message": "hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // Transport detail stays in the logs, not the response.
    assert_eq!(body["error"], "an internal server error occurred");
}

#[tokio::test]
async fn field_crud_roundtrip() {
    let router = app(Arc::new(ScriptedAssistant::new()));

    let (status, created) = send(
        &router,
        "POST",
        "/fields",
        Some(json!({ "name": "north paddock", "crop": "barley" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "north paddock");

    let (status, updated) = send(
        &router,
        "PUT",
        &format!("/fields/{id}"),
        Some(json!({
            "latLng": [52.1, 5.3],
            "locationName": "North Paddock",
            "threadId": "thread_9"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["latitude"], 52.1);
    assert_eq!(updated["longitude"], 5.3);
    assert_eq!(updated["threadId"], "thread_9");

    let (status, fields) = send(&router, "GET", "/fields", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fields.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, "DELETE", &format!("/fields/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, "DELETE", &format!("/fields/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Field not found");
}

#[tokio::test]
async fn field_create_requires_name_and_crop() {
    let router = app(Arc::new(ScriptedAssistant::new()));
    let (status, body) = send(&router, "POST", "/fields", Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name and crop are required");
}

#[tokio::test]
async fn malformed_lat_lng_leaves_coordinates_untouched() {
    let router = app(Arc::new(ScriptedAssistant::new()));
    let (_, created) = send(
        &router,
        "POST",
        "/fields",
        Some(json!({ "name": "n", "crop": "c" })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &router,
        "PUT",
        &format!("/fields/{id}"),
        Some(json!({ "latLng": [1.0], "locationName": "spot" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated.get("latitude").is_none());
    assert_eq!(updated["locationName"], "spot");
}

#[tokio::test]
async fn actions_are_validated_and_listed_by_date() {
    let router = app(Arc::new(ScriptedAssistant::new()));
    let (_, created) = send(
        &router,
        "POST",
        "/fields",
        Some(json!({ "name": "n", "crop": "c" })),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let actions_uri = format!("/fields/{id}/actions");

    let (status, body) = send(&router, "POST", &actions_uri, Some(json!({ "action": "sow" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "action and date are required");

    let (status, _) = send(
        &router,
        "POST",
        &actions_uri,
        Some(json!({ "action": "sow", "date": "2026-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &router,
        "POST",
        &actions_uri,
        Some(json!({ "action": "fertilize", "date": "2026-04-15T08:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, actions) = send(&router, "GET", &actions_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let actions = actions.as_array().unwrap();
    assert_eq!(actions[0]["action"], "fertilize");
    assert_eq!(actions[1]["action"], "sow");
}

#[tokio::test]
async fn actions_on_missing_field_are_404() {
    let router = app(Arc::new(ScriptedAssistant::new()));
    let (status, _) = send(
        &router,
        "POST",
        "/fields/nope/actions",
        Some(json!({ "action": "sow", "date": "2026-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messages_reject_unknown_roles_and_keep_order() {
    let router = app(Arc::new(ScriptedAssistant::new()));
    let (_, created) = send(
        &router,
        "POST",
        "/fields",
        Some(json!({ "name": "n", "crop": "c" })),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let messages_uri = format!("/fields/{id}/messages");

    let (status, body) = send(
        &router,
        "POST",
        &messages_uri,
        Some(json!({ "role": "moderator", "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid role: moderator");

    for (role, content) in [("user", "rain soon?"), ("assistant", "yes, thursday")] {
        let (status, _) = send(
            &router,
            "POST",
            &messages_uri,
            Some(json!({ "role": role, "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, messages) = send(&router, "GET", &messages_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn goal_creation_generates_a_checklist() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::Completed])
            .with_reply(concat!(
                "Here is your checklist:\n",
                "[{\"text\":\"buy seeds\",\"priority\":\"high\",\"completed\":false},",
                "{\"text\":\"prepare soil\",\"priority\":\"medium\"}]\n",
                "Good luck!"
            )),
    );
    let router = app(assistant.clone());

    let (status, goal) = send(
        &router,
        "POST",
        "/goals",
        Some(json!({ "title": "Grow tomatoes" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["title"], "Grow tomatoes");
    assert_eq!(goal["color"], "blue");
    assert_eq!(goal["isGenerated"], true);
    let checklist = goal["checklist"].as_array().unwrap();
    assert_eq!(checklist.len(), 2);
    assert_eq!(checklist[0]["text"], "buy seeds");
    assert_eq!(checklist[1]["completed"], false);

    // One-shot turn on a fresh thread with the canonical prompt.
    assert_eq!(assistant.calls.threads_created(), 1);
    assert_eq!(
        assistant.posted()[0].1,
        "Generate a checklist for the goal: \"Grow tomatoes\" ."
    );

    let (status, goals) = send(&router, "GET", "/goals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goals.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn goal_requires_a_title() {
    let router = app(Arc::new(ScriptedAssistant::new()));
    let (status, body) = send(&router, "POST", "/goals", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn goal_with_malformed_checklist_is_400() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::Completed])
            .with_reply("[{\"task\":\"wrong shape\"}]"),
    );
    let router = app(assistant);

    let (status, body) = send(&router, "POST", "/goals", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid checklist format");
}

#[tokio::test]
async fn goal_with_no_array_in_reply_is_500() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::Completed])
            .with_reply("I could not come up with a checklist, sorry."),
    );
    let router = app(assistant);

    let (status, body) = send(&router, "POST", "/goals", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "an internal server error occurred");
}

#[tokio::test]
async fn goal_run_failure_is_502() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_statuses([RunStatus::Failed])
            .with_run_error("assistant unavailable"),
    );
    let router = app(assistant);

    let (status, body) = send(&router, "POST", "/goals", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "assistant unavailable");
}

#[tokio::test]
async fn posts_validate_and_roundtrip() {
    let router = app(Arc::new(ScriptedAssistant::new()));

    let (status, body) = send(&router, "POST", "/posts", Some(json!({ "title": "t" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing fields");

    let (status, post) = send(
        &router,
        "POST",
        "/posts",
        Some(json!({ "title": "harvest notes", "content": "good yield" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["title"], "harvest notes");

    let (status, posts) = send(&router, "GET", "/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posts.as_array().unwrap().len(), 1);
}
