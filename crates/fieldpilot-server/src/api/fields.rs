use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use fieldpilot_store::{ChatMessage, ChatRole, Field, FieldAction, FieldUpdate};
use serde::Deserialize;

use crate::http::{FIELDS_PATH, FIELD_ACTIONS_PATH, FIELD_MESSAGES_PATH, FIELD_PATH};
use crate::service::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(FIELDS_PATH, get(list_fields).post(create_field))
        .route(FIELD_PATH, axum::routing::put(update_field).delete(delete_field))
        .route(FIELD_ACTIONS_PATH, get(list_actions).post(create_action))
        .route(FIELD_MESSAGES_PATH, get(list_messages).post(create_message))
}

#[derive(Debug, Deserialize)]
struct CreateFieldRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    crop: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateFieldRequest {
    #[serde(default)]
    lat_lng: Option<Vec<f64>>,
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default)]
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateActionRequest {
    #[serde(default)]
    action: String,
    #[serde(default)]
    date: String,
}

#[derive(Debug, Deserialize)]
struct CreateMessageRequest {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

async fn list_fields(State(st): State<AppState>) -> Result<Json<Vec<Field>>, ApiError> {
    Ok(Json(st.store.list_fields().await?))
}

async fn create_field(
    State(st): State<AppState>,
    Json(req): Json<CreateFieldRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || req.crop.trim().is_empty() {
        return Err(ApiError::BadRequest("name and crop are required".to_string()));
    }
    let field = st.store.create_field(req.name, req.crop).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

async fn update_field(
    State(st): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<Field>, ApiError> {
    // Coordinates only change when the payload carries a [lat, lng]
    // pair; any other shape leaves them untouched.
    let lat_lng = req.lat_lng.as_deref().and_then(|pair| {
        if let [lat, lng] = pair {
            Some((*lat, *lng))
        } else {
            None
        }
    });
    let field = st
        .store
        .update_field(
            &id,
            FieldUpdate {
                lat_lng,
                location_name: req.location_name,
                thread_id: req.thread_id,
            },
        )
        .await?;
    Ok(Json(field))
}

async fn delete_field(
    State(st): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    st.store.delete_field(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_actions(
    State(st): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FieldAction>>, ApiError> {
    Ok(Json(st.store.list_actions(&id).await?))
}

async fn create_action(
    State(st): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.action.trim().is_empty() || req.date.trim().is_empty() {
        return Err(ApiError::BadRequest("action and date are required".to_string()));
    }
    let date = parse_action_date(&req.date)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid date: {}", req.date)))?;
    let action = st.store.create_action(&id, req.action, date).await?;
    Ok((StatusCode::CREATED, Json(action)))
}

async fn list_messages(
    State(st): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    Ok(Json(st.store.list_messages(&id).await?))
}

async fn create_message(
    State(st): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.role.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "role and content are required".to_string(),
        ));
    }
    let role = ChatRole::parse(&req.role)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid role: {}", req.role)))?;
    let message = st.store.create_message(&id, role, req.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Accept RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
fn parse_action_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
