use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use skydesk::models::conversation::Conversation;

use super::{session_not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    session_id: String,
    created_at: String,
    messages: Conversation,
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| session_not_found(&id))?;
    let session = session.lock().await;

    Ok(Json(SessionResponse {
        session_id: session.id.clone(),
        created_at: session.created_at.to_rfc3339(),
        messages: session.conversation.clone(),
    }))
}

// Start the conversation over under a new id; the old id stops working
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let session_id = state
        .sessions
        .reset(&id)
        .await
        .ok_or_else(|| session_not_found(&id))?;
    Ok(Json(CreateSessionResponse { session_id }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(&id))
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/reset", post(reset_session))
        .with_state(state)
}
