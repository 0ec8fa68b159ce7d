use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use skydesk::airline;
use skydesk::models::tool::Tool;

use crate::state::{AppState, StatusInfo};

#[derive(Debug, Serialize)]
struct CategoryResponse {
    name: &'static str,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    #[serde(flatten)]
    info: StatusInfo,
    active_sessions: usize,
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        active_sessions: state.sessions.len().await,
        info: state.status,
    })
}

// The tool catalog in display order, grouped the way the UI shows it
async fn tools_handler(State(state): State<AppState>) -> Json<Vec<CategoryResponse>> {
    let registry = state.driver.agent().registry();
    let categories = airline::categories()
        .into_iter()
        .map(|category| CategoryResponse {
            name: category.name,
            tools: category
                .tools
                .iter()
                .filter_map(|name| registry.get(name).cloned())
                .collect(),
        })
        .collect();
    Json(categories)
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/tools", get(tools_handler))
        .with_state(state)
}
