// Export route modules
pub mod catalog;
pub mod reply;
pub mod sessions;

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;
use axum::Router;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error<S: Into<String>>(status: StatusCode, error: S) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn session_not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Session '{}' not found", id))
}

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(reply::routes(state.clone()))
        .merge(sessions::routes(state.clone()))
        .merge(catalog::routes(state))
}
