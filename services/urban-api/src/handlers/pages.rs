//! Browser-facing pages.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Html, Json};
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET / - Map page
pub async fn index_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, &'static str)> {
    let path = state.config.template_dir.join("index.html");
    tokio::fs::read_to_string(&path).await.map(Html).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to read index template");
        (StatusCode::NOT_FOUND, "index.html not found")
    })
}

/// GET /message - Welcome message
pub async fn message_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Urban Planning API",
    })
}
