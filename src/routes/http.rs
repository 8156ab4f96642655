// GET handlers: version, status

use axum::{extract::State, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/status: refresh state of every dataset, keyed by route name.
pub(super) async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.datasets.statuses())
}
