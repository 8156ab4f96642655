// Maps service errors onto HTTP statuses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::aggregation::AggregationError;
use crate::broker::SourceError;
use crate::cache::CacheError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    NotFound(#[from] CacheError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error("missing required query parameter: {0}")]
    MissingParameter(&'static str),
    #[error("invalid query parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error(transparent)]
    Upstream(#[from] SourceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Aggregation(_)
            | ApiError::MissingParameter(_)
            | ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed upstream");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
