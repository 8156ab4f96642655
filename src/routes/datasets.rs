// List and detail handlers shared by every cached dataset

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::ApiError;
use crate::cache::{Keyed, RefreshableCache};

/// `GET {base}` and `GET {base}/{id}` over one cache.
pub(super) fn router<T>(base: &str, cache: Arc<RefreshableCache<T>>) -> Router
where
    T: Keyed + Clone + Serialize + Send + Sync + 'static,
{
    Router::new()
        .route(base, get(list::<T>))
        .route(&format!("{base}/{{id}}"), get(detail::<T>))
        .with_state(cache)
}

/// Serializes whatever snapshot is current; empty until the first refresh lands.
async fn list<T>(State(cache): State<Arc<RefreshableCache<T>>>) -> Response
where
    T: Keyed + Clone + Serialize + Send + Sync + 'static,
{
    let snapshot = cache.get_all();
    Json(snapshot.items()).into_response()
}

async fn detail<T>(
    State(cache): State<Arc<RefreshableCache<T>>>,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiError>
where
    T: Keyed + Clone + Serialize + Send + Sync + 'static,
{
    Ok(Json(cache.get_by_id(&id)?))
}
