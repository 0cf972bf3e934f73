//! Recommendation endpoint

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use crate::recommend::Recommendations;
use crate::viewer::Viewer;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    /// Seed song; anything that is not a UUID counts as no seed
    pub song_id: Option<String>,

    pub count: Option<usize>,
}

/// GET /api/recommendations?song_id=<uuid>&count=<n>
///
/// `count` defaults to the configured default and is clamped to
/// `1..=max_count`.
pub async fn get_recommendations(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<Recommendations>, RecommendError> {
    let seed = query.song_id.as_deref().and_then(|raw| {
        let parsed = Uuid::parse_str(raw.trim()).ok();
        if parsed.is_none() {
            debug!(song_id = raw, "Ignoring malformed seed id");
        }
        parsed
    });

    let limits = &state.recommend_limits;
    let count = query
        .count
        .unwrap_or(limits.default_count)
        .clamp(1, limits.max_count.max(1));

    let recommendations = state
        .recommend
        .recommend(seed, count, &viewer)
        .await
        .map_err(|e| {
            error!("Recommendation failed: {}", e);
            RecommendError::Catalog(e.to_string())
        })?;

    Ok(Json(recommendations))
}

#[derive(Debug)]
pub enum RecommendError {
    Catalog(String),
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RecommendError::Catalog(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Catalog error: {}", msg),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
