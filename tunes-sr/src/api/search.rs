//! Search endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::search::SearchResponse;
use crate::viewer::Viewer;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free text; missing is the same as blank
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q=<text>
///
/// Always 200 once the viewer is resolved. Blank queries and queries that
/// match nothing give empty lists with a null principal.
pub async fn search(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    debug!(q = %query.q, user = ?viewer.user_id(), "Search request");
    Json(state.search.search(&query.q, &viewer).await)
}
